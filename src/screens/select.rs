use eframe::egui;
use std::sync::mpsc::{Receiver, TryRecvError};
use std::sync::{Mutex, OnceLock};

use crate::models::{RaceSelection, Racer, Track};
use crate::services::catalog_fetch::{CatalogEvent, spawn_catalog_fetch};
use crate::services::config_loader::SlipstreamConfig;

pub enum SelectAction {
    Stay,
    StartRace,
}

#[derive(Default)]
struct SelectUiState {
    receiver: Option<Receiver<CatalogEvent>>,
    is_loading: bool,
    loaded: bool,
    tracks: Vec<Track>,
    racers: Vec<Racer>,
    load_error: Option<String>,
    prompt: Option<String>,
}

static SELECT_UI_STATE: OnceLock<Mutex<SelectUiState>> = OnceLock::new();

fn select_ui_state() -> &'static Mutex<SelectUiState> {
    SELECT_UI_STATE.get_or_init(|| Mutex::new(SelectUiState::default()))
}

fn start_catalog_fetch(state: &mut SelectUiState, config: &SlipstreamConfig) {
    state.is_loading = true;
    state.loaded = false;
    state.load_error = None;
    state.tracks.clear();
    state.racers.clear();
    state.receiver = Some(spawn_catalog_fetch(config.server_url.clone()));
}

fn pump_catalog_events(state: &mut SelectUiState) {
    let event = {
        let Some(rx) = &state.receiver else {
            return;
        };
        rx.try_recv()
    };

    match event {
        Ok(CatalogEvent::Loaded { tracks, racers }) => {
            state.is_loading = false;
            state.loaded = true;
            state.tracks = tracks;
            state.racers = racers;
            state.receiver = None;
        }
        Ok(CatalogEvent::Failed { message }) => {
            state.is_loading = false;
            state.load_error = Some(message);
            state.receiver = None;
        }
        Err(TryRecvError::Empty) => {}
        Err(TryRecvError::Disconnected) => {
            state.is_loading = false;
            state.load_error = Some("Catalog fetch thread disconnected".to_string());
            state.receiver = None;
        }
    }
}

pub fn ui(
    ui: &mut egui::Ui,
    config: &SlipstreamConfig,
    selection: &mut RaceSelection,
) -> SelectAction {
    ui.heading("Slipstream");
    ui.add_space(4.0);
    ui.label("Pick a track and a racer, then start your race.");
    ui.add_space(12.0);

    let mut state = select_ui_state().lock().expect("select ui state lock poisoned");

    if state.receiver.is_none() && !state.loaded && state.load_error.is_none() {
        start_catalog_fetch(&mut state, config);
    }
    pump_catalog_events(&mut state);
    if state.is_loading {
        ui.ctx().request_repaint();
    }

    if state.is_loading {
        ui.horizontal(|ui| {
            ui.add(egui::Spinner::new());
            ui.label(format!("Loading tracks and racers from {}", config.server_url));
        });
        return SelectAction::Stay;
    }

    if let Some(message) = state.load_error.clone() {
        ui.colored_label(egui::Color32::LIGHT_RED, message);
        ui.add_space(8.0);
        if ui.button("Retry").clicked() {
            start_catalog_fetch(&mut state, config);
            ui.ctx().request_repaint();
        }
        return SelectAction::Stay;
    }

    ui.label(egui::RichText::new("Select a Track").strong());
    ui.add_space(4.0);
    ui.horizontal_wrapped(|ui| {
        for track in &state.tracks {
            let selected = selection
                .track
                .as_ref()
                .is_some_and(|entry| entry.id == track.id);
            if ui.selectable_label(selected, &track.name).clicked() {
                selection.choose_track(track);
            }
        }
    });
    ui.add_space(12.0);

    ui.label(egui::RichText::new("Select a Racer").strong());
    ui.add_space(4.0);
    ui.horizontal_wrapped(|ui| {
        for racer in &state.racers {
            let selected = selection
                .racer
                .as_ref()
                .is_some_and(|entry| entry.id == racer.id);
            let card = format!(
                "{}\nspeed {} | accel {} | handling {}",
                racer.driver_name, racer.top_speed, racer.acceleration, racer.handling
            );
            if ui.selectable_label(selected, card).clicked() {
                selection.choose_racer(racer);
            }
        }
    });
    ui.add_space(16.0);

    if ui.button("Start your race!").clicked() {
        if selection.is_complete() {
            state.prompt = None;
            return SelectAction::StartRace;
        }
        state.prompt = Some("Please select your track and your racer".to_string());
    }

    if let Some(prompt) = &state.prompt {
        ui.add_space(8.0);
        ui.colored_label(egui::Color32::LIGHT_RED, prompt);
    }

    SelectAction::Stay
}
