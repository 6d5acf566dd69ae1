use eframe::egui;
use std::sync::mpsc::TryRecvError;
use tracing::info;

use crate::models::{RaceSelection, StandingRow, final_standings, progress_standings};
use crate::services::config_loader::SlipstreamConfig;
use crate::services::race_session::{RaceEvent, RaceSessionHandle, spawn_race_session};

pub enum RaceAction {
    Stay,
    NewRace,
}

enum RacePhase {
    Creating,
    Countdown { remaining: u8 },
    Running,
    Finished,
    Failed,
}

pub struct RaceScreenState {
    session: RaceSessionHandle,
    phase: RacePhase,
    track_name: String,
    player_id: i64,
    standings: Vec<StandingRow>,
    error: Option<String>,
}

impl RaceScreenState {
    /// Spawns the race session for the current selection. Callers verify
    /// the selection is complete first.
    pub fn begin(config: &SlipstreamConfig, selection: &RaceSelection) -> Option<Self> {
        let track = selection.track.as_ref()?;
        let racer = selection.racer.as_ref()?;
        info!(
            "Starting race on '{}' (track {}) as '{}' (racer {})",
            track.name, track.id, racer.name, racer.id
        );
        Some(Self {
            session: spawn_race_session(config, racer.id, track.id),
            phase: RacePhase::Creating,
            track_name: track.name.clone(),
            player_id: racer.id,
            standings: Vec::new(),
            error: None,
        })
    }

    pub fn abort(&self) {
        self.session.abort();
    }

    fn is_live(&self) -> bool {
        !matches!(self.phase, RacePhase::Finished | RacePhase::Failed)
    }

    fn pump_events(&mut self, countdown_from: u8) {
        loop {
            match self.session.events.try_recv() {
                Ok(RaceEvent::Created { race }) => {
                    self.track_name = race.track.name.clone();
                    self.phase = RacePhase::Countdown {
                        remaining: countdown_from,
                    };
                }
                Ok(RaceEvent::CountdownTick { remaining }) => {
                    self.phase = RacePhase::Countdown { remaining };
                }
                Ok(RaceEvent::Started) => {
                    self.phase = RacePhase::Running;
                }
                Ok(RaceEvent::Progress { positions }) => {
                    self.standings = progress_standings(&positions, Some(self.player_id));
                }
                Ok(RaceEvent::Finished { positions }) => {
                    self.standings = final_standings(&positions, Some(self.player_id));
                    self.phase = RacePhase::Finished;
                }
                Ok(RaceEvent::Failed { message }) => {
                    self.error = Some(message);
                    self.phase = RacePhase::Failed;
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    if self.is_live() {
                        self.error = Some("Race session worker disconnected".to_string());
                        self.phase = RacePhase::Failed;
                    }
                    break;
                }
            }
        }
    }
}

fn standings_rows(ui: &mut egui::Ui, standings: &[StandingRow]) {
    for row in standings {
        let text = format!("{} - {}", row.place, row.display_name);
        if row.is_player {
            ui.label(
                egui::RichText::new(text)
                    .strong()
                    .color(egui::Color32::LIGHT_GREEN),
            );
        } else {
            ui.label(text);
        }
    }
}

fn gas_pedal(ui: &mut egui::Ui, session: &RaceSessionHandle) {
    ui.label(egui::RichText::new("Directions").strong());
    ui.label("Click the button as fast as you can to make your racer go faster!");
    ui.add_space(8.0);
    if ui
        .add_sized([220.0, 64.0], egui::Button::new("Click Me To Win!"))
        .clicked()
    {
        session.accelerate();
    }
}

pub fn ui(ui: &mut egui::Ui, state: &mut RaceScreenState, config: &SlipstreamConfig) -> RaceAction {
    state.pump_events(config.countdown_from);
    if state.is_live() {
        ui.ctx().request_repaint();
    }

    ui.heading(format!("Race: {}", state.track_name));
    ui.add_space(12.0);

    match &state.phase {
        RacePhase::Creating => {
            ui.horizontal(|ui| {
                ui.add(egui::Spinner::new());
                ui.label("Creating race...");
            });
        }
        RacePhase::Countdown { remaining } => {
            let remaining = *remaining;
            ui.columns(2, |columns| {
                columns[0].label(egui::RichText::new("Race Starts In...").strong());
                columns[0].add_space(8.0);
                columns[0].label(egui::RichText::new(remaining.to_string()).size(110.0).strong());
                gas_pedal(&mut columns[1], &state.session);
            });
        }
        RacePhase::Running => {
            ui.columns(2, |columns| {
                columns[0].label(egui::RichText::new("Leaderboard").strong());
                columns[0].add_space(8.0);
                standings_rows(&mut columns[0], &state.standings);
                gas_pedal(&mut columns[1], &state.session);
            });
        }
        RacePhase::Finished => {
            ui.label(egui::RichText::new("Race Results").strong());
            ui.label("The race is done! Here are the final results:");
            ui.add_space(8.0);
            standings_rows(ui, &state.standings);
            ui.add_space(16.0);
            if ui.button("Start a new race").clicked() {
                return RaceAction::NewRace;
            }
        }
        RacePhase::Failed => {
            let message = state
                .error
                .clone()
                .unwrap_or_else(|| "Race failed".to_string());
            ui.colored_label(egui::Color32::LIGHT_RED, message);
            ui.add_space(16.0);
            if ui.button("Back to selection").clicked() {
                return RaceAction::NewRace;
            }
        }
    }

    RaceAction::Stay
}
