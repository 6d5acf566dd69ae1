mod models;
mod screens;
mod services;

use eframe::egui;
use models::RaceSelection;
use screens::race::{RaceAction, RaceScreenState};
use screens::select::SelectAction;
use services::config_loader::{self, SlipstreamConfig};
use std::fs;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

enum AppState {
    Select,
    Race,
}

struct SlipstreamApp {
    state: AppState,
    config: SlipstreamConfig,
    selection: RaceSelection,
    race_screen: Option<RaceScreenState>,
}

impl SlipstreamApp {
    fn new(config: SlipstreamConfig) -> Self {
        Self {
            state: AppState::Select,
            config,
            selection: RaceSelection::default(),
            race_screen: None,
        }
    }
}

impl eframe::App for SlipstreamApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.add_space(8.0);
            match self.state {
                AppState::Select => {
                    if let SelectAction::StartRace =
                        screens::select::ui(ui, &self.config, &mut self.selection)
                    {
                        if let Some(screen) = RaceScreenState::begin(&self.config, &self.selection)
                        {
                            self.race_screen = Some(screen);
                            info!("Transition: Select -> Race");
                            self.state = AppState::Race;
                        } else {
                            warn!("Cannot start race: selection is incomplete");
                        }
                    }
                }
                AppState::Race => {
                    if let Some(screen) = self.race_screen.as_mut() {
                        match screens::race::ui(ui, screen, &self.config) {
                            RaceAction::NewRace => {
                                screen.abort();
                                self.race_screen = None;
                                self.selection = RaceSelection::default();
                                info!("Transition: Race -> Select");
                                self.state = AppState::Select;
                            }
                            RaceAction::Stay => {}
                        }
                    } else {
                        ui.colored_label(
                            egui::Color32::RED,
                            "Race session missing. Go back and start a new race.",
                        );
                        if ui.button("Back to selection").clicked() {
                            self.state = AppState::Select;
                        }
                    }
                }
            }
        });
    }
}

fn init_tracing() -> Option<WorkerGuard> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(true);

    let _ = fs::create_dir_all("logs");
    let file_appender = tracing_appender::rolling::daily("logs", "slipstream.log");
    let (file_writer, file_guard) = tracing_appender::non_blocking(file_appender);
    let file_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_writer(file_writer)
        .with_target(true);

    let init_result = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init();

    if let Err(err) = init_result {
        eprintln!("tracing init failed: {err}");
        return None;
    }

    Some(file_guard)
}

fn main() -> eframe::Result<()> {
    let _log_guard = init_tracing();
    info!("Starting Slipstream");

    let config = match config_loader::load_slipstream_config(".") {
        Ok(config) => config,
        Err(message) => {
            warn!("{message}; falling back to defaults");
            SlipstreamConfig::default()
        }
    };
    info!("Race server: {}", config.server_url);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([960.0, 640.0])
            .with_resizable(false),
        ..Default::default()
    };

    eframe::run_native(
        "Slipstream",
        options,
        Box::new(move |cc| {
            cc.egui_ctx.set_pixels_per_point(1.1);

            let mut style = (*cc.egui_ctx.style()).clone();
            style
                .text_styles
                .insert(egui::TextStyle::Heading, egui::FontId::proportional(30.0));
            style
                .text_styles
                .insert(egui::TextStyle::Body, egui::FontId::proportional(18.0));
            style
                .text_styles
                .insert(egui::TextStyle::Button, egui::FontId::proportional(18.0));
            style.spacing.button_padding = egui::vec2(12.0, 8.0);
            cc.egui_ctx.set_style(style);

            Ok(Box::new(SlipstreamApp::new(config)))
        }),
    )
}
