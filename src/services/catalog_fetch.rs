use std::sync::mpsc::{self, Receiver};
use std::thread;

use tracing::info;

use crate::models::{Racer, Track};
use crate::services::race_client::RaceClient;

#[derive(Debug)]
pub enum CatalogEvent {
    Loaded {
        tracks: Vec<Track>,
        racers: Vec<Racer>,
    },
    Failed {
        message: String,
    },
}

/// Fetches the track and racer catalogs off the UI thread and reports the
/// outcome over a channel the select screen drains each frame.
pub fn spawn_catalog_fetch(server_url: String) -> Receiver<CatalogEvent> {
    let (tx, rx) = mpsc::channel::<CatalogEvent>();

    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        {
            Ok(rt) => rt,
            Err(err) => {
                let _ = tx.send(CatalogEvent::Failed {
                    message: format!("failed to initialize catalog runtime: {err}"),
                });
                return;
            }
        };

        let outcome = runtime.block_on(async {
            let client = RaceClient::new(&server_url)?;
            let tracks = client.list_tracks().await?;
            let racers = client.list_racers().await?;
            anyhow::Ok((tracks, racers))
        });

        match outcome {
            Ok((tracks, racers)) => {
                info!(
                    "Catalog loaded: {} tracks, {} racers",
                    tracks.len(),
                    racers.len()
                );
                let _ = tx.send(CatalogEvent::Loaded { tracks, racers });
            }
            Err(err) => {
                let _ = tx.send(CatalogEvent::Failed {
                    message: format!("{err:#}"),
                });
            }
        }
    });

    rx
}
