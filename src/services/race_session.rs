use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread;
use std::time::Duration;

use tokio::time::{self, MissedTickBehavior};
use tracing::{info, warn};

use crate::models::{PositionRecord, Race};
use crate::services::config_loader::SlipstreamConfig;
use crate::services::race_client::RaceClient;
use crate::services::race_flow::{CountdownTimer, PollStep, RacePoller};

#[derive(Debug)]
pub enum SessionCommand {
    Accelerate,
    Abort,
}

#[derive(Debug)]
pub enum RaceEvent {
    Created {
        race: Box<Race>,
    },
    CountdownTick {
        remaining: u8,
    },
    Started,
    Progress {
        positions: Vec<PositionRecord>,
    },
    Finished {
        positions: Vec<PositionRecord>,
    },
    Failed {
        message: String,
    },
}

/// Handle to a running race session. Dropping it aborts the worker the
/// next time it drains its command queue.
pub struct RaceSessionHandle {
    pub events: Receiver<RaceEvent>,
    commands: Sender<SessionCommand>,
}

impl RaceSessionHandle {
    /// Fire-and-forget: the gas pedal never waits for an acknowledgement.
    pub fn accelerate(&self) {
        let _ = self.commands.send(SessionCommand::Accelerate);
    }

    pub fn abort(&self) {
        let _ = self.commands.send(SessionCommand::Abort);
    }
}

/// Runs create -> countdown -> start -> poll -> results on a worker
/// thread, reporting each stage over the returned handle's event channel.
pub fn spawn_race_session(
    config: &SlipstreamConfig,
    racer_id: i64,
    track_id: i64,
) -> RaceSessionHandle {
    let (event_tx, event_rx) = mpsc::channel::<RaceEvent>();
    let (command_tx, command_rx) = mpsc::channel::<SessionCommand>();
    let config = config.clone();

    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
        {
            Ok(rt) => rt,
            Err(err) => {
                let _ = event_tx.send(RaceEvent::Failed {
                    message: format!("failed to initialize session runtime: {err}"),
                });
                return;
            }
        };

        runtime.block_on(run_session(config, racer_id, track_id, event_tx, command_rx));
    });

    RaceSessionHandle {
        events: event_rx,
        commands: command_tx,
    }
}

enum Drained {
    Continue,
    Aborted,
}

fn drain_commands(
    commands: &Receiver<SessionCommand>,
    client: &RaceClient,
    race_id: i64,
) -> Drained {
    loop {
        match commands.try_recv() {
            Ok(SessionCommand::Accelerate) => {
                let client = client.clone();
                tokio::spawn(async move {
                    if let Err(err) = client.accelerate(race_id).await {
                        warn!("Accelerate request failed: {err:#}");
                    }
                });
            }
            Ok(SessionCommand::Abort) => return Drained::Aborted,
            Err(TryRecvError::Empty) => return Drained::Continue,
            // UI dropped the handle, nobody is listening anymore.
            Err(TryRecvError::Disconnected) => return Drained::Aborted,
        }
    }
}

async fn run_session(
    config: SlipstreamConfig,
    racer_id: i64,
    track_id: i64,
    events: Sender<RaceEvent>,
    commands: Receiver<SessionCommand>,
) {
    let client = match RaceClient::new(&config.server_url) {
        Ok(client) => client,
        Err(err) => {
            let _ = events.send(RaceEvent::Failed {
                message: format!("{err:#}"),
            });
            return;
        }
    };

    let race = match client.create_race(racer_id, track_id).await {
        Ok(race) => race,
        Err(err) => {
            let _ = events.send(RaceEvent::Failed {
                message: format!("{err:#}"),
            });
            return;
        }
    };
    let race_id = race.handle_id();
    info!(
        "Race {} created on track '{}' for racer {}",
        race.id, race.track.name, racer_id
    );
    if events
        .send(RaceEvent::Created {
            race: Box::new(race),
        })
        .is_err()
    {
        return;
    }

    // The start view renders the opening digit itself; give it a beat
    // before the digits start moving.
    time::sleep(Duration::from_millis(config.countdown_lead_in_ms)).await;

    let mut timer = CountdownTimer::new(config.countdown_from);
    let second = Duration::from_secs(1);
    let mut ticks = time::interval_at(time::Instant::now() + second, second);
    ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
    while !timer.is_finished() {
        ticks.tick().await;
        if let Drained::Aborted = drain_commands(&commands, &client, race_id) {
            info!("Race session aborted during countdown");
            return;
        }
        if let Some(remaining) = timer.tick()
            && events.send(RaceEvent::CountdownTick { remaining }).is_err()
        {
            return;
        }
    }

    if let Err(err) = client.start_race(race_id).await {
        let _ = events.send(RaceEvent::Failed {
            message: format!("{err:#}"),
        });
        return;
    }
    if events.send(RaceEvent::Started).is_err() {
        return;
    }

    // Each fetch is awaited before the next tick is scheduled, so status
    // requests never overlap even when the server is slow.
    let mut poller = RacePoller::new();
    let period = Duration::from_millis(config.poll_interval_ms.max(1));
    let mut ticks = time::interval_at(time::Instant::now() + period, period);
    ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
    while !poller.is_terminal() {
        ticks.tick().await;
        if let Drained::Aborted = drain_commands(&commands, &client, race_id) {
            info!("Race session aborted while polling");
            return;
        }

        let race = match client.get_race(race_id).await {
            Ok(race) => race,
            Err(err) => {
                warn!("Race status fetch failed, retrying next tick: {err:#}");
                continue;
            }
        };

        match poller.observe(&race) {
            PollStep::Wait => {}
            PollStep::Progress(positions) => {
                if events.send(RaceEvent::Progress { positions }).is_err() {
                    return;
                }
            }
            PollStep::Finished(positions) => {
                info!("Race {} finished", race.id);
                let _ = events.send(RaceEvent::Finished { positions });
            }
        }
    }
}
