use tracing::warn;

use crate::models::{PositionRecord, Race, RaceStatus};

/// Countdown digits between the start view and the green flag:
/// `Counting(n) -> Counting(n-1) -> ... -> Counting(0) -> Done`.
/// The starting digit is shown by the view itself; `tick` yields each
/// following digit, then `None` once the sequence is spent.
#[derive(Debug, Clone, PartialEq)]
pub struct CountdownTimer {
    remaining: Option<u8>,
}

impl CountdownTimer {
    pub fn new(start_from: u8) -> Self {
        Self {
            remaining: Some(start_from),
        }
    }

    pub fn current(&self) -> Option<u8> {
        self.remaining
    }

    /// True once 0 has been shown; a driving loop should stop scheduling
    /// ticks at that point.
    pub fn is_finished(&self) -> bool {
        matches!(self.remaining, Some(0) | None)
    }

    pub fn tick(&mut self) -> Option<u8> {
        match self.remaining {
            Some(n) if n > 0 => {
                self.remaining = Some(n - 1);
                Some(n - 1)
            }
            _ => {
                self.remaining = None;
                None
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PollStep {
    /// Race not started yet, nothing to render.
    Wait,
    /// Race running, leaderboard should be refreshed.
    Progress(Vec<PositionRecord>),
    /// Race over; terminal, no further fetches should be issued.
    Finished(Vec<PositionRecord>),
}

/// Status-polling state machine: `Polling -> ... -> Terminal`. One
/// `observe` per fetched race; once terminal it keeps answering `Wait`
/// so a stray late fetch cannot re-render results.
#[derive(Debug, Default)]
pub struct RacePoller {
    terminal: bool,
}

impl RacePoller {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_terminal(&self) -> bool {
        self.terminal
    }

    pub fn observe(&mut self, race: &Race) -> PollStep {
        if self.terminal {
            warn!("Race {} observed after it finished", race.id);
            return PollStep::Wait;
        }

        match race.status {
            RaceStatus::Pending => PollStep::Wait,
            RaceStatus::InProgress => PollStep::Progress(race.positions.clone()),
            RaceStatus::Finished => {
                self.terminal = true;
                PollStep::Finished(race.positions.clone())
            }
        }
    }
}

#[cfg(test)]
mod countdown_tests {
    use super::*;

    #[test]
    fn test_countdown_shows_three_two_one_zero_then_stops() {
        let mut timer = CountdownTimer::new(3);
        let mut shown = vec![timer.current().unwrap()];
        while let Some(digit) = timer.tick() {
            shown.push(digit);
        }
        assert_eq!(shown, vec![3, 2, 1, 0]);
        assert!(timer.is_finished());
        assert_eq!(timer.tick(), None);
    }

    #[test]
    fn test_countdown_finishes_on_reaching_zero() {
        let mut timer = CountdownTimer::new(1);
        assert!(!timer.is_finished());
        assert_eq!(timer.tick(), Some(0));
        assert!(timer.is_finished());
    }
}

#[cfg(test)]
mod poller_tests {
    use super::*;
    use crate::models::Track;

    fn race_with_status(status: RaceStatus) -> Race {
        Race {
            id: 1,
            track: Track {
                id: 1,
                name: "Executive Park".to_string(),
            },
            cars: Vec::new(),
            status,
            positions: vec![PositionRecord {
                id: 1,
                driver_name: "Racer 1".to_string(),
                segment: 10,
                speed: 50,
            }],
        }
    }

    #[test]
    fn test_scripted_sequence_renders_two_updates_then_one_result() {
        let mut poller = RacePoller::new();
        let script = [
            RaceStatus::Pending,
            RaceStatus::InProgress,
            RaceStatus::InProgress,
            RaceStatus::Finished,
        ];

        let steps: Vec<PollStep> = script
            .iter()
            .map(|status| poller.observe(&race_with_status(*status)))
            .collect();

        assert_eq!(steps[0], PollStep::Wait);
        assert!(matches!(steps[1], PollStep::Progress(_)));
        assert!(matches!(steps[2], PollStep::Progress(_)));
        assert!(matches!(steps[3], PollStep::Finished(_)));
        assert!(poller.is_terminal());
    }

    #[test]
    fn test_late_fetch_after_finish_renders_nothing() {
        let mut poller = RacePoller::new();
        poller.observe(&race_with_status(RaceStatus::Finished));
        let step = poller.observe(&race_with_status(RaceStatus::InProgress));
        assert_eq!(step, PollStep::Wait);
    }
}
