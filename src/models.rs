use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Track {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Racer {
    pub id: i64,
    pub driver_name: String,
    #[serde(default)]
    pub top_speed: i64,
    #[serde(default)]
    pub acceleration: i64,
    #[serde(default)]
    pub handling: i64,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum RaceStatus {
    #[default]
    #[serde(rename = "pending", alias = "unstarted")]
    Pending,
    #[serde(rename = "in-progress")]
    InProgress,
    #[serde(rename = "finished")]
    Finished,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PositionRecord {
    pub id: i64,
    pub driver_name: String,
    #[serde(default)]
    pub segment: i64,
    #[serde(default)]
    pub speed: i64,
}

/// Race as the server reports it. Creation responses use capitalized keys
/// ("ID", "Track", "Cars"), status responses lowercase ones, so both are
/// accepted on every field.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Race {
    #[serde(rename = "ID", alias = "id")]
    pub id: i64,
    #[serde(rename = "Track", alias = "track")]
    pub track: Track,
    #[serde(rename = "Cars", alias = "cars", default)]
    pub cars: Vec<Racer>,
    #[serde(default)]
    pub status: RaceStatus,
    #[serde(default)]
    pub positions: Vec<PositionRecord>,
}

impl Race {
    /// The server numbers races from one but addresses them from zero.
    pub fn handle_id(&self) -> i64 {
        self.id - 1
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectedEntry {
    pub id: i64,
    pub name: String,
}

/// The user's current track/racer choice. Owned by the app struct and
/// handed to the select screen by reference; the race id lives with the
/// running session instead.
#[derive(Debug, Clone, Default)]
pub struct RaceSelection {
    pub track: Option<SelectedEntry>,
    pub racer: Option<SelectedEntry>,
}

impl RaceSelection {
    pub fn choose_track(&mut self, track: &Track) {
        self.track = Some(SelectedEntry {
            id: track.id,
            name: track.name.clone(),
        });
    }

    pub fn choose_racer(&mut self, racer: &Racer) {
        self.racer = Some(SelectedEntry {
            id: racer.id,
            name: racer.driver_name.clone(),
        });
    }

    pub fn is_complete(&self) -> bool {
        self.track.is_some() && self.racer.is_some()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StandingRow {
    pub place: usize,
    pub display_name: String,
    pub segment: i64,
    pub is_player: bool,
}

fn standing_row(place: usize, record: &PositionRecord, player_id: Option<i64>) -> StandingRow {
    let is_player = player_id == Some(record.id);
    let display_name = if is_player {
        format!("{} (you)", record.driver_name)
    } else {
        record.driver_name.clone()
    };
    StandingRow {
        place,
        display_name,
        segment: record.segment,
        is_player,
    }
}

/// Live leaderboard rows: descending by track segment, ties kept in the
/// order the server sent them.
pub fn progress_standings(
    positions: &[PositionRecord],
    player_id: Option<i64>,
) -> Vec<StandingRow> {
    let mut ordered: Vec<&PositionRecord> = positions.iter().collect();
    ordered.sort_by(|a, b| b.segment.cmp(&a.segment));
    ordered
        .into_iter()
        .enumerate()
        .map(|(index, record)| standing_row(index + 1, record, player_id))
        .collect()
}

/// Final results rows, in the order the server reported them.
pub fn final_standings(positions: &[PositionRecord], player_id: Option<i64>) -> Vec<StandingRow> {
    positions
        .iter()
        .enumerate()
        .map(|(index, record)| standing_row(index + 1, record, player_id))
        .collect()
}

#[cfg(test)]
mod wire_tests {
    use super::*;

    #[test]
    fn test_parse_track_list() {
        let raw = r#"[{"id":1,"name":"Executive Park"},{"id":2,"name":"Seaside Loop"}]"#;
        let tracks: Vec<Track> = serde_json::from_str(raw).unwrap();
        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[1].name, "Seaside Loop");
    }

    #[test]
    fn test_parse_racer_list() {
        let raw = r#"[{"id":3,"driver_name":"Racer 3","top_speed":500,"acceleration":10,"handling":10}]"#;
        let racers: Vec<Racer> = serde_json::from_str(raw).unwrap();
        assert_eq!(racers[0].id, 3);
        assert_eq!(racers[0].driver_name, "Racer 3");
        assert_eq!(racers[0].top_speed, 500);
    }

    #[test]
    fn test_parse_created_race_uses_capitalized_keys() {
        let raw = r#"{
            "ID": 5,
            "Track": {"id": 2, "name": "Seaside Loop"},
            "Cars": [{"id": 1, "driver_name": "Racer 1"}]
        }"#;
        let race: Race = serde_json::from_str(raw).unwrap();
        assert_eq!(race.id, 5);
        assert_eq!(race.handle_id(), 4);
        assert_eq!(race.track.name, "Seaside Loop");
        assert_eq!(race.cars.len(), 1);
        assert_eq!(race.status, RaceStatus::Pending);
        assert!(race.positions.is_empty());
    }

    #[test]
    fn test_parse_race_status_response() {
        let raw = r#"{
            "id": 5,
            "track": {"id": 2, "name": "Seaside Loop"},
            "status": "in-progress",
            "positions": [
                {"id": 1, "driver_name": "Racer 1", "segment": 42, "speed": 120},
                {"id": 2, "driver_name": "Racer 2", "segment": 37, "speed": 90}
            ]
        }"#;
        let race: Race = serde_json::from_str(raw).unwrap();
        assert_eq!(race.status, RaceStatus::InProgress);
        assert_eq!(race.positions.len(), 2);
        assert_eq!(race.positions[0].segment, 42);
    }

    #[test]
    fn test_parse_finished_status() {
        let raw = r#"{"id":1,"track":{"id":1,"name":"T"},"status":"finished"}"#;
        let race: Race = serde_json::from_str(raw).unwrap();
        assert_eq!(race.status, RaceStatus::Finished);
    }
}

#[cfg(test)]
mod selection_tests {
    use super::*;

    #[test]
    fn test_choosing_a_track_replaces_the_previous_one() {
        let mut selection = RaceSelection::default();
        selection.choose_track(&Track {
            id: 1,
            name: "First".to_string(),
        });
        selection.choose_track(&Track {
            id: 2,
            name: "Second".to_string(),
        });
        assert_eq!(selection.track.as_ref().unwrap().id, 2);
        assert!(!selection.is_complete());
    }

    #[test]
    fn test_selection_complete_needs_both_categories() {
        let mut selection = RaceSelection::default();
        selection.choose_racer(&Racer {
            id: 4,
            driver_name: "Racer 4".to_string(),
            top_speed: 0,
            acceleration: 0,
            handling: 0,
        });
        assert!(!selection.is_complete());
        selection.choose_track(&Track {
            id: 1,
            name: "First".to_string(),
        });
        assert!(selection.is_complete());
    }
}

#[cfg(test)]
mod standings_tests {
    use super::*;

    fn record(id: i64, segment: i64) -> PositionRecord {
        PositionRecord {
            id,
            driver_name: format!("Racer {id}"),
            segment,
            speed: 0,
        }
    }

    #[test]
    fn test_progress_rows_sorted_by_descending_segment() {
        let positions = vec![record(1, 5), record(2, 9)];
        let rows = progress_standings(&positions, None);
        assert_eq!(rows[0].display_name, "Racer 2");
        assert_eq!(rows[0].place, 1);
        assert_eq!(rows[1].display_name, "Racer 1");
        assert_eq!(rows[1].place, 2);
    }

    #[test]
    fn test_progress_rows_keep_server_order_on_ties() {
        let positions = vec![record(3, 7), record(1, 7), record(2, 7)];
        let rows = progress_standings(&positions, None);
        let names: Vec<&str> = rows.iter().map(|row| row.display_name.as_str()).collect();
        assert_eq!(names, vec!["Racer 3", "Racer 1", "Racer 2"]);
    }

    #[test]
    fn test_player_row_annotated_exactly_once() {
        let positions = vec![record(1, 5), record(2, 9)];
        let rows = progress_standings(&positions, Some(1));
        assert_eq!(rows[1].display_name, "Racer 1 (you)");
        assert!(rows[1].is_player);
        assert!(!rows[0].is_player);
        assert_eq!(rows[1].display_name.matches("(you)").count(), 1);
    }

    #[test]
    fn test_final_rows_keep_server_order() {
        let positions = vec![record(2, 120), record(1, 118), record(3, 117)];
        let rows = final_standings(&positions, Some(3));
        assert_eq!(rows[0].display_name, "Racer 2");
        assert_eq!(rows[2].display_name, "Racer 3 (you)");
        assert_eq!(rows[2].place, 3);
    }
}
