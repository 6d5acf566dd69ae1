use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::Serialize;

use crate::models::{Race, Racer, Track};

#[derive(Debug, Serialize, PartialEq)]
pub struct CreateRacePayload {
    pub player_id: i64,
    pub track_id: i64,
}

/// Thin wrapper over the race server's REST endpoints. Every call returns
/// an explicit `Result` so callers can tell a failed request from an empty
/// but valid response.
#[derive(Clone)]
pub struct RaceClient {
    http: reqwest::Client,
    base_url: String,
}

impl RaceClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        // The server is written for browser clients and checks this.
        headers.insert(
            "Access-Control-Allow-Origin",
            HeaderValue::from_static("*"),
        );

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub async fn list_tracks(&self) -> Result<Vec<Track>> {
        let url = format!("{}/api/tracks", self.base_url);
        self.http
            .get(&url)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .with_context(|| format!("GET {url} failed"))?
            .json::<Vec<Track>>()
            .await
            .context("failed to decode track list")
    }

    pub async fn list_racers(&self) -> Result<Vec<Racer>> {
        let url = format!("{}/api/cars", self.base_url);
        self.http
            .get(&url)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .with_context(|| format!("GET {url} failed"))?
            .json::<Vec<Racer>>()
            .await
            .context("failed to decode racer list")
    }

    pub async fn create_race(&self, racer_id: i64, track_id: i64) -> Result<Race> {
        let url = format!("{}/api/races", self.base_url);
        let payload = CreateRacePayload {
            player_id: racer_id,
            track_id,
        };
        self.http
            .post(&url)
            .json(&payload)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .with_context(|| format!("POST {url} failed"))?
            .json::<Race>()
            .await
            .context("failed to decode created race")
    }

    pub async fn start_race(&self, race_id: i64) -> Result<()> {
        let url = format!("{}/api/races/{race_id}/start", self.base_url);
        self.http
            .post(&url)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .with_context(|| format!("POST {url} failed"))?;
        Ok(())
    }

    pub async fn get_race(&self, race_id: i64) -> Result<Race> {
        let url = format!("{}/api/races/{race_id}", self.base_url);
        self.http
            .get(&url)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .with_context(|| format!("GET {url} failed"))?
            .json::<Race>()
            .await
            .context("failed to decode race status")
    }

    pub async fn accelerate(&self, race_id: i64) -> Result<()> {
        let url = format!("{}/api/races/{race_id}/accelerate", self.base_url);
        self.http
            .post(&url)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .with_context(|| format!("POST {url} failed"))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_race_payload_carries_integer_ids() {
        let payload = CreateRacePayload {
            player_id: 3,
            track_id: 6,
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["player_id"], serde_json::json!(3));
        assert_eq!(value["track_id"], serde_json::json!(6));
        assert!(value["player_id"].is_i64());
        assert!(value["track_id"].is_i64());
    }
}
