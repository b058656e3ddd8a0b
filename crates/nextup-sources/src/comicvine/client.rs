use crate::error::SourceError;
use anyhow::{anyhow, Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

pub const COMICVINE_BASE_URL: &str = "https://comicvine.gamespot.com/api";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    error: String,
    #[serde(default)]
    status_code: i64,
    #[serde(default)]
    results: Vec<ComicVolume>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ComicVolumePublisher {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ComicVolumeImage {
    pub original_url: Option<String>,
    pub medium_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ComicVolume {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    pub start_year: Option<String>,
    pub count_of_issues: Option<i64>,
    pub publisher: Option<ComicVolumePublisher>,
    pub image: Option<ComicVolumeImage>,
    pub site_detail_url: Option<String>,
}

pub struct ComicVineClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl ComicVineClient {
    pub fn new(api_key: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            // ComicVine rejects requests without a user agent.
            .user_agent(concat!("nextup/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self {
            client,
            base_url: COMICVINE_BASE_URL.to_string(),
            api_key,
        })
    }

    pub async fn search_volumes(&self, query: &str) -> Result<Vec<ComicVolume>> {
        let url = format!(
            "{}/search/?api_key={}&format=json&resources=volume&limit=25&query={}",
            self.base_url,
            urlencoding::encode(&self.api_key),
            urlencoding::encode(query)
        );
        debug!("ComicVine search for '{}'", query);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("Failed to reach ComicVine")?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                service: "ComicVine",
                status: status.as_u16(),
                url: format!("{}/search/", self.base_url),
            }
            .into());
        }

        let parsed: SearchResponse = response
            .json()
            .await
            .context("Failed to parse ComicVine search response")?;
        volumes_from(parsed)
    }

    /// The highest scoring volume for `query`, if any scores at least 0.5.
    /// `score(query, candidate)` ranks each volume name.
    pub async fn best_volume<F>(&self, query: &str, score: F) -> Result<Option<(ComicVolume, f64)>>
    where
        F: Fn(&str, &str) -> f64,
    {
        let volumes = self.search_volumes(query).await?;
        Ok(pick_best(volumes, query, score))
    }
}

fn volumes_from(parsed: SearchResponse) -> Result<Vec<ComicVolume>> {
    // status_code 1 is OK; anything else carries a message in `error`.
    if parsed.status_code != 1 {
        return Err(anyhow!("ComicVine error {}: {}", parsed.status_code, parsed.error));
    }
    Ok(parsed.results)
}

const MIN_VOLUME_SCORE: f64 = 0.5;

fn pick_best<F>(volumes: Vec<ComicVolume>, query: &str, score: F) -> Option<(ComicVolume, f64)>
where
    F: Fn(&str, &str) -> f64,
{
    volumes
        .into_iter()
        .map(|v| {
            let s = score(query, &v.name);
            (v, s)
        })
        .filter(|(_, s)| *s >= MIN_VOLUME_SCORE)
        // Earlier results win ties.
        .fold(None, |best: Option<(ComicVolume, f64)>, candidate| match best {
            Some(b) if b.1 >= candidate.1 => Some(b),
            _ => Some(candidate),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exact_or_nothing(a: &str, b: &str) -> f64 {
        if a.eq_ignore_ascii_case(b) {
            1.0
        } else if b.to_lowercase().contains(&a.to_lowercase()) {
            0.6
        } else {
            0.0
        }
    }

    #[test]
    fn test_volumes_from_checks_status_code() {
        let ok: SearchResponse = serde_json::from_str(
            r#"{"error": "OK", "status_code": 1, "results": [
                {"id": 4050, "name": "Saga", "start_year": "2012", "publisher": {"name": "Image"}}
            ]}"#,
        )
        .unwrap();
        let volumes = volumes_from(ok).unwrap();
        assert_eq!(volumes[0].publisher.as_ref().unwrap().name.as_deref(), Some("Image"));

        let bad: SearchResponse =
            serde_json::from_str(r#"{"error": "Invalid API Key", "status_code": 100, "results": []}"#).unwrap();
        assert!(volumes_from(bad).is_err());
    }

    #[test]
    fn test_pick_best_prefers_exact_and_respects_threshold() {
        let volumes = vec![
            ComicVolume {
                id: 1,
                name: "Saga of the Swamp Thing".to_string(),
                ..ComicVolume::default()
            },
            ComicVolume {
                id: 2,
                name: "Saga".to_string(),
                ..ComicVolume::default()
            },
        ];
        let (best, score) = pick_best(volumes.clone(), "saga", exact_or_nothing).unwrap();
        assert_eq!(best.id, 2);
        assert_eq!(score, 1.0);

        assert!(pick_best(volumes, "Watchmen", exact_or_nothing).is_none());
    }
}
