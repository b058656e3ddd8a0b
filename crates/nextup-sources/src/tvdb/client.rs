use super::models::{
    LoginData, SeriesSeasons, TvdbEnvelope, TvdbEpisode, TvdbSearchResult, TvdbSeason, TvdbSeasonExtended,
    TvdbSeries,
};
use crate::error::SourceError;
use crate::traits::TvdbApi;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

pub const TVDB_BASE_URL: &str = "https://api4.thetvdb.com/v4";

/// TVDB v4 client. The bearer token is fetched lazily and refreshed once
/// when a request comes back 401.
pub struct TvdbClient {
    client: Client,
    base_url: String,
    api_key: String,
    pin: Option<String>,
    token: Arc<RwLock<Option<String>>>,
}

enum Fetch<T> {
    Found(T),
    NotFound,
    Unauthorized,
}

impl TvdbClient {
    pub fn new(api_key: String, pin: Option<String>) -> Result<Self> {
        Self::with_base_url(TVDB_BASE_URL, api_key, pin)
    }

    pub fn with_base_url(base_url: &str, api_key: String, pin: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            pin,
            token: Arc::new(RwLock::new(None)),
        })
    }

    /// POST /login and cache the returned token.
    pub async fn login(&self) -> Result<String> {
        let mut body = serde_json::json!({ "apikey": self.api_key });
        if let Some(ref pin) = self.pin {
            body["pin"] = serde_json::Value::String(pin.clone());
        }

        let url = format!("{}/login", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .context("Failed to reach TVDB login endpoint")?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Auth {
                service: "TVDB",
                message: format!("HTTP {}", status),
            }
            .into());
        }

        let envelope: TvdbEnvelope<LoginData> = response
            .json()
            .await
            .context("Failed to parse TVDB login response")?;
        info!("Authenticated with TVDB");

        let token = envelope.data.token;
        *self.token.write().await = Some(token.clone());
        Ok(token)
    }

    async fn current_token(&self) -> Result<String> {
        if let Some(token) = self.token.read().await.clone() {
            return Ok(token);
        }
        self.login().await
    }

    async fn fetch<T: DeserializeOwned>(&self, url: &str, token: &str) -> Result<Fetch<T>> {
        let response = self
            .client
            .get(url)
            .bearer_auth(token)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .with_context(|| format!("Failed to reach TVDB at {}", url))?;

        match response.status() {
            StatusCode::UNAUTHORIZED => Ok(Fetch::Unauthorized),
            StatusCode::NOT_FOUND => Ok(Fetch::NotFound),
            status if !status.is_success() => Err(SourceError::Status {
                service: "TVDB",
                status: status.as_u16(),
                url: url.to_string(),
            }
            .into()),
            _ => {
                let envelope: TvdbEnvelope<T> = response
                    .json()
                    .await
                    .with_context(|| format!("Failed to parse TVDB response from {}", url))?;
                Ok(Fetch::Found(envelope.data))
            }
        }
    }

    /// GET `path`, retrying exactly once with a fresh token on 401. A second
    /// 401 or a 404 yields `None`.
    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>> {
        let url = format!("{}{}", self.base_url, path);
        debug!("TVDB GET {}", url);

        let token = self.current_token().await?;
        match self.fetch(&url, &token).await? {
            Fetch::Found(data) => return Ok(Some(data)),
            Fetch::NotFound => return Ok(None),
            Fetch::Unauthorized => {
                info!("TVDB token rejected, refreshing");
            }
        }

        let token = self.login().await?;
        match self.fetch(&url, &token).await? {
            Fetch::Found(data) => Ok(Some(data)),
            Fetch::NotFound => Ok(None),
            Fetch::Unauthorized => {
                warn!(url = %url, "TVDB still unauthorized after token refresh, treating as not found");
                Ok(None)
            }
        }
    }
}

#[async_trait]
impl TvdbApi for TvdbClient {
    async fn search(&self, query: &str, kind: &str) -> Result<Vec<TvdbSearchResult>> {
        let path = format!(
            "/search?query={}&type={}",
            urlencoding::encode(query),
            urlencoding::encode(kind)
        );
        Ok(self.get(&path).await?.unwrap_or_default())
    }

    async fn series_details(&self, series_id: &str) -> Result<Option<TvdbSeries>> {
        self.get(&format!("/series/{}", urlencoding::encode(series_id))).await
    }

    async fn series_seasons(&self, series_id: &str) -> Result<Vec<TvdbSeason>> {
        let seasons: Option<SeriesSeasons> = self
            .get(&format!("/series/{}/extended?short=true", urlencoding::encode(series_id)))
            .await?;
        Ok(seasons.map(|s| s.seasons).unwrap_or_default())
    }

    async fn season_extended(&self, season_id: i64) -> Result<Option<TvdbSeasonExtended>> {
        self.get(&format!("/seasons/{}/extended", season_id)).await
    }

    async fn episode_details(&self, episode_id: i64) -> Result<Option<TvdbEpisode>> {
        self.get(&format!("/episodes/{}", episode_id)).await
    }
}
