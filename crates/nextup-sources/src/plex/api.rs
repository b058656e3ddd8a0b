use super::models::{MediaContainer, PlexDirectory, PlexMetadata, PlexResponse};
use crate::error::SourceError;
use crate::traits::MediaServer;
use anyhow::{Context, Result};
use async_trait::async_trait;
use nextup_models::SectionKind;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::debug;

const CLIENT_IDENTIFIER: &str = "nextup-cli";

/// HTTP client for one Plex Media Server.
pub struct PlexHttpClient {
    client: Client,
    server_url: String,
}

impl PlexHttpClient {
    pub fn new(server_url: &str, token: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .default_headers({
                let mut headers = reqwest::header::HeaderMap::new();
                headers.insert(
                    reqwest::header::ACCEPT,
                    reqwest::header::HeaderValue::from_static("application/json"),
                );
                headers.insert(
                    reqwest::header::HeaderName::from_static("x-plex-token"),
                    reqwest::header::HeaderValue::from_str(token).context("Invalid token format")?,
                );
                headers.insert(
                    reqwest::header::HeaderName::from_static("x-plex-client-identifier"),
                    reqwest::header::HeaderValue::from_static(CLIENT_IDENTIFIER),
                );
                headers
            })
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            server_url: server_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    /// `GET path`; `None` on 404.
    async fn get_container(&self, path: &str) -> Result<Option<MediaContainer>> {
        let url = format!("{}{}", self.server_url, path);
        debug!("Plex GET {}", url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Failed to reach Plex at {}", url))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(SourceError::Status {
                service: "Plex",
                status: status.as_u16(),
                url,
            }
            .into());
        }

        let parsed: PlexResponse = response
            .json()
            .await
            .with_context(|| format!("Failed to parse Plex response from {}", url))?;
        Ok(Some(parsed.media_container))
    }

    /// Verifies URL and token; returns the server's machine identifier.
    pub async fn check_connection(&self) -> Result<String> {
        let container = self
            .get_container("/identity")
            .await?
            .context("Plex server has no /identity endpoint")?;
        Ok(container.machine_identifier.unwrap_or_default())
    }
}

#[async_trait]
impl MediaServer for PlexHttpClient {
    async fn get_sections(&self) -> Result<Vec<PlexDirectory>> {
        let container = self.get_container("/library/sections").await?;
        Ok(container.map(|c| c.directory).unwrap_or_default())
    }

    async fn get_section_items(&self, section_key: &str, kind: SectionKind) -> Result<Vec<PlexMetadata>> {
        let path = format!(
            "/library/sections/{}/all?type={}&includeGuids=1",
            urlencoding::encode(section_key),
            kind.item_type()
        );
        let container = self.get_container(&path).await?;
        Ok(container.map(|c| c.metadata).unwrap_or_default())
    }

    async fn get_metadata(&self, rating_key: &str) -> Result<Option<PlexMetadata>> {
        let path = format!("/library/metadata/{}?includeGuids=1", urlencoding::encode(rating_key));
        let container = self.get_container(&path).await?;
        Ok(container.and_then(|c| c.metadata.into_iter().next()))
    }

    async fn get_children(&self, rating_key: &str) -> Result<Vec<PlexMetadata>> {
        let path = format!("/library/metadata/{}/children", urlencoding::encode(rating_key));
        let container = self.get_container(&path).await?;
        Ok(container.map(|c| c.metadata).unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_trims_trailing_slash() {
        let client = PlexHttpClient::new("http://plex.local:32400/", "abc", Duration::from_secs(5)).unwrap();
        assert_eq!(client.server_url(), "http://plex.local:32400");
    }

    #[test]
    fn test_new_rejects_unprintable_token() {
        assert!(PlexHttpClient::new("http://plex.local:32400", "bad\ntoken", Duration::from_secs(5)).is_err());
    }
}
