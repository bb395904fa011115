use crate::config::Config;
use crate::error::{AppError, Result};
use crate::models::Track;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::RwLock;

/// Tokens are refreshed this long before the provider's stated expiry.
const TOKEN_EXPIRY_MARGIN_SECS: i64 = 60;

/// Text search over a music catalog, best matches first.
#[async_trait]
pub trait TrackCatalog: Send + Sync {
    async fn search_tracks(&self, query: &str, limit: usize) -> Result<Vec<Track>>;
}

#[derive(Debug, Clone)]
struct AccessToken {
    value: String,
    expires_at: DateTime<Utc>,
}

impl AccessToken {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(TOKEN_EXPIRY_MARGIN_SECS) < self.expires_at
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    tracks: SearchTracks,
}

#[derive(Debug, Deserialize)]
struct SearchTracks {
    #[serde(default)]
    items: Vec<SpotifyTrack>,
}

#[derive(Debug, Deserialize)]
struct SpotifyArtist {
    name: String,
}

#[derive(Debug, Deserialize)]
struct SpotifyTrack {
    name: String,
    #[serde(default)]
    artists: Vec<SpotifyArtist>,
    preview_url: Option<String>,
}

impl From<SpotifyTrack> for Track {
    fn from(track: SpotifyTrack) -> Self {
        Track {
            title: track.name,
            artist: track
                .artists
                .into_iter()
                .next()
                .map(|a| a.name)
                .unwrap_or_default(),
            preview_url: track.preview_url,
        }
    }
}

/// Spotify Web API client authenticated with the client-credentials flow.
#[derive(Debug)]
pub struct SpotifyClient {
    api_url: String,
    accounts_url: String,
    client_id: String,
    client_secret: String,
    token: RwLock<Option<AccessToken>>,
    client: Client,
}

impl SpotifyClient {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.http_timeout_secs))
            .build()?;

        Ok(Self {
            api_url: config.spotify_api_url.trim_end_matches('/').to_string(),
            accounts_url: config.spotify_accounts_url.trim_end_matches('/').to_string(),
            client_id: config.spotify_client_id.clone(),
            client_secret: config.spotify_client_secret.clone(),
            token: RwLock::new(None),
            client,
        })
    }

    async fn access_token(&self) -> Result<String> {
        if let Some(token) = self.token.read().await.as_ref() {
            if token.is_fresh(Utc::now()) {
                return Ok(token.value.clone());
            }
        }

        let mut guard = self.token.write().await;
        // Another request may have refreshed while we waited for the lock
        if let Some(token) = guard.as_ref() {
            if token.is_fresh(Utc::now()) {
                return Ok(token.value.clone());
            }
        }

        let token = self.request_token().await?;
        let value = token.value.clone();
        *guard = Some(token);
        Ok(value)
    }

    async fn request_token(&self) -> Result<AccessToken> {
        let url = format!("{}/api/token", self.accounts_url);
        tracing::debug!("Requesting Spotify access token from {}", url);

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|e| AppError::Catalog(format!("Token request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Spotify token error: {} - {}", status, body);
            return Err(AppError::Catalog(format!(
                "Token endpoint returned status: {}",
                status
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| AppError::Catalog(format!("Failed to parse token response: {}", e)))?;

        Ok(AccessToken {
            value: token.access_token,
            expires_at: expiry_from(Utc::now(), token.expires_in)?,
        })
    }
}

#[async_trait]
impl TrackCatalog for SpotifyClient {
    async fn search_tracks(&self, query: &str, limit: usize) -> Result<Vec<Track>> {
        let token = self.access_token().await?;
        let url = format!("{}/v1/search", self.api_url);
        let limit = limit.to_string();

        tracing::debug!(%query, %limit, "Searching Spotify");

        let response = self
            .client
            .get(&url)
            .bearer_auth(token)
            .query(&[("q", query), ("type", "track"), ("limit", limit.as_str())])
            .send()
            .await
            .map_err(|e| AppError::Catalog(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Spotify API error: {} - {}", status, body);
            return Err(AppError::Catalog(format!("API returned status: {}", status)));
        }

        let response_text = response
            .text()
            .await
            .map_err(|e| AppError::Catalog(format!("Failed to read response: {}", e)))?;

        let tracks = parse_search_response(&response_text)?;
        tracing::debug!("Found {} tracks in response", tracks.len());
        Ok(tracks)
    }
}

fn expiry_from(now: DateTime<Utc>, expires_in: i64) -> Result<DateTime<Utc>> {
    Duration::try_seconds(expires_in)
        .and_then(|lifetime| now.checked_add_signed(lifetime))
        .ok_or_else(|| AppError::Catalog(format!("Token lifetime out of range: {}", expires_in)))
}

fn parse_search_response(body: &str) -> Result<Vec<Track>> {
    let data: SearchResponse = serde_json::from_str(body).map_err(|e| {
        tracing::error!(
            "Unparseable Spotify response: {}",
            body.chars().take(200).collect::<String>()
        );
        AppError::Catalog(format!("Failed to parse response: {}", e))
    })?;

    Ok(data.tracks.items.into_iter().map(Track::from).collect())
}
