//! Spotify Web API connector implementation
//!
//! Implements the `CatalogService` trait for Spotify Web API v1.

use async_trait::async_trait;
use bridge_traits::catalog::{
    CatalogAlbum, CatalogArtist, CatalogPlaylist, CatalogService, CatalogTrack,
};
use bridge_traits::http::{HttpClient, HttpRequest, HttpResponse, RetryPolicy};
use chrono::NaiveDate;
use core_runtime::config::CatalogConfig;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::error::{Result, SpotifyError};
use crate::types::{
    ApiAlbum, ApiAlbumSearch, ApiArtist, ApiErrorBody, ApiPaging, ApiPlaylist, ApiPlaylistItem,
    ApiTrack,
};

/// Spotify Web API base URL
pub const SPOTIFY_API_BASE: &str = "https://api.spotify.com/v1";

/// Service name playlists refer to
pub const SERVICE_NAME: &str = "spotify";

/// Maximum items per playlist page (Web API limit)
const PLAYLIST_PAGE_SIZE: u32 = 100;

/// Stop following `next` links after this many pages
const MAX_PLAYLIST_PAGES: usize = 200;

/// Candidates requested per album search
const SEARCH_LIMIT: u32 = 5;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Spotify Web API connector
///
/// Spotify is the master catalog: tracks it returns already carry canonical
/// artist and album identifiers.
///
/// # Features
///
/// - Paginated playlist listing following `next` links
/// - Local files and podcast episodes are skipped
/// - Release dates parsed according to `release_date_precision`
/// - Exponential backoff on 429 and 5xx, honouring `Retry-After`
///
/// # Example
///
/// ```ignore
/// use provider_spotify::SpotifyConnector;
/// use bridge_traits::catalog::CatalogService;
///
/// let connector = SpotifyConnector::new(http_client, access_token);
/// let (playlist, tracks) = connector.download_playlist("37i9dQZF1DX4JAvHpjipBk").await?;
/// ```
pub struct SpotifyConnector {
    /// HTTP client for API requests
    http_client: Arc<dyn HttpClient>,

    /// OAuth 2.0 access token
    access_token: String,

    /// API base URL without trailing slash
    base_url: String,

    retry_policy: RetryPolicy,
}

impl SpotifyConnector {
    /// Create a connector against the public Web API
    pub fn new(http_client: Arc<dyn HttpClient>, access_token: impl Into<String>) -> Self {
        Self {
            http_client,
            access_token: access_token.into(),
            base_url: SPOTIFY_API_BASE.to_string(),
            retry_policy: RetryPolicy::default(),
        }
    }

    /// Create a connector from the catalog section of `CoreConfig`
    pub fn from_config(http_client: Arc<dyn HttpClient>, config: &CatalogConfig) -> Self {
        Self::new(http_client, config.access_token.clone())
            .with_base_url(config.api_base_url.clone())
            .with_retry_policy(RetryPolicy::default().with_max_attempts(config.max_retries))
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Execute a GET request with retry logic
    ///
    /// Rate limits, server errors and transport failures are retried on the
    /// policy's backoff, honouring `Retry-After`. Any other response is
    /// returned as-is for the caller to interpret.
    #[instrument(skip(self))]
    async fn execute_with_retry(&self, url: &str) -> Result<HttpResponse> {
        let max_attempts = self.retry_policy.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            let request = HttpRequest::get(url)
                .bearer_token(&self.access_token)
                .accept_json()
                .timeout(REQUEST_TIMEOUT);

            let retry_after = match self.http_client.execute(request).await {
                Ok(response) if response.is_retryable() => {
                    if attempt >= max_attempts {
                        warn!(
                            status = response.status,
                            attempts = attempt,
                            "API request failed after retries"
                        );
                        return Err(Self::exhausted(&response, attempt));
                    }
                    warn!(
                        status = response.status,
                        attempt,
                        max_attempts,
                        "API request failed, retrying"
                    );
                    response.retry_after()
                }
                Ok(response) => {
                    debug!(status = response.status, "API request completed");
                    return Ok(response);
                }
                Err(e) => {
                    if attempt >= max_attempts {
                        warn!(error = %e, attempts = attempt, "API request failed after retries");
                        return Err(e.into());
                    }
                    warn!(error = %e, attempt, max_attempts, "API request failed, retrying");
                    None
                }
            };

            let delay = self.retry_policy.delay_after(attempt, retry_after);
            debug!(delay_ms = delay.as_millis() as u64, "Backing off");
            tokio::time::sleep(delay).await;
        }
    }

    fn exhausted(response: &HttpResponse, attempts: u32) -> SpotifyError {
        if response.is_rate_limited() {
            SpotifyError::RateLimitExceeded { attempts }
        } else {
            SpotifyError::ApiError {
                status_code: response.status,
                message: format!("Request failed after {} attempts", attempts),
            }
        }
    }

    /// GET `url` and decode the JSON body, mapping error statuses
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        resource: &'static str,
        id: &str,
    ) -> Result<T> {
        let response = self.execute_with_retry(url).await?;

        if !response.is_success() {
            return Err(Self::status_error(&response, resource, id));
        }

        serde_json::from_slice(&response.body).map_err(|e| {
            SpotifyError::ParseError(format!("Failed to parse {} response: {}", resource, e))
        })
    }

    fn status_error(response: &HttpResponse, resource: &'static str, id: &str) -> SpotifyError {
        let message = serde_json::from_slice::<ApiErrorBody>(&response.body)
            .map(|body| body.error.message)
            .unwrap_or_else(|_| response.body_text());

        match response.status {
            401 | 403 => SpotifyError::AuthenticationFailed(message),
            404 => SpotifyError::NotFound {
                resource,
                id: id.to_string(),
            },
            status_code => SpotifyError::ApiError {
                status_code,
                message,
            },
        }
    }

    /// Parse a Spotify release date to the first day of its period
    ///
    /// `1981` with precision `year` becomes 1981-01-01, `1981-12` with
    /// precision `month` becomes 1981-12-01. Year `0000` means unknown.
    pub(crate) fn parse_release_date(date: &str, precision: Option<&str>) -> Option<NaiveDate> {
        let parts: Vec<&str> = date.trim().split('-').collect();
        let precision = precision.unwrap_or(match parts.len() {
            1 => "year",
            2 => "month",
            _ => "day",
        });

        let year: i32 = parts.first()?.parse().ok()?;
        if year == 0 {
            return None;
        }

        let component = |index: usize| -> Option<u32> {
            match parts.get(index) {
                Some(part) => part.parse().ok(),
                None => Some(1),
            }
        };

        match precision {
            "year" => NaiveDate::from_ymd_opt(year, 1, 1),
            "month" => NaiveDate::from_ymd_opt(year, component(1)?, 1),
            _ => NaiveDate::from_ymd_opt(year, component(1)?, component(2)?),
        }
    }

    /// Convert a playlist track; `None` for local files, episodes and removed items
    fn convert_track(track: ApiTrack) -> Option<CatalogTrack> {
        if track.is_local || track.item_type.as_deref().is_some_and(|t| t != "track") {
            return None;
        }

        let external_id = track.id?;
        let artist = track.artists.into_iter().next();
        let album = track.album;

        let artist_external_id = artist.as_ref().and_then(|a| a.id.clone()).unwrap_or_default();
        let album_external_id = album.as_ref().and_then(|a| a.id.clone()).unwrap_or_default();

        Some(CatalogTrack {
            external_id,
            name: track.name,
            master_data: !artist_external_id.is_empty() && !album_external_id.is_empty(),
            artist_external_id,
            album_external_id,
            artist_name: artist.map(|a| a.name).unwrap_or_default(),
            album_name: album.map(|a| a.name).unwrap_or_default(),
        })
    }

    fn convert_album(album: ApiAlbum) -> Result<CatalogAlbum> {
        let external_id = album
            .id
            .ok_or_else(|| SpotifyError::ParseError("Album without id".to_string()))?;

        let artist = album
            .artists
            .into_iter()
            .find(|a| a.id.is_some())
            .ok_or_else(|| {
                SpotifyError::ParseError(format!("Album {} has no identified artist", external_id))
            })?;

        let release_date = album
            .release_date
            .as_deref()
            .and_then(|d| Self::parse_release_date(d, album.release_date_precision.as_deref()));

        Ok(CatalogAlbum {
            external_id,
            name: album.name,
            album_type: album.album_type.unwrap_or_default(),
            release_date,
            artist_external_id: artist.id.unwrap_or_default(),
            artist_name: artist.name,
        })
    }
}

#[async_trait]
impl CatalogService for SpotifyConnector {
    fn service_name(&self) -> &str {
        SERVICE_NAME
    }

    #[instrument(skip(self))]
    async fn download_playlist(
        &self,
        external_playlist_id: &str,
    ) -> bridge_traits::error::Result<(CatalogPlaylist, Vec<CatalogTrack>)> {
        info!("Downloading playlist from Spotify");

        let meta_url = self.url(&format!(
            "/playlists/{}?fields=name,description",
            urlencoding::encode(external_playlist_id)
        ));
        let meta: ApiPlaylist = self
            .get_json(&meta_url, "Playlist", external_playlist_id)
            .await?;

        let mut tracks = Vec::new();
        let mut skipped = 0usize;
        let mut next = Some(self.url(&format!(
            "/playlists/{}/tracks?limit={}",
            urlencoding::encode(external_playlist_id),
            PLAYLIST_PAGE_SIZE
        )));
        let mut pages = 0usize;

        while let Some(url) = next.take() {
            if pages >= MAX_PLAYLIST_PAGES {
                warn!(pages, "Playlist page limit reached, truncating track list");
                break;
            }
            pages += 1;

            let page: ApiPaging<ApiPlaylistItem> =
                self.get_json(&url, "Playlist", external_playlist_id).await?;

            for item in page.items {
                match item.track.and_then(Self::convert_track) {
                    Some(track) => tracks.push(track),
                    None => skipped += 1,
                }
            }

            next = page.next;
        }

        info!(
            tracks = tracks.len(),
            skipped,
            pages,
            "Downloaded playlist from Spotify"
        );

        Ok((
            CatalogPlaylist {
                external_id: external_playlist_id.to_string(),
                name: meta.name,
                description: meta.description.unwrap_or_default(),
            },
            tracks,
        ))
    }

    #[instrument(skip(self))]
    async fn fetch_artist(
        &self,
        external_artist_id: &str,
    ) -> bridge_traits::error::Result<CatalogArtist> {
        let url = self.url(&format!(
            "/artists/{}",
            urlencoding::encode(external_artist_id)
        ));
        let artist: ApiArtist = self.get_json(&url, "Artist", external_artist_id).await?;

        Ok(CatalogArtist {
            external_id: artist.id.unwrap_or_else(|| external_artist_id.to_string()),
            name: artist.name,
        })
    }

    #[instrument(skip(self))]
    async fn fetch_album(
        &self,
        external_album_id: &str,
    ) -> bridge_traits::error::Result<CatalogAlbum> {
        let url = self.url(&format!("/albums/{}", urlencoding::encode(external_album_id)));
        let album: ApiAlbum = self.get_json(&url, "Album", external_album_id).await?;

        Ok(Self::convert_album(album)?)
    }

    #[instrument(skip(self))]
    async fn search_album(
        &self,
        artist_name: &str,
        album_name: &str,
    ) -> bridge_traits::error::Result<Option<CatalogAlbum>> {
        let query = format!("album:{} artist:{}", album_name, artist_name);
        let url = self.url(&format!(
            "/search?q={}&type=album&limit={}",
            urlencoding::encode(&query),
            SEARCH_LIMIT
        ));
        let result: ApiAlbumSearch = self.get_json(&url, "Search", &query).await?;

        let mut candidates: Vec<ApiAlbum> = result
            .albums
            .items
            .into_iter()
            .filter(|a| a.id.is_some())
            .collect();

        if candidates.is_empty() {
            debug!("No album matched search");
            return Ok(None);
        }

        let best = candidates
            .iter()
            .position(|a| a.name.eq_ignore_ascii_case(album_name))
            .unwrap_or(0);

        Ok(Some(Self::convert_album(candidates.swap_remove(best))?))
    }
}
