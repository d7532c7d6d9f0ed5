//! Spotify Web API response types
//!
//! Data structures for deserializing the subset of Spotify Web API v1
//! responses the connector reads. Unknown fields are ignored.

use serde::{Deserialize, Serialize};

/// Artist object (simplified or full, only the shared fields)
///
/// See: https://developer.spotify.com/documentation/web-api/reference/get-an-artist
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiArtist {
    /// Null for local files
    pub id: Option<String>,
    pub name: String,
}

/// Album object (simplified or full, only the shared fields)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiAlbum {
    pub id: Option<String>,
    pub name: String,

    /// `album`, `single` or `compilation`
    #[serde(default)]
    pub album_type: Option<String>,

    /// `YYYY`, `YYYY-MM` or `YYYY-MM-DD` depending on the precision
    #[serde(default)]
    pub release_date: Option<String>,

    /// `year`, `month` or `day`
    #[serde(default)]
    pub release_date_precision: Option<String>,

    #[serde(default)]
    pub artists: Vec<ApiArtist>,
}

/// Track object as embedded in a playlist item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiTrack {
    pub id: Option<String>,
    pub name: String,

    #[serde(default)]
    pub is_local: bool,

    /// `track` or `episode`
    #[serde(rename = "type", default)]
    pub item_type: Option<String>,

    pub album: Option<ApiAlbum>,

    #[serde(default)]
    pub artists: Vec<ApiArtist>,
}

/// Playlist item wrapper; `track` is null for removed or unavailable content
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiPlaylistItem {
    pub track: Option<ApiTrack>,
}

/// Paging object
///
/// See: https://developer.spotify.com/documentation/web-api/reference/get-playlists-tracks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiPaging<T> {
    pub items: Vec<T>,

    /// Absolute URL of the next page
    pub next: Option<String>,

    #[serde(default)]
    pub total: u32,
}

/// Playlist metadata (`fields=name,description`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiPlaylist {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Search response for `type=album`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiAlbumSearch {
    pub albums: ApiPaging<ApiAlbum>,
}

/// Error body returned by the Web API
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorDetail {
    pub status: u16,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_playlist_item_with_null_track() {
        let page: ApiPaging<ApiPlaylistItem> = serde_json::from_str(
            r#"{"items": [{"track": null}], "next": null, "total": 1}"#,
        )
        .unwrap();

        assert!(page.items[0].track.is_none());
        assert!(page.next.is_none());
    }

    #[test]
    fn test_local_track_has_null_ids() {
        let track: ApiTrack = serde_json::from_str(
            r#"{
                "id": null,
                "name": "Demo",
                "is_local": true,
                "type": "track",
                "album": {"id": null, "name": "", "album_type": null, "artists": []},
                "artists": [{"id": null, "name": "Me"}]
            }"#,
        )
        .unwrap();

        assert!(track.is_local);
        assert!(track.id.is_none());
        assert!(track.artists[0].id.is_none());
    }

    #[test]
    fn test_error_body() {
        let body: ApiErrorBody =
            serde_json::from_str(r#"{"error": {"status": 401, "message": "The access token expired"}}"#)
                .unwrap();
        assert_eq!(body.error.status, 401);
    }
}
