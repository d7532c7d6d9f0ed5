//! Per-playlist track records and the dedup lookup

use crate::error::Result;
use crate::models::Track;
use crate::repositories::check_valid;
use crate::repositories::{Page, PageRequest};
use async_trait::async_trait;
use sqlx::{query, query_as, query_scalar, SqlitePool};

/// Tracks recorded per playlist
///
/// Tracks are write-once; there is no `update`. A track already recorded for
/// a playlist is left untouched by later runs.
#[async_trait]
pub trait TrackRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> Result<Option<Track>>;

    /// Find a track by the dedup key `(playlist_id, external_id)`
    ///
    /// `Ok(None)` is the expected answer for a track seen for the first time.
    async fn find_by_playlist_and_external_id(
        &self,
        playlist_id: &str,
        external_id: &str,
    ) -> Result<Option<Track>>;

    /// Fails on a duplicate `(playlist_id, external_id)` or a dangling reference
    async fn insert(&self, track: &Track) -> Result<()>;

    /// Tracks of a playlist in insertion order
    async fn query_by_playlist(
        &self,
        playlist_id: &str,
        page_request: PageRequest,
    ) -> Result<Page<Track>>;

    async fn count_by_playlist(&self, playlist_id: &str) -> Result<i64>;
}

pub struct SqliteTrackRepository {
    pool: SqlitePool,
}

impl SqliteTrackRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TrackRepository for SqliteTrackRepository {
    async fn find_by_id(&self, id: &str) -> Result<Option<Track>> {
        query_as::<_, Track>("SELECT * FROM tracks WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Into::into)
    }

    async fn find_by_playlist_and_external_id(
        &self,
        playlist_id: &str,
        external_id: &str,
    ) -> Result<Option<Track>> {
        query_as::<_, Track>(
            "SELECT * FROM tracks WHERE playlist_id = ? AND external_id = ?",
        )
        .bind(playlist_id)
        .bind(external_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Into::into)
    }

    async fn insert(&self, track: &Track) -> Result<()> {
        check_valid("Track", track.validate())?;

        query(
            r#"
            INSERT INTO tracks (
                id, playlist_id, external_id, name, artist_id, album_id, created_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&track.id)
        .bind(&track.playlist_id)
        .bind(&track.external_id)
        .bind(&track.name)
        .bind(&track.artist_id)
        .bind(&track.album_id)
        .bind(track.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn query_by_playlist(
        &self,
        playlist_id: &str,
        page_request: PageRequest,
    ) -> Result<Page<Track>> {
        let total = self.count_by_playlist(playlist_id).await?;

        let tracks = query_as::<_, Track>(
            r#"
            SELECT * FROM tracks
            WHERE playlist_id = ?
            ORDER BY created_at ASC, rowid ASC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(playlist_id)
        .bind(page_request.limit())
        .bind(page_request.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(Page::new(tracks, total as u64, page_request))
    }

    async fn count_by_playlist(&self, playlist_id: &str) -> Result<i64> {
        let count: i64 = query_scalar("SELECT COUNT(*) FROM tracks WHERE playlist_id = ?")
            .bind(playlist_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LibraryError;
    use crate::db::create_test_pool;
    use crate::models::{Album, Artist, Playlist};
    use crate::repositories::fixtures;

    async fn setup() -> (SqliteTrackRepository, Playlist, Artist, Album) {
        let pool = create_test_pool().await.unwrap();
        let (playlist, artist, album) = fixtures::seed(&pool).await;
        (SqliteTrackRepository::new(pool), playlist, artist, album)
    }

    fn track(playlist: &Playlist, artist: &Artist, album: &Album, external_id: &str) -> Track {
        Track::new(
            playlist.id.clone(),
            external_id.to_string(),
            format!("Song {}", external_id),
            artist.id.clone(),
            album.id.clone(),
        )
    }

    #[tokio::test]
    async fn test_insert_and_find_track() {
        let (repo, playlist, artist, album) = setup().await;

        let track = track(&playlist, &artist, &album, "4uLU6hMCjMI75M1A2tKUQC");
        repo.insert(&track).await.unwrap();

        let found = repo.find_by_id(&track.id).await.unwrap().unwrap();
        assert_eq!(found, track);

        let found = repo
            .find_by_playlist_and_external_id(&playlist.id, "4uLU6hMCjMI75M1A2tKUQC")
            .await
            .unwrap();
        assert_eq!(found.map(|t| t.id), Some(track.id.clone()));
    }

    #[tokio::test]
    async fn test_dedup_lookup_misses_for_new_track() {
        let (repo, playlist, _artist, _album) = setup().await;

        let found = repo
            .find_by_playlist_and_external_id(&playlist.id, "never-seen")
            .await
            .unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_track_rejected_not_overwritten() {
        let (repo, playlist, artist, album) = setup().await;

        let first = track(&playlist, &artist, &album, "dup");
        repo.insert(&first).await.unwrap();

        let mut second = track(&playlist, &artist, &album, "dup");
        second.name = "Other title".to_string();
        let err = repo.insert(&second).await.unwrap_err();

        assert!(err.is_unique_violation());
        assert_eq!(repo.count_by_playlist(&playlist.id).await.unwrap(), 1);
        let stored = repo.find_by_id(&first.id).await.unwrap().unwrap();
        assert_eq!(stored.name, first.name);
    }

    #[tokio::test]
    async fn test_query_by_playlist_with_pagination() {
        let (repo, playlist, artist, album) = setup().await;

        for i in 0..5 {
            repo.insert(&track(&playlist, &artist, &album, &format!("t{}", i)))
                .await
                .unwrap();
        }

        let page = repo
            .query_by_playlist(&playlist.id, PageRequest::new(1, 3))
            .await
            .unwrap();
        assert_eq!(page.total, 5);
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[0].external_id, "t3");
    }

    #[tokio::test]
    async fn test_track_validation() {
        let (repo, playlist, artist, album) = setup().await;

        let mut invalid = track(&playlist, &artist, &album, "t1");
        invalid.artist_id = String::new();
        let result = repo.insert(&invalid).await;
        assert!(matches!(result, Err(LibraryError::InvalidInput { .. })));
    }
}
