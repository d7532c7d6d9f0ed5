//! Tracked playlists

use crate::error::Result;
use crate::models::Playlist;
use crate::repositories::{check_valid, expect_row};
use crate::repositories::{Page, PageRequest};
use async_trait::async_trait;
use sqlx::{query, query_as, query_scalar, SqlitePool};

/// Playlists tracked for reconciliation
///
/// A playlist is identified remotely by `(service, external_id)`, which is
/// unique across the table.
#[async_trait]
pub trait PlaylistRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> Result<Option<Playlist>>;

    async fn find_by_external_id(&self, service: &str, external_id: &str)
        -> Result<Option<Playlist>>;

    async fn insert(&self, playlist: &Playlist) -> Result<()>;

    /// Persist name, description and the change stamps of a finished run
    ///
    /// # Errors
    ///
    /// `LibraryError::NotFound` if the playlist was deleted meanwhile.
    async fn update(&self, playlist: &Playlist) -> Result<()>;

    /// Playlists ordered by name
    async fn list(&self, page_request: PageRequest) -> Result<Page<Playlist>>;

    async fn count(&self) -> Result<i64>;
}

pub struct SqlitePlaylistRepository {
    pool: SqlitePool,
}

impl SqlitePlaylistRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PlaylistRepository for SqlitePlaylistRepository {
    async fn find_by_id(&self, id: &str) -> Result<Option<Playlist>> {
        query_as::<_, Playlist>("SELECT * FROM playlists WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Into::into)
    }

    async fn find_by_external_id(
        &self,
        service: &str,
        external_id: &str,
    ) -> Result<Option<Playlist>> {
        query_as::<_, Playlist>(
            "SELECT * FROM playlists WHERE service = ? AND external_id = ?",
        )
        .bind(service)
        .bind(external_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Into::into)
    }

    async fn insert(&self, playlist: &Playlist) -> Result<()> {
        check_valid("Playlist", playlist.validate())?;

        query(
            r#"
            INSERT INTO playlists (
                id, external_id, service, name, description, last_changed,
                created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&playlist.id)
        .bind(&playlist.external_id)
        .bind(&playlist.service)
        .bind(&playlist.name)
        .bind(&playlist.description)
        .bind(playlist.last_changed)
        .bind(playlist.created_at)
        .bind(playlist.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update(&self, playlist: &Playlist) -> Result<()> {
        check_valid("Playlist", playlist.validate())?;

        let result = query(
            r#"
            UPDATE playlists
            SET external_id = ?, service = ?, name = ?, description = ?,
                last_changed = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&playlist.external_id)
        .bind(&playlist.service)
        .bind(&playlist.name)
        .bind(&playlist.description)
        .bind(playlist.last_changed)
        .bind(playlist.updated_at)
        .bind(&playlist.id)
        .execute(&self.pool)
        .await?;

        expect_row(result, "Playlist", &playlist.id)
    }

    async fn list(&self, page_request: PageRequest) -> Result<Page<Playlist>> {
        let total = self.count().await?;

        let playlists = query_as::<_, Playlist>(
            "SELECT * FROM playlists ORDER BY name ASC, id ASC LIMIT ? OFFSET ?",
        )
        .bind(page_request.limit())
        .bind(page_request.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(Page::new(playlists, total as u64, page_request))
    }

    async fn count(&self) -> Result<i64> {
        let count: i64 = query_scalar("SELECT COUNT(*) FROM playlists")
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

    async fn setup_test_pool() -> SqlitePool {
        create_test_pool().await.unwrap()
    }

    fn playlist(external_id: &str, name: &str) -> Playlist {
        Playlist::new(
            external_id.to_string(),
            "spotify".to_string(),
            name.to_string(),
        )
    }

    #[tokio::test]
    async fn test_insert_and_find_playlist() {
        let pool = setup_test_pool().await;
        let repo = SqlitePlaylistRepository::new(pool);

        let playlist = playlist("37i9dQZF1DX4JAvHpjipBk", "New Music Friday");
        repo.insert(&playlist).await.unwrap();

        let found = repo.find_by_id(&playlist.id).await.unwrap().unwrap();
        assert_eq!(found, playlist);

        let found = repo
            .find_by_external_id("spotify", "37i9dQZF1DX4JAvHpjipBk")
            .await
            .unwrap();
        assert_eq!(found.map(|p| p.id), Some(playlist.id.clone()));

        let other_service = repo
            .find_by_external_id("deezer", "37i9dQZF1DX4JAvHpjipBk")
            .await
            .unwrap();
        assert!(other_service.is_none());
    }

    #[tokio::test]
    async fn test_update_playlist() {
        let pool = setup_test_pool().await;
        let repo = SqlitePlaylistRepository::new(pool);

        let mut playlist = playlist("ext", "");
        repo.insert(&playlist).await.unwrap();

        playlist.name = "Release Radar".to_string();
        playlist.description = "Catch all the latest music".to_string();
        playlist.last_changed = Some(1_717_200_000);
        repo.update(&playlist).await.unwrap();

        let found = repo.find_by_id(&playlist.id).await.unwrap().unwrap();
        assert_eq!(found.name, "Release Radar");
        assert_eq!(found.description, "Catch all the latest music");
        assert_eq!(found.last_changed, Some(1_717_200_000));
    }

    #[tokio::test]
    async fn test_update_missing_playlist() {
        let pool = setup_test_pool().await;
        let repo = SqlitePlaylistRepository::new(pool);

        let result = repo.update(&playlist("ext", "Ghost")).await;
        assert!(matches!(result, Err(LibraryError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_duplicate_catalog_playlist_rejected() {
        let pool = setup_test_pool().await;
        let repo = SqlitePlaylistRepository::new(pool);

        repo.insert(&playlist("ext", "A")).await.unwrap();
        let err = repo.insert(&playlist("ext", "B")).await.unwrap_err();
        assert!(err.is_unique_violation());
    }

    #[tokio::test]
    async fn test_list_with_pagination() {
        let pool = setup_test_pool().await;
        let repo = SqlitePlaylistRepository::new(pool);

        for i in 1..=5 {
            repo.insert(&playlist(&format!("ext-{}", i), &format!("Playlist {}", i)))
                .await
                .unwrap();
        }

        let page = repo.list(PageRequest::new(1, 3)).await.unwrap();
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.total, 5);
        assert_eq!(page.total_pages(), 2);
        assert_eq!(page.items[0].name, "Playlist 4");
    }
}
