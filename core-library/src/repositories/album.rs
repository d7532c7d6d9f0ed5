//! Albums keyed by master catalog id

use crate::error::Result;
use crate::models::Album;
use crate::repositories::{check_valid, expect_row};
use async_trait::async_trait;
use sqlx::{query, query_as, query_scalar, SqlitePool};

/// Albums, one row per master catalog album, each owned by an artist
#[async_trait]
pub trait AlbumRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> Result<Option<Album>>;

    async fn find_by_external_id(&self, external_id: &str) -> Result<Option<Album>>;

    /// Fails on a duplicate `external_id` or an unknown `artist_id`
    async fn insert(&self, album: &Album) -> Result<()>;

    async fn update(&self, album: &Album) -> Result<()>;

    async fn count(&self) -> Result<i64>;
}

pub struct SqliteAlbumRepository {
    pool: SqlitePool,
}

impl SqliteAlbumRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AlbumRepository for SqliteAlbumRepository {
    async fn find_by_id(&self, id: &str) -> Result<Option<Album>> {
        query_as::<_, Album>("SELECT * FROM albums WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Into::into)
    }

    async fn find_by_external_id(&self, external_id: &str) -> Result<Option<Album>> {
        query_as::<_, Album>("SELECT * FROM albums WHERE external_id = ?")
            .bind(external_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Into::into)
    }

    async fn insert(&self, album: &Album) -> Result<()> {
        check_valid("Album", album.validate())?;

        query(
            r#"
            INSERT INTO albums (
                id, external_id, artist_id, name, album_type, release_date,
                created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&album.id)
        .bind(&album.external_id)
        .bind(&album.artist_id)
        .bind(&album.name)
        .bind(&album.album_type)
        .bind(album.release_date)
        .bind(album.created_at)
        .bind(album.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update(&self, album: &Album) -> Result<()> {
        check_valid("Album", album.validate())?;

        let result = query(
            r#"
            UPDATE albums
            SET external_id = ?, artist_id = ?, name = ?, album_type = ?,
                release_date = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&album.external_id)
        .bind(&album.artist_id)
        .bind(&album.name)
        .bind(&album.album_type)
        .bind(album.release_date)
        .bind(album.updated_at)
        .bind(&album.id)
        .execute(&self.pool)
        .await?;

        expect_row(result, "Album", &album.id)
    }

    async fn count(&self) -> Result<i64> {
        let count: i64 = query_scalar("SELECT COUNT(*) FROM albums")
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
    use crate::models::{AlbumType, Artist};
    use crate::repositories::{ArtistRepository, SqliteArtistRepository};
    use chrono::NaiveDate;

    async fn setup() -> (SqliteAlbumRepository, Artist) {
        let pool = create_test_pool().await.unwrap();
        let artist = Artist::new("artist-ext".to_string(), "Artist".to_string());
        SqliteArtistRepository::new(pool.clone())
            .insert(&artist)
            .await
            .unwrap();
        (SqliteAlbumRepository::new(pool), artist)
    }

    fn album(external_id: &str, artist_id: &str) -> Album {
        Album::new(
            external_id.to_string(),
            artist_id.to_string(),
            "Everything All the Time".to_string(),
            "album".to_string(),
            NaiveDate::from_ymd_opt(2006, 3, 21),
        )
    }

    #[tokio::test]
    async fn test_insert_and_find_album() {
        let (repo, artist) = setup().await;

        let album = album("album-ext", &artist.id);
        repo.insert(&album).await.unwrap();

        let found = repo.find_by_id(&album.id).await.unwrap().unwrap();
        assert_eq!(found, album);
        assert_eq!(found.kind(), AlbumType::Album);

        let found = repo.find_by_external_id("album-ext").await.unwrap().unwrap();
        assert_eq!(found.id, album.id);
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_insert_requires_existing_artist() {
        let (repo, _artist) = setup().await;

        let result = repo.insert(&album("album-ext", "no-such-artist")).await;
        assert!(matches!(result, Err(LibraryError::Database(_))));
        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_update_album() {
        let (repo, artist) = setup().await;

        let mut album = album("album-ext", &artist.id);
        repo.insert(&album).await.unwrap();

        album.album_type = "single".to_string();
        album.release_date = None;
        repo.update(&album).await.unwrap();

        let found = repo.find_by_id(&album.id).await.unwrap().unwrap();
        assert_eq!(found.kind(), AlbumType::Single);
        assert!(found.release_date.is_none());
    }

    #[tokio::test]
    async fn test_update_missing_album() {
        let (repo, artist) = setup().await;

        let result = repo.update(&album("album-ext", &artist.id)).await;
        assert!(matches!(result, Err(LibraryError::NotFound { .. })));
    }
}
