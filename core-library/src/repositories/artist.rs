//! Artists keyed by master catalog id

use crate::error::Result;
use crate::models::Artist;
use crate::repositories::{check_valid, expect_row};
use async_trait::async_trait;
use sqlx::{query, query_as, query_scalar, SqlitePool};

/// Artists, one row per master catalog artist
#[async_trait]
pub trait ArtistRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> Result<Option<Artist>>;

    /// Lookup used by identity resolution before asking the catalog
    async fn find_by_external_id(&self, external_id: &str) -> Result<Option<Artist>>;

    /// Store a new artist
    ///
    /// A second artist with the same `external_id` is a unique violation;
    /// callers racing on the same artist re-read instead of failing.
    async fn insert(&self, artist: &Artist) -> Result<()>;

    /// Overwrite name and `updated_at`; `NotFound` if the id is unknown
    async fn update(&self, artist: &Artist) -> Result<()>;

    async fn count(&self) -> Result<i64>;
}

pub struct SqliteArtistRepository {
    pool: SqlitePool,
}

impl SqliteArtistRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ArtistRepository for SqliteArtistRepository {
    async fn find_by_id(&self, id: &str) -> Result<Option<Artist>> {
        query_as::<_, Artist>("SELECT * FROM artists WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Into::into)
    }

    async fn find_by_external_id(&self, external_id: &str) -> Result<Option<Artist>> {
        query_as::<_, Artist>("SELECT * FROM artists WHERE external_id = ?")
            .bind(external_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Into::into)
    }

    async fn insert(&self, artist: &Artist) -> Result<()> {
        check_valid("Artist", artist.validate())?;

        query(
            r#"
            INSERT INTO artists (id, external_id, name, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&artist.id)
        .bind(&artist.external_id)
        .bind(&artist.name)
        .bind(artist.created_at)
        .bind(artist.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update(&self, artist: &Artist) -> Result<()> {
        check_valid("Artist", artist.validate())?;

        let result = query(
            r#"
            UPDATE artists
            SET external_id = ?, name = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&artist.external_id)
        .bind(&artist.name)
        .bind(artist.updated_at)
        .bind(&artist.id)
        .execute(&self.pool)
        .await?;

        expect_row(result, "Artist", &artist.id)
    }

    async fn count(&self) -> Result<i64> {
        let count: i64 = query_scalar("SELECT COUNT(*) FROM artists")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
