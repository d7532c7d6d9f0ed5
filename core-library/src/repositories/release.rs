//! New-release observations per playlist

use crate::error::Result;
use crate::models::Release;
use crate::repositories::check_valid;
use crate::repositories::{Page, PageRequest};
use async_trait::async_trait;
use sqlx::{query, query_as, query_scalar, SqlitePool};

/// New-release observations
///
/// Releases are append-only: a row records the first time a newly released
/// album was observed in a playlist.
#[async_trait]
pub trait ReleaseRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> Result<Option<Release>>;

    async fn insert(&self, release: &Release) -> Result<()>;

    /// Releases of a playlist, most recent first
    async fn query_by_playlist(
        &self,
        playlist_id: &str,
        page_request: PageRequest,
    ) -> Result<Page<Release>>;

    async fn count_by_playlist(&self, playlist_id: &str) -> Result<i64>;
}

pub struct SqliteReleaseRepository {
    pool: SqlitePool,
}

impl SqliteReleaseRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReleaseRepository for SqliteReleaseRepository {
    async fn find_by_id(&self, id: &str) -> Result<Option<Release>> {
        query_as::<_, Release>("SELECT * FROM releases WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Into::into)
    }

    async fn insert(&self, release: &Release) -> Result<()> {
        check_valid("Release", release.validate())?;

        query(
            r#"
            INSERT INTO releases (id, album_id, playlist_id, sync_date)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&release.id)
        .bind(&release.album_id)
        .bind(&release.playlist_id)
        .bind(release.sync_date)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn query_by_playlist(
        &self,
        playlist_id: &str,
        page_request: PageRequest,
    ) -> Result<Page<Release>> {
        let total = self.count_by_playlist(playlist_id).await?;

        let releases = query_as::<_, Release>(
            r#"
            SELECT * FROM releases
            WHERE playlist_id = ?
            ORDER BY sync_date DESC, id ASC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(playlist_id)
        .bind(page_request.limit())
        .bind(page_request.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(Page::new(releases, total as u64, page_request))
    }

    async fn count_by_playlist(&self, playlist_id: &str) -> Result<i64> {
        let count: i64 = query_scalar("SELECT COUNT(*) FROM releases WHERE playlist_id = ?")
            .bind(playlist_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
