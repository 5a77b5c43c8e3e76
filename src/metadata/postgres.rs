use super::backend::MetadataStore;
use crate::models::{NewScreenshot, ScreenshotRecord};
use async_trait::async_trait;
use sqlx::PgPool;

const COLUMNS: &str =
    "ID, HASH, FILE_NAME, FILE_TYPE, DATE_AND_TIME, WIDTH, HEIGHT, SIZE, TITLE";

/// Screenshot rows in a single PostgreSQL table.
/// The table name comes from validated configuration and is the only
/// interpolated part of any statement.
pub struct PgMetadataStore {
    db: PgPool,
    table: String,
}

impl PgMetadataStore {
    pub fn new(db: PgPool, table: impl Into<String>) -> Self {
        PgMetadataStore {
            db,
            table: table.into(),
        }
    }

    fn create_table_sql(&self) -> String {
        format!(
            r#"
            CREATE TABLE IF NOT EXISTS {table} (
                ID BIGSERIAL PRIMARY KEY,
                HASH VARCHAR(40) NOT NULL UNIQUE,
                FILE_NAME VARCHAR(255) NOT NULL,
                FILE_TYPE VARCHAR(255) NOT NULL,
                DATE_AND_TIME TIMESTAMPTZ NOT NULL,
                WIDTH INTEGER NOT NULL,
                HEIGHT INTEGER NOT NULL,
                SIZE VARCHAR(255) NOT NULL,
                TITLE TEXT NOT NULL DEFAULT ''
            )
            "#,
            table = self.table
        )
    }

    fn create_index_sql(&self) -> String {
        format!(
            "CREATE INDEX IF NOT EXISTS {table}_date_and_time_idx ON {table} (DATE_AND_TIME DESC)",
            table = self.table
        )
    }
}

#[async_trait]
impl MetadataStore for PgMetadataStore {
    async fn ensure_schema(&self) -> Result<(), sqlx::Error> {
        sqlx::query(&self.create_table_sql())
            .execute(&self.db)
            .await?;
        sqlx::query(&self.create_index_sql())
            .execute(&self.db)
            .await?;
        Ok(())
    }

    async fn insert(&self, screenshot: NewScreenshot) -> Result<ScreenshotRecord, sqlx::Error> {
        let sql = format!(
            r#"
            INSERT INTO {} (HASH, FILE_NAME, FILE_TYPE, DATE_AND_TIME, WIDTH, HEIGHT, SIZE, TITLE)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING ID
            "#,
            self.table
        );

        let id: i64 = sqlx::query_scalar(&sql)
            .bind(&screenshot.hash)
            .bind(&screenshot.file_name)
            .bind(&screenshot.file_type)
            .bind(screenshot.uploaded_at)
            .bind(screenshot.width)
            .bind(screenshot.height)
            .bind(&screenshot.size_label)
            .bind(&screenshot.title)
            .fetch_one(&self.db)
            .await?;

        Ok(screenshot.into_record(id))
    }

    async fn find_by_hash(&self, hash: &str) -> Result<Option<ScreenshotRecord>, sqlx::Error> {
        let sql = format!("SELECT {} FROM {} WHERE HASH = $1", COLUMNS, self.table);

        sqlx::query_as::<_, ScreenshotRecord>(&sql)
            .bind(hash)
            .fetch_optional(&self.db)
            .await
    }

    async fn list_recent(&self) -> Result<Vec<ScreenshotRecord>, sqlx::Error> {
        let sql = format!(
            "SELECT {} FROM {} ORDER BY DATE_AND_TIME DESC, ID DESC",
            COLUMNS, self.table
        );

        sqlx::query_as::<_, ScreenshotRecord>(&sql)
            .fetch_all(&self.db)
            .await
    }

    async fn update_title(&self, hash: &str, title: &str) -> Result<bool, sqlx::Error> {
        let sql = format!("UPDATE {} SET TITLE = $1 WHERE HASH = $2", self.table);

        let result = sqlx::query(&sql)
            .bind(title)
            .bind(hash)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, hash: &str) -> Result<bool, sqlx::Error> {
        let sql = format!("DELETE FROM {} WHERE HASH = $1", self.table);

        let result = sqlx::query(&sql).bind(hash).execute(&self.db).await?;

        Ok(result.rows_affected() > 0)
    }
}
