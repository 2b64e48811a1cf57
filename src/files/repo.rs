use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// File row. Every statement below binds the owner's id; a record is never
/// visible to, or mutable by, anyone but its owner.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub filename: String,
    pub filepath: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl FileRecord {
    pub async fn insert(
        db: &PgPool,
        user_id: Uuid,
        filename: &str,
        filepath: &str,
    ) -> anyhow::Result<FileRecord> {
        let record = sqlx::query_as::<_, FileRecord>(
            r#"
            INSERT INTO files (user_id, filename, filepath)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, filename, filepath, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(filename)
        .bind(filepath)
        .fetch_one(db)
        .await?;
        Ok(record)
    }

    pub async fn list_by_owner(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<FileRecord>> {
        let rows = sqlx::query_as::<_, FileRecord>(
            r#"
            SELECT id, user_id, filename, filepath, created_at, updated_at
            FROM files
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    /// Ownership and existence checked together: a foreign file id answers
    /// the same as a nonexistent one.
    pub async fn find_owned(
        db: &PgPool,
        user_id: Uuid,
        file_id: Uuid,
    ) -> anyhow::Result<Option<FileRecord>> {
        let record = sqlx::query_as::<_, FileRecord>(
            r#"
            SELECT id, user_id, filename, filepath, created_at, updated_at
            FROM files
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(file_id)
        .bind(user_id)
        .fetch_optional(db)
        .await?;
        Ok(record)
    }

    /// Substring match on the filename. The term is interpolated into the
    /// LIKE pattern without escaping, so `%` and `_` act as wildcards.
    pub async fn search_by_filename(
        db: &PgPool,
        user_id: Uuid,
        query: &str,
    ) -> anyhow::Result<Vec<FileRecord>> {
        let rows = sqlx::query_as::<_, FileRecord>(
            r#"
            SELECT id, user_id, filename, filepath, created_at, updated_at
            FROM files
            WHERE user_id = $1 AND filename LIKE $2
            "#,
        )
        .bind(user_id)
        .bind(like_pattern(query))
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn update_content(
        db: &PgPool,
        user_id: Uuid,
        file_id: Uuid,
        filename: &str,
        filepath: &str,
    ) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE files
            SET filename = $3, filepath = $4, updated_at = now()
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(file_id)
        .bind(user_id)
        .bind(filename)
        .bind(filepath)
        .execute(db)
        .await?;
        Ok(())
    }

    pub async fn delete(db: &PgPool, user_id: Uuid, file_id: Uuid) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            DELETE FROM files
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(file_id)
        .bind(user_id)
        .execute(db)
        .await?;
        Ok(())
    }
}

pub(crate) fn like_pattern(query: &str) -> String {
    format!("%{query}%")
}
