use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use super::{RequestFilter, RequestStore};
use crate::privacy::errors::StoreError;
use crate::privacy::types::{PrivacyRequest, RequestStatus};

/// Store backed by the `privacy_requests` table.
#[derive(Debug, Clone)]
pub struct SqliteRequestStore {
    pool: SqlitePool,
}

impl SqliteRequestStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn parse_timestamp(column: &str, value: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StoreError::Corrupt {
            reason: format!("{column} '{value}': {e}"),
        })
}

fn request_from_row(row: &SqliteRow) -> Result<PrivacyRequest, StoreError> {
    let status_code: i64 = row.try_get("status")?;
    let status = RequestStatus::from_code(status_code).ok_or_else(|| StoreError::Corrupt {
        reason: format!("unknown status {status_code}"),
    })?;

    let request_type: String = row.try_get("request_type")?;
    let request_type = request_type
        .parse()
        .map_err(|reason| StoreError::Corrupt { reason })?;

    let requested_at: String = row.try_get("requested_at")?;
    let created_at: Option<String> = row.try_get("confirm_token_created_at")?;

    Ok(PrivacyRequest {
        id: Some(row.try_get("id")?),
        email: row.try_get("email")?,
        request_type,
        status,
        requested_at: parse_timestamp("requested_at", &requested_at)?,
        confirm_token: row.try_get("confirm_token")?,
        confirm_token_created_at: created_at
            .as_deref()
            .map(|value| parse_timestamp("confirm_token_created_at", value))
            .transpose()?,
    })
}

#[async_trait]
impl RequestStore for SqliteRequestStore {
    async fn load(&self, filter: &RequestFilter) -> Result<Option<PrivacyRequest>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, email, requested_at, status, request_type, confirm_token, confirm_token_created_at
            FROM privacy_requests
            WHERE (?1 IS NULL OR email = ?1)
              AND (?2 IS NULL OR status = ?2)
            ORDER BY id DESC
            LIMIT 1
            "#,
        )
        .bind(filter.email.as_deref())
        .bind(filter.status.map(|s| s.code() as i64))
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(request_from_row).transpose()
    }

    async fn store(&self, request: &PrivacyRequest) -> Result<PrivacyRequest, StoreError> {
        let requested_at = request.requested_at.to_rfc3339();
        let created_at = request.confirm_token_created_at.map(|dt| dt.to_rfc3339());

        match request.id {
            Some(id) => {
                let result = sqlx::query(
                    r#"
                    UPDATE privacy_requests
                    SET email = ?1, requested_at = ?2, status = ?3, request_type = ?4,
                        confirm_token = ?5, confirm_token_created_at = ?6
                    WHERE id = ?7
                    "#,
                )
                .bind(&request.email)
                .bind(&requested_at)
                .bind(request.status.code() as i64)
                .bind(request.request_type.as_str())
                .bind(request.confirm_token.as_deref())
                .bind(created_at.as_deref())
                .bind(id)
                .execute(&self.pool)
                .await?;

                if result.rows_affected() == 0 {
                    return Err(StoreError::NotFound { id });
                }
                Ok(request.clone())
            }
            None => {
                let result = sqlx::query(
                    r#"
                    INSERT INTO privacy_requests
                        (email, requested_at, status, request_type, confirm_token, confirm_token_created_at)
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                    "#,
                )
                .bind(&request.email)
                .bind(&requested_at)
                .bind(request.status.code() as i64)
                .bind(request.request_type.as_str())
                .bind(request.confirm_token.as_deref())
                .bind(created_at.as_deref())
                .execute(&self.pool)
                .await?;

                let mut stored = request.clone();
                stored.id = Some(result.last_insert_rowid());
                Ok(stored)
            }
        }
    }

    async fn list(&self, filter: &RequestFilter) -> Result<Vec<PrivacyRequest>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, email, requested_at, status, request_type, confirm_token, confirm_token_created_at
            FROM privacy_requests
            WHERE (?1 IS NULL OR email = ?1)
              AND (?2 IS NULL OR status = ?2)
            ORDER BY id DESC
            "#,
        )
        .bind(filter.email.as_deref())
        .bind(filter.status.map(|s| s.code() as i64))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(request_from_row).collect()
    }
}
