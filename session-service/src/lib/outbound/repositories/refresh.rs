use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::FromRow;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::errors::AuthError;
use crate::domain::identity::models::IdentityId;
use crate::domain::refresh::models::RefreshRecord;
use crate::domain::refresh::ports::RefreshRepository;

#[derive(FromRow)]
struct RefreshRow {
    id: Uuid,
    identity_id: Uuid,
    secret_hash: String,
    live: bool,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl From<RefreshRow> for RefreshRecord {
    fn from(row: RefreshRow) -> Self {
        RefreshRecord {
            id: row.id,
            identity_id: IdentityId(row.identity_id),
            secret_hash: row.secret_hash,
            live: row.live,
            created_at: row.created_at,
            expires_at: row.expires_at,
        }
    }
}

fn database_error(e: sqlx::Error) -> AuthError {
    AuthError::DatabaseError(e.to_string())
}

pub struct PostgresRefreshRepository {
    pool: PgPool,
}

impl PostgresRefreshRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RefreshRepository for PostgresRefreshRepository {
    async fn hash_exists(&self, secret_hash: &str) -> Result<bool, AuthError> {
        sqlx::query_scalar(
            r#"
            SELECT EXISTS (SELECT 1 FROM refresh_records WHERE secret_hash = $1)
            "#,
        )
        .bind(secret_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(database_error)
    }

    async fn replace_live(&self, record: RefreshRecord) -> Result<(), AuthError> {
        let mut tx = self.pool.begin().await.map_err(database_error)?;

        // Serialises rotations of one identity until commit.
        sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
            .bind(record.identity_id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(database_error)?;

        sqlx::query(
            r#"
            UPDATE refresh_records
            SET live = FALSE
            WHERE identity_id = $1 AND live
            "#,
        )
        .bind(record.identity_id.0)
        .execute(&mut *tx)
        .await
        .map_err(database_error)?;

        sqlx::query(
            r#"
            INSERT INTO refresh_records (id, identity_id, secret_hash, live, created_at, expires_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(record.id)
        .bind(record.identity_id.0)
        .bind(&record.secret_hash)
        .bind(record.live)
        .bind(record.created_at)
        .bind(record.expires_at)
        .execute(&mut *tx)
        .await
        .map_err(database_error)?;

        tx.commit().await.map_err(database_error)
    }

    async fn find_live(&self, identity_id: &IdentityId) -> Result<Option<RefreshRecord>, AuthError> {
        let row = sqlx::query_as::<_, RefreshRow>(
            r#"
            SELECT id, identity_id, secret_hash, live, created_at, expires_at
            FROM refresh_records
            WHERE identity_id = $1 AND live
            "#,
        )
        .bind(identity_id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error)?;

        Ok(row.map(RefreshRecord::from))
    }

    async fn retire(&self, record_id: &Uuid) -> Result<bool, AuthError> {
        let result = sqlx::query(
            r#"
            UPDATE refresh_records
            SET live = FALSE
            WHERE id = $1 AND live
            "#,
        )
        .bind(record_id)
        .execute(&self.pool)
        .await
        .map_err(database_error)?;

        Ok(result.rows_affected() == 1)
    }

    async fn retire_for_identity(&self, identity_id: &IdentityId) -> Result<u64, AuthError> {
        let result = sqlx::query(
            r#"
            UPDATE refresh_records
            SET live = FALSE
            WHERE identity_id = $1 AND live
            "#,
        )
        .bind(identity_id.0)
        .execute(&self.pool)
        .await
        .map_err(database_error)?;

        Ok(result.rows_affected())
    }

    async fn retire_expired(&self, now: DateTime<Utc>) -> Result<u64, AuthError> {
        let result = sqlx::query(
            r#"
            UPDATE refresh_records
            SET live = FALSE
            WHERE live AND expires_at < $1
            "#,
        )
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(database_error)?;

        Ok(result.rows_affected())
    }
}
