use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::FromRow;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::errors::AuthError;
use crate::domain::identity::models::IdentityId;
use crate::domain::session::models::Session;
use crate::domain::session::ports::SessionRepository;

#[derive(FromRow)]
struct SessionRow {
    identity_id: Uuid,
    active: bool,
    updated_at: DateTime<Utc>,
}

impl From<SessionRow> for Session {
    fn from(row: SessionRow) -> Self {
        Session {
            identity_id: IdentityId(row.identity_id),
            active: row.active,
            updated_at: row.updated_at,
        }
    }
}

pub struct PostgresSessionRepository {
    pool: PgPool,
}

impl PostgresSessionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionRepository for PostgresSessionRepository {
    async fn activate(&self, identity_id: &IdentityId) -> Result<(), AuthError> {
        sqlx::query(
            r#"
            INSERT INTO sessions (identity_id, active, updated_at)
            VALUES ($1, TRUE, NOW())
            ON CONFLICT (identity_id)
            DO UPDATE SET active = TRUE, updated_at = NOW()
            "#,
        )
        .bind(identity_id.0)
        .execute(&self.pool)
        .await
        .map_err(|e| AuthError::DatabaseError(e.to_string()))?;

        Ok(())
    }

    async fn find(&self, identity_id: &IdentityId) -> Result<Option<Session>, AuthError> {
        let row = sqlx::query_as::<_, SessionRow>(
            r#"
            SELECT identity_id, active, updated_at
            FROM sessions
            WHERE identity_id = $1
            "#,
        )
        .bind(identity_id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AuthError::DatabaseError(e.to_string()))?;

        Ok(row.map(Session::from))
    }

    async fn deactivate(&self, identity_id: &IdentityId) -> Result<(), AuthError> {
        sqlx::query(
            r#"
            UPDATE sessions
            SET active = FALSE, updated_at = NOW()
            WHERE identity_id = $1
            "#,
        )
        .bind(identity_id.0)
        .execute(&self.pool)
        .await
        .map_err(|e| AuthError::DatabaseError(e.to_string()))?;

        Ok(())
    }
}
