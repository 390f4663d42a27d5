use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::FromRow;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::errors::AuthError;
use crate::domain::identity::models::Identity;
use crate::domain::identity::models::IdentityId;
use crate::domain::identity::models::Login;
use crate::domain::identity::ports::IdentityRepository;

#[derive(FromRow)]
struct IdentityRow {
    id: Uuid,
    login: String,
    password_hash: String,
    elevated: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<IdentityRow> for Identity {
    type Error = AuthError;

    fn try_from(row: IdentityRow) -> Result<Self, Self::Error> {
        Ok(Identity {
            id: IdentityId(row.id),
            login: Login::new(row.login)?,
            password_hash: row.password_hash,
            elevated: row.elevated,
            created_at: row.created_at,
        })
    }
}

pub struct PostgresIdentityRepository {
    pool: PgPool,
}

impl PostgresIdentityRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IdentityRepository for PostgresIdentityRepository {
    async fn create(&self, identity: Identity) -> Result<Identity, AuthError> {
        sqlx::query(
            r#"
            INSERT INTO identities (id, login, password_hash, elevated, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(identity.id.0)
        .bind(identity.login.as_str())
        .bind(&identity.password_hash)
        .bind(identity.elevated)
        .bind(identity.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation()
                    && db_err.constraint() == Some("identities_login_key")
                {
                    return AuthError::LoginTaken(identity.login.to_string());
                }
            }
            AuthError::DatabaseError(e.to_string())
        })?;

        Ok(identity)
    }

    async fn find_by_login(&self, login: &str) -> Result<Option<Identity>, AuthError> {
        let row = sqlx::query_as::<_, IdentityRow>(
            r#"
            SELECT id, login, password_hash, elevated, created_at
            FROM identities
            WHERE login = $1
            "#,
        )
        .bind(login)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AuthError::DatabaseError(e.to_string()))?;

        row.map(Identity::try_from).transpose()
    }

    async fn set_elevated(&self, login: &Login) -> Result<Option<IdentityId>, AuthError> {
        let id: Option<Uuid> = sqlx::query_scalar(
            r#"
            UPDATE identities
            SET elevated = TRUE
            WHERE login = $1
            RETURNING id
            "#,
        )
        .bind(login.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AuthError::DatabaseError(e.to_string()))?;

        Ok(id.map(IdentityId))
    }
}
