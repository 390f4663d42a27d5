//! In-memory store adapters.
//!
//! Each adapter serialises writers behind a single `RwLock`, which gives the same atomicity the
//! PostgreSQL adapters get from transactions and conditional updates. State is lost on restart.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::errors::AuthError;
use crate::domain::identity::models::Identity;
use crate::domain::identity::models::IdentityId;
use crate::domain::identity::models::Login;
use crate::domain::identity::ports::IdentityRepository;
use crate::domain::refresh::models::RefreshRecord;
use crate::domain::refresh::ports::RefreshRepository;
use crate::domain::session::models::Session;
use crate::domain::session::ports::SessionRepository;

#[derive(Default)]
pub struct InMemoryIdentityRepository {
    identities: RwLock<HashMap<IdentityId, Identity>>,
}

impl InMemoryIdentityRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl IdentityRepository for InMemoryIdentityRepository {
    async fn create(&self, identity: Identity) -> Result<Identity, AuthError> {
        let mut identities = self.identities.write().await;

        if identities.values().any(|i| i.login == identity.login) {
            return Err(AuthError::LoginTaken(identity.login.to_string()));
        }

        identities.insert(identity.id, identity.clone());
        Ok(identity)
    }

    async fn find_by_login(&self, login: &str) -> Result<Option<Identity>, AuthError> {
        let identities = self.identities.read().await;
        Ok(identities.values().find(|i| i.login.as_str() == login).cloned())
    }

    async fn set_elevated(&self, login: &Login) -> Result<Option<IdentityId>, AuthError> {
        let mut identities = self.identities.write().await;

        Ok(identities
            .values_mut()
            .find(|i| &i.login == login)
            .map(|identity| {
                identity.elevated = true;
                identity.id
            }))
    }
}

#[derive(Default)]
pub struct InMemorySessionRepository {
    sessions: RwLock<HashMap<IdentityId, Session>>,
}

impl InMemorySessionRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn activate(&self, identity_id: &IdentityId) -> Result<(), AuthError> {
        let session = Session {
            identity_id: *identity_id,
            active: true,
            updated_at: Utc::now(),
        };
        self.sessions.write().await.insert(*identity_id, session);
        Ok(())
    }

    async fn find(&self, identity_id: &IdentityId) -> Result<Option<Session>, AuthError> {
        Ok(self.sessions.read().await.get(identity_id).cloned())
    }

    async fn deactivate(&self, identity_id: &IdentityId) -> Result<(), AuthError> {
        if let Some(session) = self.sessions.write().await.get_mut(identity_id) {
            session.active = false;
            session.updated_at = Utc::now();
        }
        Ok(())
    }
}

/// Refresh records, retired ones included.
#[derive(Default)]
pub struct InMemoryRefreshRepository {
    records: RwLock<Vec<RefreshRecord>>,
}

impl InMemoryRefreshRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every record ever stored for the identity, oldest first.
    pub async fn records_for(&self, identity_id: &IdentityId) -> Vec<RefreshRecord> {
        self.records
            .read()
            .await
            .iter()
            .filter(|r| &r.identity_id == identity_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl RefreshRepository for InMemoryRefreshRepository {
    async fn hash_exists(&self, secret_hash: &str) -> Result<bool, AuthError> {
        let records = self.records.read().await;
        Ok(records.iter().any(|r| r.secret_hash == secret_hash))
    }

    async fn replace_live(&self, record: RefreshRecord) -> Result<(), AuthError> {
        let mut records = self.records.write().await;

        if records.iter().any(|r| r.secret_hash == record.secret_hash) {
            return Err(AuthError::DatabaseError(
                "duplicate refresh secret hash".to_string(),
            ));
        }

        records
            .iter_mut()
            .filter(|r| r.identity_id == record.identity_id && r.live)
            .for_each(|r| r.live = false);
        records.push(record);

        Ok(())
    }

    async fn find_live(&self, identity_id: &IdentityId) -> Result<Option<RefreshRecord>, AuthError> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .find(|r| &r.identity_id == identity_id && r.live)
            .cloned())
    }

    async fn retire(&self, record_id: &Uuid) -> Result<bool, AuthError> {
        let mut records = self.records.write().await;

        match records.iter_mut().find(|r| &r.id == record_id && r.live) {
            Some(record) => {
                record.live = false;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn retire_for_identity(&self, identity_id: &IdentityId) -> Result<u64, AuthError> {
        let mut records = self.records.write().await;
        let mut retired = 0;

        for record in records
            .iter_mut()
            .filter(|r| &r.identity_id == identity_id && r.live)
        {
            record.live = false;
            retired += 1;
        }

        Ok(retired)
    }

    async fn retire_expired(&self, now: DateTime<Utc>) -> Result<u64, AuthError> {
        let mut records = self.records.write().await;
        let mut retired = 0;

        for record in records.iter_mut().filter(|r| r.live && r.is_expired(now)) {
            record.live = false;
            retired += 1;
        }

        Ok(retired)
    }
}
