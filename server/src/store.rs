//! User record storage.
//!
//! DESIGN
//! ======
//! Resolvers work against the `ProfileStore` trait. `PgProfileStore` is the
//! production backend; `MemoryProfileStore` serves local runs without
//! `DATABASE_URL` and the test suite. Records are keyed by the identity
//! provider's user id (`gid`) and written whole.

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;

use std::collections::HashMap;
use std::sync::Mutex;

use account::Profile;
use account::roles::RoleLevel;
use async_trait::async_trait;
use sqlx::{PgPool, Row};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
}

/// Stored user. Mirrors the `users` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub gid: String,
    pub name: Option<String>,
    pub email: String,
    /// Last access token the user called with.
    pub token: Option<String>,
    /// Offline refresh token from the last code exchange.
    pub refresh_token: Option<String>,
    pub role: i32,
}

impl UserRecord {
    /// Record created on a user's first authenticated call.
    #[must_use]
    pub fn first_contact(gid: &str, email: &str, token: &str) -> Self {
        Self {
            gid: gid.to_owned(),
            name: None,
            email: email.to_owned(),
            token: Some(token.to_owned()),
            refresh_token: None,
            role: RoleLevel::Unregistered.value(),
        }
    }

    /// Public view returned over GraphQL.
    #[must_use]
    pub fn profile(&self) -> Profile {
        Profile { gid: self.gid.clone(), name: self.name.clone(), email: self.email.clone(), role: self.role }
    }
}

#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Fetch a record by gid.
    async fn get(&self, gid: &str) -> Result<Option<UserRecord>, StoreError>;

    /// Insert or replace a record.
    async fn put(&self, record: &UserRecord) -> Result<(), StoreError>;
}

// =============================================================================
// POSTGRES
// =============================================================================

pub struct PgProfileStore {
    pool: PgPool,
}

impl PgProfileStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileStore for PgProfileStore {
    async fn get(&self, gid: &str) -> Result<Option<UserRecord>, StoreError> {
        let row = sqlx::query("SELECT gid, name, email, token, refresh_token, role FROM users WHERE gid = $1")
            .bind(gid)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|row| UserRecord {
            gid: row.get("gid"),
            name: row.get("name"),
            email: row.get("email"),
            token: row.get("token"),
            refresh_token: row.get("refresh_token"),
            role: row.get("role"),
        }))
    }

    async fn put(&self, record: &UserRecord) -> Result<(), StoreError> {
        sqlx::query(
            r"INSERT INTO users (gid, name, email, token, refresh_token, role)
              VALUES ($1, $2, $3, $4, $5, $6)
              ON CONFLICT (gid) DO UPDATE SET
                name = EXCLUDED.name,
                email = EXCLUDED.email,
                token = EXCLUDED.token,
                refresh_token = EXCLUDED.refresh_token,
                role = EXCLUDED.role,
                updated_at = now()",
        )
        .bind(&record.gid)
        .bind(&record.name)
        .bind(&record.email)
        .bind(&record.token)
        .bind(&record.refresh_token)
        .bind(record.role)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

// =============================================================================
// IN-MEMORY
// =============================================================================

#[derive(Default)]
pub struct MemoryProfileStore {
    records: Mutex<HashMap<String, UserRecord>>,
}

impl MemoryProfileStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with `records`.
    #[cfg(test)]
    #[must_use]
    pub fn with_records(records: impl IntoIterator<Item = UserRecord>) -> Self {
        let records = records.into_iter().map(|r| (r.gid.clone(), r)).collect();
        Self { records: Mutex::new(records) }
    }

    fn records(&self) -> std::sync::MutexGuard<'_, HashMap<String, UserRecord>> {
        self.records.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[async_trait]
impl ProfileStore for MemoryProfileStore {
    async fn get(&self, gid: &str) -> Result<Option<UserRecord>, StoreError> {
        Ok(self.records().get(gid).cloned())
    }

    async fn put(&self, record: &UserRecord) -> Result<(), StoreError> {
        self.records().insert(record.gid.clone(), record.clone());
        Ok(())
    }
}
