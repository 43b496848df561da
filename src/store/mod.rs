//! Task and account storage with pluggable backends.
//!
//! Supports:
//! - `memory`: In-memory storage (non-persistent, for testing)
//! - `sqlite`: SQLite database (default)
//!
//! Every task operation is scoped by the owning user id supplied by the
//! caller. Absent rows and rows owned by someone else produce the same
//! signal so no endpoint can leak another owner's task ids.

mod memory;
mod sqlite;

pub use memory::InMemoryStore;
pub use sqlite::SqliteStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

use crate::classify::Disease;

/// A registered account.
///
/// The password hash stays inside store implementations; it is never part
/// of this struct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub created_at: String,
}

/// A health-metric reading attached to a task.
///
/// Name and value always travel together: a task carries either a full
/// reading or none, so the pairing invariant cannot be violated in memory.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricReading {
    pub disease: Disease,
    pub value: f64,
}

/// A scheduled reminder task.
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub scheduled_at: DateTime<Utc>,
    pub nominee_phone: String,
    pub is_complete: bool,
    pub metric: Option<MetricReading>,
    /// Rendered advice text, computed at creation; empty without a metric.
    pub recommendations: String,
    pub created_at: String,
}

/// Get current timestamp as RFC3339 string.
pub fn now_string() -> String {
    Utc::now().to_rfc3339()
}

/// Task store trait - implemented by all storage backends.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Whether this store persists data across restarts.
    fn is_persistent(&self) -> bool;

    /// Create a task owned by `owner`.
    async fn create_task(
        &self,
        owner: Uuid,
        name: &str,
        scheduled_at: DateTime<Utc>,
        nominee_phone: &str,
        metric: Option<MetricReading>,
        recommendations: &str,
    ) -> Result<Task, String>;

    /// List the owner's tasks. No ordering guarantee; consumers sort.
    async fn list_by_owner(&self, owner: Uuid) -> Result<Vec<Task>, String>;

    /// Get a single task by id, scoped to the owner.
    async fn find_by_owner(&self, owner: Uuid, id: Uuid) -> Result<Option<Task>, String>;

    /// Delete a task. Returns false for absent and foreign-owned alike.
    async fn delete_by_owner(&self, owner: Uuid, id: Uuid) -> Result<bool, String>;

    /// Set the completion flag and return the updated task.
    ///
    /// Idempotent on the flag: completing an already-complete task leaves it
    /// complete. None for absent and foreign-owned alike.
    async fn mark_complete(&self, owner: Uuid, id: Uuid) -> Result<Option<Task>, String>;
}

/// Account store trait - credentials never leave implementations.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Register an account, hashing the password internally.
    /// Fails on a duplicate username.
    async fn create_user(&self, username: &str, password: &str) -> Result<User, String>;

    /// Check a username/password pair.
    ///
    /// `Ok(None)` covers both unknown username and wrong password; callers
    /// get one uniform bad-credentials signal.
    async fn verify_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<User>, String>;
}

/// Storage backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreKind {
    Memory,
    #[default]
    Sqlite,
}

impl std::str::FromStr for StoreKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "sqlite" | "db" => Ok(Self::Sqlite),
            other => Err(format!("unknown store kind: {}", other)),
        }
    }
}

/// Create the storage backends based on configuration.
///
/// One backend instance serves both traits, so the SQLite variant shares a
/// single connection between tasks and users.
pub async fn create_store(
    kind: StoreKind,
    data_dir: &Path,
) -> Result<(Arc<dyn TaskStore>, Arc<dyn UserStore>), String> {
    match kind {
        StoreKind::Memory => {
            let store = Arc::new(InMemoryStore::new());
            let tasks: Arc<dyn TaskStore> = store.clone();
            let users: Arc<dyn UserStore> = store;
            Ok((tasks, users))
        }
        StoreKind::Sqlite => {
            let store = Arc::new(SqliteStore::new(data_dir.to_path_buf()).await?);
            let tasks: Arc<dyn TaskStore> = store.clone();
            let users: Arc<dyn UserStore> = store;
            Ok((tasks, users))
        }
    }
}
