//! In-memory store (non-persistent).

use super::{now_string, MetricReading, Task, TaskStore, User, UserStore};
use crate::password;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

struct UserRecord {
    user: User,
    password_hash: String,
}

#[derive(Clone, Default)]
pub struct InMemoryStore {
    tasks: Arc<RwLock<HashMap<Uuid, Task>>>,
    users: Arc<RwLock<HashMap<Uuid, Arc<UserRecord>>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskStore for InMemoryStore {
    fn is_persistent(&self) -> bool {
        false
    }

    async fn create_task(
        &self,
        owner: Uuid,
        name: &str,
        scheduled_at: DateTime<Utc>,
        nominee_phone: &str,
        metric: Option<MetricReading>,
        recommendations: &str,
    ) -> Result<Task, String> {
        let task = Task {
            id: Uuid::new_v4(),
            user_id: owner,
            name: name.to_string(),
            scheduled_at,
            nominee_phone: nominee_phone.to_string(),
            is_complete: false,
            metric,
            recommendations: recommendations.to_string(),
            created_at: now_string(),
        };
        self.tasks.write().await.insert(task.id, task.clone());
        Ok(task)
    }

    async fn list_by_owner(&self, owner: Uuid) -> Result<Vec<Task>, String> {
        Ok(self
            .tasks
            .read()
            .await
            .values()
            .filter(|t| t.user_id == owner)
            .cloned()
            .collect())
    }

    async fn find_by_owner(&self, owner: Uuid, id: Uuid) -> Result<Option<Task>, String> {
        Ok(self
            .tasks
            .read()
            .await
            .get(&id)
            .filter(|t| t.user_id == owner)
            .cloned())
    }

    async fn delete_by_owner(&self, owner: Uuid, id: Uuid) -> Result<bool, String> {
        let mut tasks = self.tasks.write().await;
        match tasks.get(&id) {
            Some(t) if t.user_id == owner => {
                tasks.remove(&id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn mark_complete(&self, owner: Uuid, id: Uuid) -> Result<Option<Task>, String> {
        let mut tasks = self.tasks.write().await;
        match tasks.get_mut(&id) {
            Some(t) if t.user_id == owner => {
                t.is_complete = true;
                Ok(Some(t.clone()))
            }
            _ => Ok(None),
        }
    }
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn create_user(&self, username: &str, password: &str) -> Result<User, String> {
        // Hash off the async threads; PBKDF2 is deliberately slow.
        let password = password.to_string();
        let password_hash = tokio::task::spawn_blocking(move || password::hash_password(&password))
            .await
            .map_err(|e| e.to_string())??;

        let mut users = self.users.write().await;
        if users.values().any(|r| r.user.username == username) {
            return Err(format!("username already taken: {}", username));
        }
        let user = User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            created_at: now_string(),
        };
        users.insert(
            user.id,
            Arc::new(UserRecord {
                user: user.clone(),
                password_hash,
            }),
        );
        Ok(user)
    }

    async fn verify_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<User>, String> {
        let record = self
            .users
            .read()
            .await
            .values()
            .find(|r| r.user.username == username)
            .cloned();

        let Some(record) = record else {
            return Ok(None);
        };

        let user = record.user.clone();
        let password = password.to_string();
        let matched = tokio::task::spawn_blocking(move || {
            password::verify_password(&password, &record.password_hash)
        })
        .await
        .map_err(|e| e.to_string())?;

        if matched {
            Ok(Some(user))
        } else {
            Ok(None)
        }
    }
}
