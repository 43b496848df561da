//! SQLite-backed store for tasks and accounts.

use super::{now_string, MetricReading, Task, TaskStore, User, UserStore};
use crate::classify::Disease;
use crate::password;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

const SCHEMA: &str = r#"
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY NOT NULL,
    username TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS tasks (
    id TEXT PRIMARY KEY NOT NULL,
    user_id TEXT NOT NULL,
    task_name TEXT NOT NULL,
    task_time TEXT NOT NULL,
    nominee_phone TEXT NOT NULL,
    is_complete INTEGER NOT NULL DEFAULT 0,
    disease_name TEXT,
    disease_value REAL,
    recommendations TEXT NOT NULL DEFAULT '',
    created_at TEXT NOT NULL,
    CHECK ((disease_name IS NULL) = (disease_value IS NULL)),
    FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_tasks_user ON tasks(user_id);
"#;

const TASK_COLUMNS: &str = "id, user_id, task_name, task_time, nominee_phone, is_complete, \
                            disease_name, disease_value, recommendations, created_at";

pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    pub async fn new(base_dir: PathBuf) -> Result<Self, String> {
        tokio::fs::create_dir_all(&base_dir)
            .await
            .map_err(|e| format!("Failed to create data dir: {}", e))?;
        let db_path = base_dir.join("careminder.db");

        // Open database in blocking task
        let conn = tokio::task::spawn_blocking(move || {
            let conn = Connection::open(&db_path)
                .map_err(|e| format!("Failed to open SQLite database: {}", e))?;
            conn.execute_batch(SCHEMA)
                .map_err(|e| format!("Failed to run schema: {}", e))?;
            Ok::<_, String>(conn)
        })
        .await
        .map_err(|e| format!("Task join error: {}", e))??;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }
}

fn task_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Task> {
    let id_str: String = row.get(0)?;
    let user_id_str: String = row.get(1)?;
    let task_time_str: String = row.get(3)?;
    let disease_name: Option<String> = row.get(6)?;
    let disease_value: Option<f64> = row.get(7)?;

    // A row that no longer parses is corruption; surface it instead of
    // handing back a task with made-up identity or time.
    let id = Uuid::parse_str(&id_str)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(e)))?;
    let user_id = Uuid::parse_str(&user_id_str)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(1, Type::Text, Box::new(e)))?;
    let scheduled_at = DateTime::parse_from_rfc3339(&task_time_str)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(3, Type::Text, Box::new(e)))?;

    // Both columns are set or neither is (schema CHECK); a name that no
    // longer parses drops the reading rather than failing the whole row.
    let metric = match (disease_name, disease_value) {
        (Some(name), Some(value)) => name
            .parse::<Disease>()
            .ok()
            .map(|disease| MetricReading { disease, value }),
        _ => None,
    };

    Ok(Task {
        id,
        user_id,
        name: row.get(2)?,
        scheduled_at,
        nominee_phone: row.get(4)?,
        is_complete: row.get::<_, i32>(5)? != 0,
        metric,
        recommendations: row.get(8)?,
        created_at: row.get(9)?,
    })
}

#[async_trait]
impl TaskStore for SqliteStore {
    fn is_persistent(&self) -> bool {
        true
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

        let conn = self.conn.clone();
        let t = task.clone();
        tokio::task::spawn_blocking(move || {
            let conn = conn.blocking_lock();
            conn.execute(
                "INSERT INTO tasks (id, user_id, task_name, task_time, nominee_phone, is_complete,
                                    disease_name, disease_value, recommendations, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    t.id.to_string(),
                    t.user_id.to_string(),
                    t.name,
                    t.scheduled_at.to_rfc3339(),
                    t.nominee_phone,
                    t.is_complete as i32,
                    t.metric.map(|m| m.disease.name()),
                    t.metric.map(|m| m.value),
                    t.recommendations,
                    t.created_at,
                ],
            )
            .map_err(|e| e.to_string())?;
            Ok::<_, String>(())
        })
        .await
        .map_err(|e| e.to_string())??;

        Ok(task)
    }

    async fn list_by_owner(&self, owner: Uuid) -> Result<Vec<Task>, String> {
        let conn = self.conn.clone();
        let owner_str = owner.to_string();
        tokio::task::spawn_blocking(move || {
            let conn = conn.blocking_lock();
            let mut stmt = conn
                .prepare(&format!(
                    "SELECT {} FROM tasks WHERE user_id = ?1",
                    TASK_COLUMNS
                ))
                .map_err(|e| e.to_string())?;

            let tasks = stmt
                .query_map(params![&owner_str], task_from_row)
                .map_err(|e| e.to_string())?
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| e.to_string())?;

            Ok(tasks)
        })
        .await
        .map_err(|e| e.to_string())?
    }

    async fn find_by_owner(&self, owner: Uuid, id: Uuid) -> Result<Option<Task>, String> {
        let conn = self.conn.clone();
        let owner_str = owner.to_string();
        let id_str = id.to_string();
        tokio::task::spawn_blocking(move || {
            let conn = conn.blocking_lock();
            conn.query_row(
                &format!(
                    "SELECT {} FROM tasks WHERE id = ?1 AND user_id = ?2",
                    TASK_COLUMNS
                ),
                params![&id_str, &owner_str],
                task_from_row,
            )
            .optional()
            .map_err(|e| e.to_string())
        })
        .await
        .map_err(|e| e.to_string())?
    }

    async fn delete_by_owner(&self, owner: Uuid, id: Uuid) -> Result<bool, String> {
        let conn = self.conn.clone();
        let owner_str = owner.to_string();
        let id_str = id.to_string();
        tokio::task::spawn_blocking(move || {
            let conn = conn.blocking_lock();
            let rows = conn
                .execute(
                    "DELETE FROM tasks WHERE id = ?1 AND user_id = ?2",
                    params![&id_str, &owner_str],
                )
                .map_err(|e| e.to_string())?;
            Ok(rows > 0)
        })
        .await
        .map_err(|e| e.to_string())?
    }

    async fn mark_complete(&self, owner: Uuid, id: Uuid) -> Result<Option<Task>, String> {
        let conn = self.conn.clone();
        let owner_str = owner.to_string();
        let id_str = id.to_string();
        tokio::task::spawn_blocking(move || {
            let conn = conn.blocking_lock();
            conn.execute(
                "UPDATE tasks SET is_complete = 1 WHERE id = ?1 AND user_id = ?2",
                params![&id_str, &owner_str],
            )
            .map_err(|e| e.to_string())?;

            conn.query_row(
                &format!(
                    "SELECT {} FROM tasks WHERE id = ?1 AND user_id = ?2",
                    TASK_COLUMNS
                ),
                params![&id_str, &owner_str],
                task_from_row,
            )
            .optional()
            .map_err(|e| e.to_string())
        })
        .await
        .map_err(|e| e.to_string())?
    }
}

#[async_trait]
impl UserStore for SqliteStore {
    async fn create_user(&self, username: &str, password: &str) -> Result<User, String> {
        let user = User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            created_at: now_string(),
        };

        let conn = self.conn.clone();
        let u = user.clone();
        let password = password.to_string();
        tokio::task::spawn_blocking(move || {
            // Hash on the blocking thread; PBKDF2 is deliberately slow.
            let password_hash = password::hash_password(&password)?;
            let conn = conn.blocking_lock();
            conn.execute(
                "INSERT INTO users (id, username, password_hash, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![u.id.to_string(), u.username, password_hash, u.created_at],
            )
            .map_err(|e| e.to_string())?;
            Ok::<_, String>(())
        })
        .await
        .map_err(|e| e.to_string())??;

        Ok(user)
    }

    async fn verify_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<User>, String> {
        let conn = self.conn.clone();
        let username = username.to_string();
        let password = password.to_string();
        tokio::task::spawn_blocking(move || {
            let row = {
                let conn = conn.blocking_lock();
                conn.query_row(
                    "SELECT id, username, password_hash, created_at
                     FROM users WHERE username = ?1",
                    params![&username],
                    |row| {
                        Ok((
                            row.get::<_, String>(0)?,
                            row.get::<_, String>(1)?,
                            row.get::<_, String>(2)?,
                            row.get::<_, String>(3)?,
                        ))
                    },
                )
                .optional()
                .map_err(|e| e.to_string())?
            };

            let Some((id_str, username, password_hash, created_at)) = row else {
                return Ok(None);
            };

            // Verify outside the connection lock.
            if !password::verify_password(&password, &password_hash) {
                return Ok(None);
            }

            Ok(Some(User {
                id: Uuid::parse_str(&id_str).unwrap_or_default(),
                username,
                created_at,
            }))
        })
        .await
        .map_err(|e| e.to_string())?
    }
}
