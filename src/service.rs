//! Task lifecycle orchestration.
//!
//! `TaskService` sits between the HTTP handlers and the store: it validates
//! input, derives recommendation text from metric readings, and drives the
//! complete-then-notify sequence. Completion is committed before the
//! notification is attempted and is never rolled back if delivery fails.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::advice;
use crate::classify;
use crate::notify::NotificationDispatcher;
use crate::store::{MetricReading, Task, TaskStore};

/// Error taxonomy for task operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(String),

    #[error("task not found")]
    NotFound,

    #[error("storage failure: {0}")]
    Storage(String),
}

/// Input for creating a task. The metric pair is already resolved to a
/// typed reading by the caller, so an unpaired disease/value cannot reach
/// this layer.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub name: String,
    pub scheduled_at: DateTime<Utc>,
    pub nominee_phone: String,
    pub metric: Option<MetricReading>,
}

/// Result of a completion call. The persisted flag and the delivery
/// outcome are reported separately so callers can surface partial failure.
#[derive(Debug, Clone)]
pub struct CompletionOutcome {
    pub task: Task,
    pub notified: bool,
}

/// Orchestrates storage, classification, advice, and notifications.
pub struct TaskService {
    store: Arc<dyn TaskStore>,
    dispatcher: NotificationDispatcher,
}

impl TaskService {
    pub fn new(store: Arc<dyn TaskStore>, dispatcher: NotificationDispatcher) -> Self {
        Self { store, dispatcher }
    }

    /// Create a task for `owner`, deriving recommendation text when a
    /// metric reading is attached.
    pub async fn create_task(&self, owner: Uuid, new_task: NewTask) -> Result<Task, ServiceError> {
        if new_task.name.trim().is_empty() || new_task.nominee_phone.trim().is_empty() {
            return Err(ServiceError::Validation(
                "taskName, taskTime, and nomineePhone are required fields.".to_string(),
            ));
        }

        let recommendations = match new_task.metric {
            Some(reading) => {
                let category = classify::classify(reading.disease, reading.value);
                advice::render_recommendations(reading.disease, category)
            }
            None => String::new(),
        };

        let task = self
            .store
            .create_task(
                owner,
                new_task.name.trim(),
                new_task.scheduled_at,
                new_task.nominee_phone.trim(),
                new_task.metric,
                &recommendations,
            )
            .await
            .map_err(ServiceError::Storage)?;

        tracing::info!(task_id = %task.id, owner = %owner, "task created");
        Ok(task)
    }

    /// All tasks owned by `owner`.
    pub async fn list_tasks(&self, owner: Uuid) -> Result<Vec<Task>, ServiceError> {
        self.store
            .list_by_owner(owner)
            .await
            .map_err(ServiceError::Storage)
    }

    /// Delete a task; returns whether one was removed. Absent ids and
    /// tasks owned by someone else both come back `false`.
    pub async fn delete_task(&self, owner: Uuid, id: Uuid) -> Result<bool, ServiceError> {
        let deleted = self
            .store
            .delete_by_owner(owner, id)
            .await
            .map_err(ServiceError::Storage)?;
        if deleted {
            tracing::info!(task_id = %id, owner = %owner, "task deleted");
        }
        Ok(deleted)
    }

    /// Mark a task complete and notify its nominee.
    ///
    /// The flag is persisted first; the dispatch result only shapes the
    /// `notified` field of the outcome. Completing an already-complete
    /// task is a no-op on the flag but still re-sends the notification.
    pub async fn complete_task(
        &self,
        owner: Uuid,
        id: Uuid,
    ) -> Result<CompletionOutcome, ServiceError> {
        let task = self
            .store
            .mark_complete(owner, id)
            .await
            .map_err(ServiceError::Storage)?
            .ok_or(ServiceError::NotFound)?;

        let notified = self.dispatcher.notify_completion(&task).await.is_ok();
        Ok(CompletionOutcome { task, notified })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::Disease;
    use crate::notify::{DeliveryReceipt, NotificationChannel, NotifyError};
    use crate::store::InMemoryStore;
    use async_trait::async_trait;
    use tokio::sync::Mutex;

    /// Captures every send; optionally simulates an outage.
    struct RecordingChannel {
        sent: Mutex<Vec<(String, String)>>,
        fail: bool,
    }

    impl RecordingChannel {
        fn new(fail: bool) -> Arc<Self> {
            Arc::new(Self {
                sent: Mutex::new(Vec::new()),
                fail,
            })
        }
    }

    #[async_trait]
    impl NotificationChannel for RecordingChannel {
        async fn send(&self, to: &str, body: &str) -> Result<DeliveryReceipt, NotifyError> {
            self.sent
                .lock()
                .await
                .push((to.to_string(), body.to_string()));
            if self.fail {
                Err(NotifyError::Network("simulated outage".to_string()))
            } else {
                Ok(DeliveryReceipt {
                    message_id: Some("SM123".to_string()),
                })
            }
        }
    }

    fn service_with_channel(
        channel: Arc<RecordingChannel>,
    ) -> (TaskService, Arc<InMemoryStore>) {
        let store = Arc::new(InMemoryStore::default());
        let service = TaskService::new(
            store.clone(),
            NotificationDispatcher::new(channel),
        );
        (service, store)
    }

    fn new_task(name: &str, metric: Option<MetricReading>) -> NewTask {
        NewTask {
            name: name.to_string(),
            scheduled_at: Utc::now(),
            nominee_phone: "+15551234567".to_string(),
            metric,
        }
    }

    #[tokio::test]
    async fn test_create_with_high_blood_pressure_recommends_intervention() {
        let (service, _) = service_with_channel(RecordingChannel::new(false));
        let owner = Uuid::new_v4();

        let task = service
            .create_task(
                owner,
                new_task(
                    "Check BP",
                    Some(MetricReading {
                        disease: Disease::BloodPressure,
                        value: 150.0,
                    }),
                ),
            )
            .await
            .unwrap();

        assert!(!task.is_complete);
        assert!(task.recommendations.contains("leafy greens"));
        assert!(task.recommendations.contains("aerobic exercise"));
    }

    #[tokio::test]
    async fn test_create_with_normal_blood_pressure_recommends_maintenance() {
        let (service, _) = service_with_channel(RecordingChannel::new(false));
        let owner = Uuid::new_v4();

        let task = service
            .create_task(
                owner,
                new_task(
                    "Check BP",
                    Some(MetricReading {
                        disease: Disease::BloodPressure,
                        value: 100.0,
                    }),
                ),
            )
            .await
            .unwrap();

        assert!(task
            .recommendations
            .contains("Maintain a balanced diet with moderate salt intake."));
    }

    #[tokio::test]
    async fn test_create_without_metric_has_empty_recommendations() {
        let (service, _) = service_with_channel(RecordingChannel::new(false));
        let owner = Uuid::new_v4();

        let task = service
            .create_task(owner, new_task("Drink water", None))
            .await
            .unwrap();

        assert!(task.metric.is_none());
        assert_eq!(task.recommendations, "");
    }

    #[tokio::test]
    async fn test_create_rejects_blank_required_fields() {
        let (service, _) = service_with_channel(RecordingChannel::new(false));
        let owner = Uuid::new_v4();

        let err = service
            .create_task(owner, new_task("   ", None))
            .await
            .unwrap_err();
        match err {
            ServiceError::Validation(msg) => {
                assert_eq!(msg, "taskName, taskTime, and nomineePhone are required fields.")
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_complete_sends_exact_notification_body() {
        let channel = RecordingChannel::new(false);
        let (service, _) = service_with_channel(channel.clone());
        let owner = Uuid::new_v4();

        let task = service
            .create_task(
                owner,
                new_task(
                    "Check BP",
                    Some(MetricReading {
                        disease: Disease::BloodPressure,
                        value: 150.0,
                    }),
                ),
            )
            .await
            .unwrap();

        let outcome = service.complete_task(owner, task.id).await.unwrap();
        assert!(outcome.task.is_complete);
        assert!(outcome.notified);

        let sent = channel.sent.lock().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "+15551234567");
        assert_eq!(
            sent[0].1,
            "Task \"Check BP\" has been completed. Disease: Blood Pressure, Value: 150"
        );
    }

    #[tokio::test]
    async fn test_completion_commits_despite_channel_failure() {
        let channel = RecordingChannel::new(true);
        let (service, store) = service_with_channel(channel.clone());
        let owner = Uuid::new_v4();

        let task = service
            .create_task(owner, new_task("Take medication", None))
            .await
            .unwrap();

        let outcome = service.complete_task(owner, task.id).await.unwrap();
        assert!(outcome.task.is_complete);
        assert!(!outcome.notified);

        // The stored flag survives the failed send.
        let stored = store.find_by_owner(owner, task.id).await.unwrap().unwrap();
        assert!(stored.is_complete);
    }

    #[tokio::test]
    async fn test_complete_absent_task_is_not_found() {
        let channel = RecordingChannel::new(false);
        let (service, _) = service_with_channel(channel.clone());

        let err = service
            .complete_task(Uuid::new_v4(), Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound));
        assert!(channel.sent.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_complete_foreign_task_is_not_found() {
        let channel = RecordingChannel::new(false);
        let (service, _) = service_with_channel(channel.clone());
        let owner = Uuid::new_v4();

        let task = service
            .create_task(owner, new_task("Private task", None))
            .await
            .unwrap();

        let err = service
            .complete_task(Uuid::new_v4(), task.id)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound));
        assert!(channel.sent.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_recompleting_resends_notification() {
        let channel = RecordingChannel::new(false);
        let (service, _) = service_with_channel(channel.clone());
        let owner = Uuid::new_v4();

        let task = service
            .create_task(owner, new_task("Walk", None))
            .await
            .unwrap();

        service.complete_task(owner, task.id).await.unwrap();
        let second = service.complete_task(owner, task.id).await.unwrap();

        assert!(second.task.is_complete);
        assert_eq!(channel.sent.lock().await.len(), 2);
    }

    #[tokio::test]
    async fn test_list_and_delete_are_owner_scoped() {
        let (service, _) = service_with_channel(RecordingChannel::new(false));
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        let task = service
            .create_task(alice, new_task("Alice task", None))
            .await
            .unwrap();
        service
            .create_task(bob, new_task("Bob task", None))
            .await
            .unwrap();

        let alice_tasks = service.list_tasks(alice).await.unwrap();
        assert_eq!(alice_tasks.len(), 1);
        assert_eq!(alice_tasks[0].name, "Alice task");

        // Bob cannot delete Alice's task.
        assert!(!service.delete_task(bob, task.id).await.unwrap());
        assert!(service.delete_task(alice, task.id).await.unwrap());
        assert!(service.list_tasks(alice).await.unwrap().is_empty());
    }
}
