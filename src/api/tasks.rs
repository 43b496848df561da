//! Task endpoint handlers.
//!
//! Response shapes follow the task API contract exactly: delete speaks
//! JSON for every outcome while create/list/complete fall back to plain
//! text for their failure paths.

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

use super::auth::AuthUser;
use super::routes::AppState;
use super::types::{CreateTaskRequest, ErrorResponse, MessageResponse, TaskResponse};
use crate::service::{NewTask, ServiceError};

const REQUIRED_FIELDS: &str = "taskName, taskTime, and nomineePhone are required fields.";

fn bad_request(msg: impl Into<String>) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse { error: msg.into() }),
    )
        .into_response()
}

/// Create a task for the authenticated user.
pub async fn create_task(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<CreateTaskRequest>,
) -> Response {
    let name = req.task_name.as_deref().unwrap_or("").trim();
    let phone = req.nominee_phone.as_deref().unwrap_or("").trim();
    let time_present = match &req.task_time {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.trim().is_empty(),
        Some(_) => true,
    };
    if name.is_empty() || phone.is_empty() || !time_present {
        return bad_request(REQUIRED_FIELDS);
    }

    let scheduled_at = match req.scheduled_at() {
        Some(t) => t,
        None => return bad_request("taskTime must be a valid date/time."),
    };
    let metric = match req.metric() {
        Ok(m) => m,
        Err(e) => return bad_request(e),
    };

    let new_task = NewTask {
        name: name.to_string(),
        scheduled_at,
        nominee_phone: phone.to_string(),
        metric,
    };

    match state.service.create_task(user.id, new_task).await {
        Ok(task) => (StatusCode::CREATED, Json(TaskResponse::from(task))).into_response(),
        Err(ServiceError::Validation(msg)) => bad_request(msg),
        Err(e) => {
            tracing::error!("task creation failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Error creating task").into_response()
        }
    }
}

/// List the authenticated user's tasks, earliest scheduled first.
pub async fn list_tasks(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Response {
    match state.service.list_tasks(user.id).await {
        Ok(mut tasks) => {
            tasks.sort_by_key(|t| t.scheduled_at);
            let body: Vec<TaskResponse> = tasks.into_iter().map(TaskResponse::from).collect();
            Json(body).into_response()
        }
        Err(e) => {
            tracing::error!("task listing failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Error fetching tasks").into_response()
        }
    }
}

/// Delete one of the authenticated user's tasks.
pub async fn delete_task(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Response {
    let id = match Uuid::parse_str(id.trim()) {
        Ok(id) => id,
        Err(_) => return bad_request("Invalid task ID"),
    };

    match state.service.delete_task(user.id, id).await {
        Ok(true) => Json(MessageResponse {
            message: "Task deleted successfully!".to_string(),
        })
        .into_response(),
        Ok(false) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: "Task not found".to_string(),
            }),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(task_id = %id, "task deletion failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Error deleting task".to_string(),
                }),
            )
                .into_response()
        }
    }
}

/// Mark a task complete and notify its nominee.
///
/// Both delivery outcomes are 200: the completion itself committed, and
/// the body text says whether the SMS went out.
pub async fn complete_task(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Response {
    // A malformed id cannot name any task, so it reads as absent.
    let id = match Uuid::parse_str(id.trim()) {
        Ok(id) => id,
        Err(_) => return (StatusCode::NOT_FOUND, "Task not found").into_response(),
    };

    match state.service.complete_task(user.id, id).await {
        Ok(outcome) if outcome.notified => {
            (StatusCode::OK, "Task marked as complete and notification sent!").into_response()
        }
        Ok(_) => (
            StatusCode::OK,
            "Task marked as complete but the notification could not be delivered.",
        )
            .into_response(),
        Err(ServiceError::NotFound) => (StatusCode::NOT_FOUND, "Task not found").into_response(),
        Err(e) => {
            tracing::error!(task_id = %id, "task completion failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error marking task as complete",
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::Disease;
    use crate::config::Config;
    use crate::notify::{
        DeliveryReceipt, NotificationChannel, NotificationDispatcher, NotifyError,
    };
    use crate::service::TaskService;
    use crate::store::{InMemoryStore, MetricReading, StoreKind, Task};
    use async_trait::async_trait;
    use axum::body::to_bytes;
    use chrono::Utc;
    use std::path::PathBuf;

    struct StubChannel {
        fail: bool,
    }

    #[async_trait]
    impl NotificationChannel for StubChannel {
        async fn send(&self, _to: &str, _body: &str) -> Result<DeliveryReceipt, NotifyError> {
            if self.fail {
                Err(NotifyError::Network("simulated outage".to_string()))
            } else {
                Ok(DeliveryReceipt { message_id: None })
            }
        }
    }

    fn test_state(fail_sends: bool) -> Arc<AppState> {
        let store = Arc::new(InMemoryStore::new());
        let service = TaskService::new(
            store.clone(),
            NotificationDispatcher::new(Arc::new(StubChannel { fail: fail_sends })),
        );
        Arc::new(AppState {
            config: Config::new(
                StoreKind::Memory,
                PathBuf::from("/tmp"),
                "test-secret".to_string(),
            ),
            service,
            users: store,
        })
    }

    async fn seed_task(state: &AppState, owner: Uuid) -> Task {
        state
            .service
            .create_task(
                owner,
                crate::service::NewTask {
                    name: "Check BP".to_string(),
                    scheduled_at: Utc::now(),
                    nominee_phone: "+15551234567".to_string(),
                    metric: Some(MetricReading {
                        disease: Disease::BloodPressure,
                        value: 150.0,
                    }),
                },
            )
            .await
            .expect("seed task failed")
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("failed to read body");
        String::from_utf8(bytes.to_vec()).expect("body was not utf-8")
    }

    async fn body_json(response: Response) -> Value {
        serde_json::from_str(&body_text(response).await).expect("body was not JSON")
    }

    fn user() -> AuthUser {
        AuthUser { id: Uuid::new_v4() }
    }

    #[tokio::test]
    async fn test_create_missing_fields_is_400_with_exact_error() {
        let state = test_state(false);
        let req = CreateTaskRequest {
            task_name: Some("Check BP".to_string()),
            task_time: None,
            nominee_phone: None,
            disease_name: None,
            disease_value: None,
        };

        let response = create_task(State(state), Extension(user()), Json(req)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({
                "error": "taskName, taskTime, and nomineePhone are required fields."
            })
        );
    }

    #[tokio::test]
    async fn test_delete_malformed_id_is_400_invalid_task_id() {
        let state = test_state(false);

        let response = delete_task(
            State(state),
            Extension(user()),
            Path("not-a-uuid".to_string()),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({ "error": "Invalid task ID" })
        );
    }

    #[tokio::test]
    async fn test_delete_success_then_repeat_is_not_found() {
        let state = test_state(false);
        let caller = user();
        let task = seed_task(&state, caller.id).await;

        let response = delete_task(
            State(state.clone()),
            Extension(caller.clone()),
            Path(task.id.to_string()),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({ "message": "Task deleted successfully!" })
        );

        // Deleting again reads exactly like deleting a task that never
        // existed.
        let response = delete_task(
            State(state),
            Extension(caller),
            Path(task.id.to_string()),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({ "error": "Task not found" })
        );
    }

    #[tokio::test]
    async fn test_complete_body_when_notification_sent() {
        let state = test_state(false);
        let caller = user();
        let task = seed_task(&state, caller.id).await;

        let response = complete_task(
            State(state),
            Extension(caller),
            Path(task.id.to_string()),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_text(response).await,
            "Task marked as complete and notification sent!"
        );
    }

    #[tokio::test]
    async fn test_complete_body_when_notification_fails() {
        let state = test_state(true);
        let caller = user();
        let task = seed_task(&state, caller.id).await;

        let response = complete_task(
            State(state),
            Extension(caller),
            Path(task.id.to_string()),
        )
        .await;
        // Completion itself committed, so the status stays 200 and only
        // the body reports the delivery failure.
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_text(response).await,
            "Task marked as complete but the notification could not be delivered."
        );
    }

    #[tokio::test]
    async fn test_complete_absent_task_is_404() {
        let state = test_state(false);

        let response = complete_task(
            State(state),
            Extension(user()),
            Path(Uuid::new_v4().to_string()),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_text(response).await, "Task not found");
    }

    #[tokio::test]
    async fn test_complete_malformed_id_is_404() {
        let state = test_state(false);

        let response = complete_task(
            State(state),
            Extension(user()),
            Path("not-a-uuid".to_string()),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_text(response).await, "Task not found");
    }
}
