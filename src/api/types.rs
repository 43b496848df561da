//! API request and response types.
//!
//! Create requests are deliberately lenient about field shapes: HTML forms
//! post every value as a string and `datetime-local` inputs carry no zone,
//! so the numeric and time fields coerce before validation rejects them.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::classify::Disease;
use crate::store::{MetricReading, Task};

/// Request to create a task.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    pub task_name: Option<String>,

    /// Scheduled time: RFC 3339, naive `YYYY-MM-DDTHH:MM[:SS]`, or unix
    /// epoch milliseconds.
    pub task_time: Option<Value>,

    pub nominee_phone: Option<String>,

    /// Optional metric name; must be paired with `disease_value`.
    pub disease_name: Option<String>,

    /// Optional metric reading; a number or a numeric string.
    pub disease_value: Option<Value>,
}

impl CreateTaskRequest {
    /// Resolve the scheduled time, or None when absent or unparseable.
    pub fn scheduled_at(&self) -> Option<DateTime<Utc>> {
        match self.task_time.as_ref()? {
            Value::String(s) => parse_time_string(s),
            Value::Number(n) => {
                let millis = n.as_i64()?;
                Utc.timestamp_millis_opt(millis).single()
            }
            _ => None,
        }
    }

    /// Resolve the optional metric pair into a typed reading.
    ///
    /// Empty strings count as absent, matching what HTML forms submit for
    /// untouched inputs. An unpaired field or an unrecognized metric name
    /// is an error; so is a value that is not a number.
    pub fn metric(&self) -> Result<Option<MetricReading>, String> {
        let name = self
            .disease_name
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());

        let value = match &self.disease_value {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) if s.trim().is_empty() => None,
            Some(Value::String(s)) => Some(
                s.trim()
                    .parse::<f64>()
                    .map_err(|_| format!("diseaseValue must be a number, got \"{}\"", s))?,
            ),
            Some(Value::Number(n)) => Some(
                n.as_f64()
                    .ok_or_else(|| "diseaseValue must be a number".to_string())?,
            ),
            Some(other) => return Err(format!("diseaseValue must be a number, got {}", other)),
        };

        match (name, value) {
            (None, None) => Ok(None),
            (Some(name), Some(value)) => {
                let disease = name.parse::<Disease>().map_err(|e| e.to_string())?;
                Ok(Some(MetricReading { disease, value }))
            }
            _ => Err("diseaseName and diseaseValue must be provided together.".to_string()),
        }
    }
}

/// A task as returned by the JSON API.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskResponse {
    pub id: Uuid,
    pub task_name: String,
    pub task_time: DateTime<Utc>,
    pub nominee_phone: String,
    pub user_id: Uuid,
    pub is_complete: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub disease_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub disease_value: Option<f64>,

    /// Measurement unit for the disease, when a metric is attached.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,

    pub recommendations: String,
    pub created_at: String,
}

impl From<Task> for TaskResponse {
    fn from(task: Task) -> Self {
        Self {
            id: task.id,
            user_id: task.user_id,
            task_name: task.name,
            task_time: task.scheduled_at,
            nominee_phone: task.nominee_phone,
            is_complete: task.is_complete,
            disease_name: task.metric.map(|m| m.disease.name().to_string()),
            disease_value: task.metric.map(|m| m.value),
            unit: task.metric.map(|m| m.disease.unit().to_string()),
            recommendations: task.recommendations,
            created_at: task.created_at,
        }
    }
}

/// Credentials submitted by the register and login forms.
#[derive(Debug, Deserialize)]
pub struct CredentialsForm {
    pub username: String,
    pub password: String,
}

/// Success body with a human-readable message.
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Error body with a human-readable reason.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Health check response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Service version
    pub version: String,
}

/// Parse a time string: RFC 3339 first, then zone-less forms as UTC.
fn parse_time_string(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(t) = DateTime::parse_from_rfc3339(s) {
        return Some(t.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    None
}
