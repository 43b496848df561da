//! # CareMinder
//!
//! Personal health-reminder service with metric classification and SMS
//! nominee alerts.
//!
//! A signed-in user schedules reminder tasks, optionally tagging each one
//! with a health-metric reading (a disease name plus a measured value).
//! Creating a tagged task classifies the reading against per-disease
//! thresholds and stores generated diet/food/lifestyle recommendations.
//! Completing a task texts the configured nominee; the completion commits
//! even when that text cannot be delivered.
//!
//! ## Completion Flow
//!
//! ```text
//!   POST /tasks/{id}/complete
//!            │
//!            ▼
//!   ┌─────────────────┐      ┌────────────────┐
//!   │   TaskService   │─────▶│   TaskStore    │  flag committed first
//!   └────────┬────────┘      └────────────────┘
//!            │
//!            ▼
//!   ┌─────────────────┐      ┌────────────────┐
//!   │   Dispatcher    │─────▶│  Twilio (SMS)  │  outcome is advisory
//!   └─────────────────┘      └────────────────┘
//! ```
//!
//! ## Modules
//! - `api`: HTTP surface (pages, sessions, task endpoints)
//! - `service`: task lifecycle orchestration
//! - `classify`: threshold classification of metric readings
//! - `advice`: static recommendation tables
//! - `notify`: SMS dispatch via Twilio
//! - `store`: task and account storage backends

pub mod advice;
pub mod api;
pub mod classify;
pub mod config;
pub mod notify;
pub mod password;
pub mod service;
pub mod store;

pub use config::Config;
