//! HTTP API for the reminder service.
//!
//! ## Endpoints
//!
//! - `GET /` - Redirect to the task page or login
//! - `GET /register`, `POST /register` - Account creation
//! - `GET /login`, `POST /login` - Session login (sets the `token` cookie)
//! - `GET /tasks` - Task dashboard page
//! - `POST /tasks` - Create a task
//! - `GET /api/tasks` - List the caller's tasks
//! - `DELETE /tasks/{id}` - Delete a task
//! - `POST /tasks/{id}/complete` - Complete a task and notify the nominee
//! - `GET /api/health` - Health check

mod accounts;
mod auth;
mod pages;
mod routes;
mod tasks;
pub mod types;

pub use routes::serve;
