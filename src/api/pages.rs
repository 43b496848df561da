//! Served HTML pages.
//!
//! The UI is a handful of self-contained pages embedded in the binary;
//! there is no asset pipeline. Pages check the session cookie themselves
//! and redirect to `/login`, unlike the JSON API which answers 401.

use axum::{
    extract::State,
    http::HeaderMap,
    response::{Html, IntoResponse, Redirect, Response},
};
use std::sync::Arc;

use super::auth;
use super::routes::AppState;

/// Root: forward to the task list when signed in, else to login.
pub async fn index(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Redirect {
    if auth::authenticate(&headers, &state.config).is_some() {
        Redirect::to("/tasks")
    } else {
        Redirect::to("/login")
    }
}

pub async fn register_page() -> Html<&'static str> {
    Html(REGISTER_PAGE)
}

pub async fn login_page() -> Html<&'static str> {
    Html(LOGIN_PAGE)
}

/// Task dashboard; requires a valid session cookie.
pub async fn tasks_page(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    if auth::authenticate(&headers, &state.config).is_none() {
        return Redirect::to("/login").into_response();
    }
    Html(TASKS_PAGE).into_response()
}

const REGISTER_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <title>Register - CareMinder</title>
</head>
<body>
  <h1>Register</h1>
  <form action="/register" method="POST">
    <label for="username">Username</label>
    <input type="text" id="username" name="username" required>
    <label for="password">Password</label>
    <input type="password" id="password" name="password" required>
    <button type="submit">Register</button>
  </form>
  <p>Already have an account? <a href="/login">Log in</a></p>
</body>
</html>
"#;

const LOGIN_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <title>Log in - CareMinder</title>
</head>
<body>
  <h1>Log in</h1>
  <form action="/login" method="POST">
    <label for="username">Username</label>
    <input type="text" id="username" name="username" required>
    <label for="password">Password</label>
    <input type="password" id="password" name="password" required>
    <button type="submit">Log in</button>
  </form>
  <p>New here? <a href="/register">Register</a></p>
</body>
</html>
"#;

const TASKS_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <title>My Reminders - CareMinder</title>
</head>
<body>
  <h1>Health Reminders</h1>
  <div id="message"></div>
  <form id="reminderForm">
    <input type="text" id="taskName" placeholder="Task name" required>
    <input type="datetime-local" id="taskTime" required>
    <input type="tel" id="nomineePhone" placeholder="Nominee phone" required>
    <select id="diseaseName">
      <option value="">No metric</option>
      <option>Fever</option>
      <option>Blood Pressure</option>
      <option>Glucose</option>
      <option>Hypertension</option>
      <option>Sugar</option>
      <option>Diabetes</option>
    </select>
    <input type="number" id="diseaseValue" step="any" placeholder="Reading">
    <button type="submit">Add reminder</button>
  </form>
  <h2>Upcoming tasks</h2>
  <ul id="upcomingTasksList"></ul>
  <script>
    const form = document.getElementById('reminderForm');
    const list = document.getElementById('upcomingTasksList');
    const message = document.getElementById('message');

    function show(text, ok) {
      message.textContent = text;
      message.style.color = ok ? 'green' : 'red';
    }

    async function loadTasks() {
      const response = await fetch('/api/tasks');
      if (!response.ok) return;
      const tasks = await response.json();
      list.innerHTML = '';
      for (const task of tasks) {
        const item = document.createElement('li');
        const when = new Date(task.taskTime).toLocaleString();
        const metric = task.diseaseName
          ? task.diseaseName + ': ' + task.diseaseValue + ' ' + task.unit
          : 'no metric';
        item.textContent = task.taskName + ' - ' + when + ' - ' + metric
          + (task.isComplete ? ' (done)' : '');
        if (task.recommendations) {
          const pre = document.createElement('pre');
          pre.textContent = task.recommendations;
          item.appendChild(pre);
        }
        const complete = document.createElement('button');
        complete.textContent = 'Complete';
        complete.addEventListener('click', async () => {
          const r = await fetch('/tasks/' + task.id + '/complete', { method: 'POST' });
          show(await r.text(), r.ok);
          loadTasks();
        });
        const del = document.createElement('button');
        del.textContent = 'Delete';
        del.addEventListener('click', async () => {
          const r = await fetch('/tasks/' + task.id, { method: 'DELETE' });
          const body = await r.json();
          show(body.message || body.error, r.ok);
          loadTasks();
        });
        item.appendChild(complete);
        item.appendChild(del);
        list.appendChild(item);
      }
    }

    form.addEventListener('submit', async (event) => {
      event.preventDefault();
      const body = {
        taskName: document.getElementById('taskName').value,
        taskTime: document.getElementById('taskTime').value,
        nomineePhone: document.getElementById('nomineePhone').value,
        diseaseName: document.getElementById('diseaseName').value,
        diseaseValue: document.getElementById('diseaseValue').value,
      };
      const response = await fetch('/tasks', {
        method: 'POST',
        headers: { 'Content-Type': 'application/json' },
        body: JSON.stringify(body),
      });
      if (response.ok) {
        show('Reminder saved!', true);
        form.reset();
      } else {
        show(await response.text(), false);
      }
      loadTasks();
    });

    loadTasks();
  </script>
</body>
</html>
"#;
