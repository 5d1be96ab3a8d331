//! In-memory stand-in for the todo REST resource.
//!
//! Serves the same routes and error envelope a real deployment would, so
//! the client crates can be exercised end-to-end without a database.

pub mod error;

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{debug, info};
use uuid::Uuid;

pub use error::{AppError, ErrorResponse};

pub const DEFAULT_LIMIT: usize = 20;
pub const MAX_LIMIT: usize = 100;
const TITLE_MAX_CHARS: usize = 255;
const DESCRIPTION_MAX_CHARS: usize = 1000;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Todo {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Todo {
    /// Bumps `updated_at`, strictly past its previous value even when the
    /// clock has not advanced.
    fn touch(&mut self) {
        let now = Utc::now();
        self.updated_at = if now > self.updated_at {
            now
        } else {
            self.updated_at + TimeDelta::microseconds(1)
        };
    }
}

#[derive(Deserialize)]
pub struct CreateTodo {
    #[serde(default)]
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub completed: bool,
}

#[derive(Deserialize)]
pub struct UpdateTodo {
    pub title: Option<String>,
    pub description: Option<String>,
    pub completed: Option<bool>,
}

#[derive(Deserialize)]
pub struct ToggleCompletion {
    pub completed: bool,
}

/// Raw query parameters. Values that do not parse fall back to defaults
/// instead of failing the request.
#[derive(Deserialize)]
pub struct ListQuery {
    pub completed: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TodosResponse {
    pub todos: Vec<Todo>,
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Health {
    pub status: String,
    pub timestamp: String,
}

pub type Db = Arc<RwLock<HashMap<Uuid, Todo>>>;

/// Router over an empty store. Clones of the returned router share it.
pub fn app() -> Router {
    app_with_db(Db::default())
}

pub fn app_with_db(db: Db) -> Router {
    Router::new()
        .route("/todos", get(list_todos).post(create_todo))
        .route("/todos/{id}", get(get_todo).put(update_todo).delete(delete_todo))
        .route("/todos/{id}/complete", patch(toggle_completion))
        .route("/health", get(health))
        .with_state(db)
}

/// Store prefilled with a couple of sample todos.
pub fn sample_db() -> Db {
    let now = Utc::now();
    let samples = [
        ("Learn Go", "Complete the Go tutorial and build a sample API"),
        ("Build React App", "Create a React frontend for the todo application"),
    ];
    let todos = samples
        .into_iter()
        .map(|(title, description)| {
            let todo = Todo {
                id: Uuid::new_v4(),
                title: title.to_string(),
                description: Some(description.to_string()),
                completed: false,
                created_at: now,
                updated_at: now,
            };
            (todo.id, todo)
        })
        .collect();
    Arc::new(RwLock::new(todos))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

pub async fn run_with_db(listener: TcpListener, db: Db) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with_db(db)).await
}

fn validate_title(title: &str) -> Result<(), AppError> {
    let len = title.chars().count();
    if len == 0 {
        return Err(AppError::Validation("Title is required".to_string()));
    }
    if len > TITLE_MAX_CHARS {
        return Err(AppError::Validation(format!(
            "Title must be at most {TITLE_MAX_CHARS} characters"
        )));
    }
    Ok(())
}

fn validate_description(description: Option<&str>) -> Result<(), AppError> {
    if description.is_some_and(|d| d.chars().count() > DESCRIPTION_MAX_CHARS) {
        return Err(AppError::Validation(format!(
            "Description must be at most {DESCRIPTION_MAX_CHARS} characters"
        )));
    }
    Ok(())
}

fn parse_limit(raw: Option<&str>) -> usize {
    raw.and_then(|l| l.parse::<usize>().ok())
        .filter(|l| (1..=MAX_LIMIT).contains(l))
        .unwrap_or(DEFAULT_LIMIT)
}

async fn list_todos(State(db): State<Db>, Query(query): Query<ListQuery>) -> Json<TodosResponse> {
    let limit = parse_limit(query.limit.as_deref());
    let offset = query
        .offset
        .as_deref()
        .and_then(|o| o.parse::<usize>().ok())
        .unwrap_or(0);
    let completed = query.completed.as_deref().and_then(|c| c.parse::<bool>().ok());

    let todos = db.read().await;
    let mut matching: Vec<Todo> = todos
        .values()
        .filter(|t| completed.map_or(true, |c| t.completed == c))
        .cloned()
        .collect();
    matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));

    let total = matching.len();
    let page = matching.into_iter().skip(offset).take(limit).collect();
    debug!(total, limit, offset, ?completed, "listed todos");

    Json(TodosResponse {
        todos: page,
        total,
        limit,
        offset,
    })
}

async fn create_todo(
    State(db): State<Db>,
    payload: Result<Json<CreateTodo>, JsonRejection>,
) -> Result<(StatusCode, Json<Todo>), AppError> {
    let Json(input) = payload.map_err(|_| AppError::InvalidJson)?;
    validate_title(&input.title)?;
    validate_description(input.description.as_deref())?;

    let now = Utc::now();
    let todo = Todo {
        id: Uuid::new_v4(),
        title: input.title,
        description: input.description,
        completed: input.completed,
        created_at: now,
        updated_at: now,
    };
    db.write().await.insert(todo.id, todo.clone());
    info!(id = %todo.id, "created todo");
    Ok((StatusCode::CREATED, Json(todo)))
}

async fn get_todo(State(db): State<Db>, Path(id): Path<Uuid>) -> Result<Json<Todo>, AppError> {
    let todos = db.read().await;
    todos.get(&id).cloned().map(Json).ok_or(AppError::NotFound)
}

async fn update_todo(
    State(db): State<Db>,
    Path(id): Path<Uuid>,
    payload: Result<Json<UpdateTodo>, JsonRejection>,
) -> Result<Json<Todo>, AppError> {
    let Json(input) = payload.map_err(|_| AppError::InvalidJson)?;
    if let Some(title) = &input.title {
        validate_title(title)?;
    }
    validate_description(input.description.as_deref())?;

    let mut todos = db.write().await;
    let todo = todos.get_mut(&id).ok_or(AppError::NotFound)?;
    if let Some(title) = input.title {
        todo.title = title;
    }
    if let Some(description) = input.description {
        todo.description = Some(description);
    }
    if let Some(completed) = input.completed {
        todo.completed = completed;
    }
    todo.touch();
    info!(%id, "updated todo");
    Ok(Json(todo.clone()))
}

async fn toggle_completion(
    State(db): State<Db>,
    Path(id): Path<Uuid>,
    payload: Result<Json<ToggleCompletion>, JsonRejection>,
) -> Result<Json<Todo>, AppError> {
    let Json(input) = payload.map_err(|_| AppError::InvalidJson)?;
    let mut todos = db.write().await;
    let todo = todos.get_mut(&id).ok_or(AppError::NotFound)?;
    todo.completed = input.completed;
    todo.touch();
    info!(%id, completed = input.completed, "set completion");
    Ok(Json(todo.clone()))
}

async fn delete_todo(State(db): State<Db>, Path(id): Path<Uuid>) -> Result<StatusCode, AppError> {
    let mut todos = db.write().await;
    todos.remove(&id).ok_or(AppError::NotFound)?;
    info!(%id, "deleted todo");
    Ok(StatusCode::NO_CONTENT)
}

async fn health() -> Json<Health> {
    Json(Health {
        status: "ok".to_string(),
        timestamp: Utc::now().to_rfc3339(),
    })
}
