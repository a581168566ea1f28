use std::{net::SocketAddr, sync::Arc};

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::calculations::CriticalPathAnalysis;
use crate::dates;
use crate::error::{PlanError, TreeError};
use crate::persistence;
use crate::plan::{Plan, PlanDocument};
use crate::registration::{RegistrationPayload, RegistrationSettings};
use crate::task::{ChildSide, Edge, TaskNode};

#[derive(Clone)]
pub struct AppState {
    plan: Arc<RwLock<Plan>>,
    settings: Arc<RwLock<RegistrationSettings>>,
}

impl AppState {
    pub fn new(plan: Plan, settings: RegistrationSettings) -> Self {
        Self {
            plan: Arc::new(RwLock::new(plan)),
            settings: Arc::new(RwLock::new(settings)),
        }
    }

    pub fn with_shared(plan: Arc<RwLock<Plan>>, settings: Arc<RwLock<RegistrationSettings>>) -> Self {
        Self { plan, settings }
    }

    fn plan(&self) -> Arc<RwLock<Plan>> {
        self.plan.clone()
    }

    fn settings(&self) -> Arc<RwLock<RegistrationSettings>> {
        self.settings.clone()
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

#[derive(Debug)]
enum ApiError {
    NotFound(String),
    Conflict(String),
    Invalid(String),
    Internal(String),
}

impl ApiError {
    fn invalid(message: impl Into<String>) -> Self {
        ApiError::Invalid(message.into())
    }

    fn internal(message: impl Into<String>) -> Self {
        ApiError::Internal(message.into())
    }
}

impl From<PlanError> for ApiError {
    fn from(value: PlanError) -> Self {
        let message = value.to_string();
        match value {
            PlanError::Tree(TreeError::UnknownTask(_)) | PlanError::UnknownEdge(_) => {
                ApiError::NotFound(message)
            }
            PlanError::Tree(TreeError::DuplicateId(_))
            | PlanError::DuplicateEdge { .. }
            | PlanError::NothingToRegister => ApiError::Conflict(message),
            PlanError::Tree(TreeError::RootImmutable(_))
            | PlanError::Tree(TreeError::MoveIntoSubtree { .. })
            | PlanError::SelfLoop(_)
            | PlanError::UnknownEndpoint(_) => ApiError::Invalid(message),
        }
    }
}

impl From<persistence::PersistenceError> for ApiError {
    fn from(value: persistence::PersistenceError) -> Self {
        match value {
            persistence::PersistenceError::InvalidData(message) => ApiError::Invalid(message),
            other => ApiError::internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, "not_found", message),
            ApiError::Conflict(message) => (StatusCode::CONFLICT, "conflict", message),
            ApiError::Invalid(message) => (StatusCode::BAD_REQUEST, "invalid_request", message),
            ApiError::Internal(message) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", message)
            }
        };
        (status, Json(ErrorBody { error, message })).into_response()
    }
}

#[derive(Debug, Deserialize)]
struct CreateTaskPayload {
    parent_id: String,
    text: String,
    #[serde(default)]
    side: Option<ChildSide>,
    #[serde(default)]
    effort: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct MoveTaskPayload {
    new_parent_id: String,
}

#[derive(Debug, Deserialize)]
struct CreateEdgePayload {
    from_id: String,
    to_id: String,
}

#[derive(Debug, Default, Deserialize)]
struct SchedulePayload {
    #[serde(default)]
    today: Option<String>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/plan", get(get_plan).put(replace_plan))
        .route("/plan/nodes", post(create_task))
        .route("/plan/nodes/:id", delete(delete_task))
        .route("/plan/nodes/:id/move", post(move_task))
        .route("/plan/nodes/:id/detach", post(detach_task))
        .route("/plan/edges", post(create_edge))
        .route("/plan/edges/:id", delete(delete_edge))
        .route("/schedule", post(run_schedule))
        .route("/critical-path", get(critical_path))
        .route("/settings", get(get_settings).put(update_settings))
        .route("/registration-payload", get(registration_payload))
        .with_state(state)
}

pub async fn serve(
    addr: SocketAddr,
    plan: Plan,
    settings: RegistrationSettings,
) -> std::io::Result<()> {
    let state = AppState::new(plan, settings);
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn get_plan(State(state): State<AppState>) -> Json<PlanDocument> {
    let plan = state.plan();
    let document = {
        let guard = plan.read();
        guard.to_document()
    };
    Json(document)
}

async fn replace_plan(
    State(state): State<AppState>,
    Json(document): Json<PlanDocument>,
) -> Result<Json<PlanDocument>, ApiError> {
    persistence::validate_document(&document)?;
    let plan = state.plan();
    let current = {
        let mut guard = plan.write();
        *guard = Plan::from_document(&document);
        guard.to_document()
    };
    Ok(Json(current))
}

async fn create_task(
    State(state): State<AppState>,
    Json(payload): Json<CreateTaskPayload>,
) -> Result<(StatusCode, Json<TaskNode>), ApiError> {
    if payload.effort.is_some_and(|effort| !effort.is_finite() || effort < 0.0) {
        return Err(ApiError::invalid("effort must be a non-negative number"));
    }
    let plan = state.plan();
    let created = {
        let mut guard = plan.write();
        let id = guard.add_task(&payload.parent_id, payload.text, payload.side)?;
        guard.update_task(&id, |task| task.effort = payload.effort)?;
        guard
            .task(&id)
            .cloned()
            .ok_or_else(|| ApiError::internal("task not found after creation"))?
    };
    Ok((StatusCode::CREATED, Json(TaskNode::from_task(created, Vec::new()))))
}

async fn delete_task(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let plan = state.plan();
    let removed = {
        let mut guard = plan.write();
        guard.delete_task(&task_id)?
    };
    Ok(Json(json!({ "removed": removed })))
}

async fn move_task(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
    Json(payload): Json<MoveTaskPayload>,
) -> Result<StatusCode, ApiError> {
    let plan = state.plan();
    {
        let mut guard = plan.write();
        guard.move_task(&task_id, &payload.new_parent_id)?;
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn detach_task(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let plan = state.plan();
    {
        let mut guard = plan.write();
        guard.detach_task(&task_id)?;
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn create_edge(
    State(state): State<AppState>,
    Json(payload): Json<CreateEdgePayload>,
) -> Result<(StatusCode, Json<Edge>), ApiError> {
    let plan = state.plan();
    let created = {
        let mut guard = plan.write();
        let id = guard.add_edge(&payload.from_id, &payload.to_id)?;
        guard
            .edge(&id)
            .cloned()
            .ok_or_else(|| ApiError::internal("edge not found after creation"))?
    };
    Ok((StatusCode::CREATED, Json(created)))
}

async fn delete_edge(
    State(state): State<AppState>,
    Path(edge_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let plan = state.plan();
    {
        let mut guard = plan.write();
        guard.remove_edge(&edge_id)?;
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn run_schedule(
    State(state): State<AppState>,
    payload: Option<Json<SchedulePayload>>,
) -> Result<Json<PlanDocument>, ApiError> {
    let payload = payload.map(|Json(inner)| inner).unwrap_or_default();
    let today = match payload.today.as_deref() {
        Some(raw) => dates::parse_date(raw)
            .ok_or_else(|| ApiError::invalid(format!("invalid date '{raw}'")))?,
        None => dates::today(),
    };
    let plan = state.plan();
    let document = {
        let mut guard = plan.write();
        guard.apply_schedule(today);
        guard.to_document()
    };
    Ok(Json(document))
}

async fn critical_path(State(state): State<AppState>) -> Json<CriticalPathAnalysis> {
    let plan = state.plan();
    let analysis = {
        let guard = plan.read();
        guard.critical_path()
    };
    Json(analysis)
}

async fn get_settings(State(state): State<AppState>) -> Json<RegistrationSettings> {
    let settings = state.settings();
    let current = settings.read().clone();
    Json(current)
}

async fn update_settings(
    State(state): State<AppState>,
    Json(next): Json<RegistrationSettings>,
) -> Json<RegistrationSettings> {
    let settings = state.settings();
    {
        let mut guard = settings.write();
        *guard = next.clone();
    }
    Json(next)
}

async fn registration_payload(
    State(state): State<AppState>,
) -> Result<Json<RegistrationPayload>, ApiError> {
    let settings = state.settings().read().clone();
    let plan = state.plan();
    let payload = {
        let guard = plan.read();
        guard.registration_payload(&settings)?
    };
    Ok(Json(payload))
}
