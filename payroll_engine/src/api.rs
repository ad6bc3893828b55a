//! HTTP API for the Payroll Engine.
//!
//! This module exposes a minimal REST API around the payroll calculator
//! using the [`axum`](https://crates.io/crates/axum) framework.  Clients
//! can read the configured components, preview a calculation, run a
//! batch payroll, and submit records that are kept in memory for the
//! lifetime of the process.

use crate::components::{default_components, load_components_from_path};
use crate::config::Config;
use crate::draft::PayrollDraft;
use crate::engine::run_payroll;
use crate::models::{
    ManualDeductions, PayPeriod, PayrollComponent, PayrollInput, PayrollRecord, PayrollRunInput,
    PayrollRunResult,
};
use crate::validation::{check_manual_deductions, validate_components, ValidationError};
use anyhow::Result;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{error, info};

/// Application state shared across requests.
pub struct AppState {
    pub components: RwLock<Vec<PayrollComponent>>,
    pub records: RwLock<Vec<PayrollRecord>>,
}

impl AppState {
    pub fn new(components: Vec<PayrollComponent>) -> Arc<AppState> {
        Arc::new(AppState {
            components: RwLock::new(components),
            records: RwLock::new(Vec::new()),
        })
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Internal(err) => {
                error!(error = %err, "request failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let body = Json(serde_json::json!({"error": self.to_string()}));
        (status, body).into_response()
    }
}

/// Body of the calculate and submit endpoints.  When `components` is
/// omitted the server's configured components are used; components
/// sent by the client are validated before use.
#[derive(Debug, Deserialize)]
pub struct PayrollRequest {
    #[serde(default)]
    pub employee_id: Option<String>,
    #[serde(default)]
    pub period: Option<PayPeriod>,
    pub basic_salary: f64,
    #[serde(default)]
    pub manual_deductions: ManualDeductions,
    #[serde(default)]
    pub components: Option<Vec<PayrollComponent>>,
}

impl PayrollRequest {
    async fn into_draft(self, state: &AppState) -> Result<PayrollDraft, ValidationError> {
        let components = match self.components {
            Some(components) => {
                validate_components(&components)?;
                components
            }
            None => state.components.read().await.clone(),
        };
        Ok(PayrollDraft::from_input(PayrollInput {
            employee_id: self.employee_id,
            period: self.period,
            basic_salary: self.basic_salary,
            components,
            manual_deductions: self.manual_deductions,
        }))
    }
}

/// Build the API router around an existing state.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/components", get(list_components_handler))
        .route("/api/payroll/calculate", post(calculate_handler))
        .route("/api/payroll/run", post(run_handler))
        .route("/api/payroll", get(list_records_handler).post(submit_handler))
        .with_state(state)
}

/// Build the API router and initialise components from the configured
/// path, falling back to the standard BPJS set.  Returns the router and
/// a handle to the state.
pub fn build_router(config: &Config) -> Result<(Router, Arc<AppState>)> {
    let components = match &config.components_path {
        Some(path) => load_components_from_path(path)?,
        None => {
            info!("no component path configured, using default BPJS components");
            default_components()
        }
    };
    let state = AppState::new(components);
    Ok((router(state.clone()), state))
}

/// Handler for GET /api/components
async fn list_components_handler(
    State(state): State<Arc<AppState>>,
) -> Json<Vec<PayrollComponent>> {
    Json(state.components.read().await.clone())
}

/// Handler for POST /api/payroll/calculate
async fn calculate_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PayrollRequest>,
) -> Result<Json<PayrollRecord>, ApiError> {
    let draft = request.into_draft(&state).await?;
    let available = draft.available_for_manual_deductions();
    check_manual_deductions(&draft.manual_deductions(), available)?;
    Ok(Json(draft.record()))
}

/// Handler for POST /api/payroll/run
async fn run_handler(
    Json(input): Json<PayrollRunInput>,
) -> Result<Json<PayrollRunResult>, ApiError> {
    let result = tokio::task::spawn_blocking(move || run_payroll(input))
        .await
        .map_err(anyhow::Error::from)??;
    Ok(Json(result))
}

/// Handler for POST /api/payroll
async fn submit_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PayrollRequest>,
) -> Result<(StatusCode, Json<PayrollRecord>), ApiError> {
    let draft = request.into_draft(&state).await?;
    let record = draft.submit()?;
    state.records.write().await.push(record.clone());
    info!(
        employee_id = ?record.employee_id,
        net_salary = record.net_salary,
        "payroll record submitted"
    );
    Ok((StatusCode::CREATED, Json(record)))
}

/// Handler for GET /api/payroll
async fn list_records_handler(State(state): State<Arc<AppState>>) -> Json<Vec<PayrollRecord>> {
    Json(state.records.read().await.clone())
}

/// Launch the API server.  This function builds the router from the
/// given configuration and binds to its address.  It blocks until the
/// server terminates (e.g. when interrupted).
pub async fn serve(config: Config) -> Result<()> {
    let (router, _state) = build_router(&config)?;
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!("Server listening on {}", listener.local_addr()?);
    axum::serve(listener, router).await?;
    Ok(())
}
