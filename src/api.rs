// Finance Dashboard - REST API with Axum
// Each session id maps to its own store inside the shared registry.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{delete, get, post, put},
    Router,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tower_http::cors::CorsLayer;
use tracing::warn;

use crate::error::StoreError;
use crate::format;
use crate::ledger::AmountTable;
use crate::session::{SessionId, SessionInfo, SessionRegistry};
use crate::snapshot::FinancialSnapshot;
use crate::store::SessionStore;
use crate::summary::Summary;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    sessions: Arc<Mutex<SessionRegistry>>,
    currency: String,
}

impl AppState {
    pub fn new(max_sessions: usize, currency: impl Into<String>) -> Self {
        AppState {
            sessions: Arc::new(Mutex::new(SessionRegistry::new(max_sessions))),
            currency: currency.into(),
        }
    }

    fn registry(&self) -> MutexGuard<'_, SessionRegistry> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// API Response wrapper
#[derive(Serialize)]
pub struct ApiResponse<T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            error: None,
        }
    }

    fn ok_with_message(data: T, message: Option<String>) -> Self {
        Self {
            message,
            ..Self::ok(data)
        }
    }
}

fn failure(status: StatusCode, error: String) -> Response {
    let body: ApiResponse<()> = ApiResponse {
        success: false,
        data: None,
        message: None,
        error: Some(error),
    };
    (status, Json(body)).into_response()
}

fn session_not_found(id: &SessionId) -> Response {
    failure(StatusCode::NOT_FOUND, format!("Session not found: {}", id))
}

fn store_failure(err: StoreError) -> Response {
    warn!("Store rejected request: {}", err);
    let status = match err {
        StoreError::NotInitialized => StatusCode::CONFLICT,
        StoreError::NegativeAmount { .. } | StoreError::Overflow => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
    };
    failure(status, err.to_string())
}

/// Run `op` against the session's store, mapping lookup and store failures
fn with_store<T, F>(state: &AppState, id: &SessionId, op: F) -> Result<T, Response>
where
    F: FnOnce(&mut SessionStore) -> Result<T, StoreError>,
{
    let mut registry = state.registry();
    let store = registry.get_mut(id).ok_or_else(|| session_not_found(id))?;
    op(store).map_err(store_failure)
}

// ============================================================================
// Request / Response types
// ============================================================================

#[derive(Serialize, Deserialize)]
pub struct SessionView {
    pub snapshot: FinancialSnapshot,
    pub summary: Summary,
}

#[derive(Serialize, Deserialize)]
pub struct CreatedSession {
    pub id: SessionId,
}

#[derive(Deserialize)]
pub struct IncomeRequest {
    pub income: Decimal,
}

#[derive(Serialize, Deserialize)]
pub struct Changed {
    pub changed: bool,
}

#[derive(Deserialize)]
pub struct ExpenseRequest {
    pub category: String,
    pub amount: Decimal,
}

#[derive(Serialize, Deserialize)]
pub struct ExpenseTotal {
    pub category: String,
    pub total: Option<Decimal>,
}

#[derive(Deserialize)]
pub struct CategoryRequest {
    pub name: String,
}

#[derive(Deserialize)]
pub struct DebtRequest {
    pub name: String,
    #[serde(default)]
    pub amount: Option<Decimal>,
}

#[derive(Deserialize)]
pub struct DebtTableRequest {
    pub debts: AmountTable,
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// POST /api/sessions - Open a session seeded with defaults
async fn create_session(State(state): State<AppState>) -> Response {
    let id = state.registry().create();
    (StatusCode::CREATED, Json(ApiResponse::ok(CreatedSession { id }))).into_response()
}

/// GET /api/sessions - List live sessions
async fn list_sessions(State(state): State<AppState>) -> Response {
    let sessions: Vec<SessionInfo> = state.registry().list();
    Json(ApiResponse::ok(sessions)).into_response()
}

/// GET /api/sessions/:id - Snapshot with derived summary
async fn get_session(State(state): State<AppState>, Path(id): Path<SessionId>) -> Response {
    let view = with_store(&state, &id, |store| {
        Ok(SessionView {
            snapshot: store.snapshot()?.clone(),
            summary: store.compute_summary()?,
        })
    });
    match view {
        Ok(view) => Json(ApiResponse::ok(view)).into_response(),
        Err(response) => response,
    }
}

/// DELETE /api/sessions/:id - End a session
async fn end_session(State(state): State<AppState>, Path(id): Path<SessionId>) -> Response {
    if state.registry().end(&id) {
        Json(ApiResponse::ok(Changed { changed: true })).into_response()
    } else {
        session_not_found(&id)
    }
}

/// PUT /api/sessions/:id/income
async fn set_income(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
    Json(request): Json<IncomeRequest>,
) -> Response {
    match with_store(&state, &id, |store| store.set_income(request.income)) {
        Ok(changed) => {
            let message = changed.then(format::income_updated);
            Json(ApiResponse::ok_with_message(Changed { changed }, message)).into_response()
        }
        Err(response) => response,
    }
}

/// POST /api/sessions/:id/expenses
async fn add_expense(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
    Json(request): Json<ExpenseRequest>,
) -> Response {
    let result = with_store(&state, &id, |store| {
        store.add_or_increment_expense(&request.category, request.amount)
    });
    match result {
        Ok(total) => {
            let message = total
                .map(|_| format::expense_added(&state.currency, &request.category, request.amount));
            let body = ExpenseTotal {
                category: request.category,
                total,
            };
            Json(ApiResponse::ok_with_message(body, message)).into_response()
        }
        Err(response) => response,
    }
}

/// POST /api/sessions/:id/categories
async fn register_category(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
    Json(request): Json<CategoryRequest>,
) -> Response {
    match with_store(&state, &id, |store| store.register_category(&request.name)) {
        Ok(changed) => {
            let message = changed.then(|| format::category_added(&request.name));
            Json(ApiResponse::ok_with_message(Changed { changed }, message)).into_response()
        }
        Err(response) => response,
    }
}

/// POST /api/sessions/:id/debts - Add or overwrite one debt
async fn add_debt(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
    Json(request): Json<DebtRequest>,
) -> Response {
    match with_store(&state, &id, |store| store.add_debt(&request.name, request.amount)) {
        Ok(changed) => {
            let message = match (changed, request.amount) {
                (true, Some(amount)) => Some(format::debt_added(&state.currency, &request.name, amount)),
                _ => None,
            };
            Json(ApiResponse::ok_with_message(Changed { changed }, message)).into_response()
        }
        Err(response) => response,
    }
}

/// PUT /api/sessions/:id/debts - Replace the whole debt table
async fn upsert_debts(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
    Json(request): Json<DebtTableRequest>,
) -> Response {
    match with_store(&state, &id, |store| store.upsert_debts(request.debts)) {
        Ok(changed) => Json(ApiResponse::ok(Changed { changed })).into_response(),
        Err(response) => response,
    }
}

/// DELETE /api/sessions/:id/debts/:name - Remove one debt row
async fn remove_debt(
    State(state): State<AppState>,
    Path((id, name)): Path<(SessionId, String)>,
) -> Response {
    // Path has already percent-decoded the segment
    match with_store(&state, &id, |store| store.remove_debt(&name)) {
        Ok(changed) => Json(ApiResponse::ok(Changed { changed })).into_response(),
        Err(response) => response,
    }
}

/// GET /api/sessions/:id/summary
async fn get_summary(State(state): State<AppState>, Path(id): Path<SessionId>) -> Response {
    match with_store(&state, &id, |store| store.compute_summary()) {
        Ok(summary) => Json(ApiResponse::ok(summary)).into_response(),
        Err(response) => response,
    }
}

/// GET /api/sessions/:id/charts - Series for the overview, spending and distribution charts
async fn get_charts(State(state): State<AppState>, Path(id): Path<SessionId>) -> Response {
    match with_store(&state, &id, |store| store.chart_data()) {
        Ok(charts) => Json(ApiResponse::ok(charts)).into_response(),
        Err(response) => response,
    }
}

// ============================================================================
// Router
// ============================================================================

pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/sessions", post(create_session).get(list_sessions))
        .route("/sessions/:id", get(get_session).delete(end_session))
        .route("/sessions/:id/income", put(set_income))
        .route("/sessions/:id/expenses", post(add_expense))
        .route("/sessions/:id/categories", post(register_category))
        .route("/sessions/:id/debts", post(add_debt).put(upsert_debts))
        .route("/sessions/:id/debts/:name", delete(remove_debt))
        .route("/sessions/:id/summary", get(get_summary))
        .route("/sessions/:id/charts", get(get_charts))
        .with_state(state);

    Router::new()
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive())
}
