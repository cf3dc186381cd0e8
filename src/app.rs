use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

use crate::api::{self, METHOD_NOT_ALLOWED, MessageBody, RESET_OK};
use crate::cell::{Cell, CellRecord, CellUpdate};
use crate::config::ServerConfig;
use crate::error::StoreError;
use crate::grid::DenseGrid;
use crate::store::{GridStore, TableStore};
use crate::view::{self, ActiveColor};

/// Shared state of the HTTP handlers. The store is owned by whoever builds
/// the router and only reached through this handle.
#[derive(Clone)]
pub struct AppState {
    store: Arc<dyn GridStore>,
    grid_size: usize,
    active_color: ActiveColor,
}

impl AppState {
    pub fn new(store: Arc<dyn GridStore>, grid_size: usize, active_color: ActiveColor) -> Self {
        AppState {
            store,
            grid_size,
            active_color,
        }
    }
}

/// Error reply: a status code with a `{ "message": ... }` body.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        ApiError {
            status,
            message: message.into(),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::new(rejection.status(), rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(MessageBody::new(self.message))).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(serve_grid))
        .route("/api/cells", get(list_cells).fallback(method_not_allowed))
        .route("/api/update", post(update_cell).fallback(method_not_allowed))
        .route("/api/reset", post(reset_cells).fallback(method_not_allowed))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn run(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let store: Arc<dyn GridStore> = match &config.data_file {
        Some(path) => Arc::new(TableStore::open(path)?),
        None => Arc::new(TableStore::in_memory()),
    };
    let app = router(AppState::new(store, config.grid_size, config.active_color));

    let listener = TcpListener::bind(&config.addr).await?;
    log::info!(
        "Serving a {}x{} grid on http://{}",
        config.grid_size,
        config.grid_size,
        listener.local_addr()?
    );
    axum::serve(listener, app).await?;

    Ok(())
}

async fn serve_grid(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    let cells: Vec<Cell> = state.store.list_all()?.iter().map(CellRecord::cell).collect();
    let grid = DenseGrid::from_sparse(&cells, state.grid_size);
    Ok(Html(view::render_page(&grid, &state.active_color)))
}

async fn list_cells(State(state): State<AppState>) -> Result<Json<Vec<CellRecord>>, ApiError> {
    match state.store.list_all() {
        Ok(records) => Ok(Json(records)),
        Err(e) => {
            log::error!("Error fetching cells: {}", e);
            Err(e.into())
        }
    }
}

async fn update_cell(
    State(state): State<AppState>,
    payload: Result<Json<CellUpdate>, JsonRejection>,
) -> Result<Json<CellUpdate>, ApiError> {
    let Json(payload) = payload.map_err(|rejection| {
        log::warn!("Rejected update body: {}", rejection.body_text());
        ApiError::from(rejection)
    })?;
    if !payload.key().in_bounds(state.grid_size) {
        return Err(ApiError::new(
            StatusCode::BAD_REQUEST,
            format!(
                "Cell ({}, {}) is outside the {}x{} grid",
                payload.row, payload.column, state.grid_size, state.grid_size
            ),
        ));
    }
    match api::apply_update(state.store.as_ref(), &payload) {
        Ok(echo) => Ok(Json(echo)),
        Err(e) => {
            log::error!("Error updating cell: {}", e);
            Err(e.into())
        }
    }
}

async fn reset_cells(State(state): State<AppState>) -> Result<Json<MessageBody>, ApiError> {
    match state.store.reset_all() {
        Ok(()) => Ok(Json(MessageBody::new(RESET_OK))),
        Err(e) => {
            log::error!("Error resetting cells: {}", e);
            Err(e.into())
        }
    }
}

async fn method_not_allowed() -> ApiError {
    ApiError::new(StatusCode::METHOD_NOT_ALLOWED, METHOD_NOT_ALLOWED)
}
