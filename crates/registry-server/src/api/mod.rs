//! HTTP API: маршрутизация и состояние приложения.

pub mod form;
pub mod middleware;
pub mod response;
pub mod server_routes;

use crate::config::BasicCredentials;
use axum::extract::State;
use axum::routing::get;
use axum::Router;
use response::JsonResponse;
use sea_orm::{ConnectionTrait, DatabaseConnection};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Общее состояние приложения. Неизменяемо после старта.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub auth: Arc<BasicCredentials>,
}

impl AppState {
    pub fn new(db: DatabaseConnection, auth: BasicCredentials) -> Self {
        Self {
            db,
            auth: Arc::new(auth),
        }
    }
}

/// Построить маршрутизатор Axum.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .merge(server_routes::routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /health — проверка работоспособности сервиса.
async fn health_check(State(state): State<AppState>) -> JsonResponse<serde_json::Value> {
    let db_ok = state.db.execute_unprepared("SELECT 1").await.is_ok();
    JsonResponse::ok(serde_json::json!({
        "status": if db_ok { "ok" } else { "error" },
        "database": db_ok,
        "service": "registry-server"
    }))
}
