use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, put}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/subjects/:subject/logs", put(handlers::put_log))
        .route("/api/subjects/:subject/today", get(handlers::get_today))
        .route("/api/subjects/:subject/chart", get(handlers::get_chart))
        .route("/api/subjects/:subject/calendar", get(handlers::get_calendar))
        .route("/api/subjects/:subject/trends", get(handlers::get_trends))
        .route("/api/admin/stats", get(handlers::get_admin_stats))
        .route("/api/severity", get(handlers::get_severity))
        .with_state(state)
}
