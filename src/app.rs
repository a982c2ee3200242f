use crate::handlers;
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Base64 screenshots easily exceed axum's 2 MB default.
pub const BODY_LIMIT: usize = 10 * 1024 * 1024;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/health", get(handlers::health))
        .route(
            "/api/events",
            get(handlers::list_events)
                .post(handlers::create_event)
                .delete(handlers::clear_events),
        )
        .route("/api/events/:id", delete(handlers::delete_event))
        .route("/api/stats", get(handlers::get_stats))
        .route("/api/calendar", get(handlers::get_calendar))
        .route("/api/calendar/toggle", post(handlers::toggle_calendar))
        .route("/api/calendar/date/:date", get(handlers::date_events))
        .route(
            "/api/settings",
            get(handlers::get_settings).put(handlers::update_settings),
        )
        .route("/api/extract-text", post(handlers::extract_text))
        .route("/api/solve-problem", post(handlers::solve_problem))
        .route("/api/cart", get(handlers::get_cart).post(handlers::add_to_cart))
        .route("/api/cart/:id", delete(handlers::remove_cart_item))
        .route("/api/cart/:id/toggle", post(handlers::toggle_cart_item))
        .route("/api/checkout", post(handlers::checkout))
        .route("/api/chat", post(handlers::chat))
        .route("/api/chat/clear", post(handlers::clear_chat))
        .route("/api/archive/:session_id", get(handlers::archive))
        .route("/api/stats/:session_id", get(handlers::session_stats))
        .route("/api/profile/:session_id", get(handlers::profile))
        .route("/api/google-sheets-webhook", post(handlers::sheets_webhook))
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
