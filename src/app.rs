use crate::gate::require_access;
use crate::handlers;
use crate::state::AppState;
use axum::{
    Router, middleware,
    routing::{get, post},
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/analytics", get(handlers::analytics_page))
        .route("/api/planner", get(handlers::get_planner))
        .route("/api/planner/edit", post(handlers::edit_planner))
        .route("/api/planner/save", post(handlers::save_planner))
        .route("/api/planner/autosave", post(handlers::set_autosave))
        .route("/api/planner/copy-previous", post(handlers::copy_previous))
        .route("/api/history", get(handlers::get_history))
        .route(
            "/api/recurring",
            get(handlers::list_recurring).post(handlers::add_recurring),
        )
        .route("/api/recurring/remove", post(handlers::remove_recurring))
        .route("/api/recurring/today", post(handlers::add_recurring_to_today))
        .route("/api/analytics", get(handlers::get_analytics))
        .route("/api/login", post(handlers::login))
        .layer(middleware::from_fn_with_state(state.clone(), require_access))
        .with_state(state)
}
