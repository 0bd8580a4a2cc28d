use crate::handlers::{pay, register, verify};
use crate::state::AppState;
use axum::{Router, routing::post};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/register", post(register::register))
        .route("/verify", post(verify::verify))
        .route("/pay", post(pay::pay));

    Router::new()
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
