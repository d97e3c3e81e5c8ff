pub mod cookie;
pub mod middleware;
pub mod protocol;
pub mod rest;
pub mod state;

pub use middleware::attach_session;
pub use rest::{guess_handler, health_handler, scores_handler, start_handler};

use crate::error::ApiError;
use axum::{
    http::{
        header::{ACCEPT, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use rest::ApiDoc;
use state::AppState;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Builds the complete application router around the shared state.
pub fn router(app_state: Arc<AppState>) -> Result<Router, ApiError> {
    let static_dir = app_state.config.static_dir.clone();

    let game_router = Router::new()
        .route("/start", post(start_handler))
        .route("/guess", post(guess_handler))
        .route("/scores", get(scores_handler))
        .route("/healthz", get(health_handler))
        .route_service("/", ServeFile::new(static_dir.join("index.html")))
        .fallback_service(ServeDir::new(&static_dir))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            attach_session,
        ))
        .with_state(app_state.clone());

    // Merge the game router with the Swagger UI router for a complete application.
    let mut app = Router::new()
        .merge(game_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    if let Some(origin) = &app_state.config.allowed_origin {
        let origin = origin.parse::<HeaderValue>().map_err(|e| {
            ApiError::Internal(format!("Invalid ALLOWED_ORIGIN '{}': {}", origin, e))
        })?;
        let cors = CorsLayer::new()
            .allow_origin(origin)
            .allow_credentials(true)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([CONTENT_TYPE, ACCEPT]);
        app = app.layer(cors);
    }

    Ok(app.layer(TraceLayer::new_for_http()))
}
