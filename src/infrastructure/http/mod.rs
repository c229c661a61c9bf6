pub mod request_id;

use axum::{http::Method, middleware, routing::get, Router};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::controllers::{calendar::CalendarController, health};
use crate::infrastructure::config::Config;
use crate::infrastructure::db::DbPool;

pub use request_id::{request_id_middleware, RequestId, X_REQUEST_ID};

/// All routes of the calendar server.
pub fn router(pool: Arc<DbPool>, calendar_controller: Arc<CalendarController>) -> Router {
    let api_routes = Router::new()
        .route("/api/events", get(CalendarController::list_events))
        .with_state(calendar_controller.clone())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET]),
        );

    let page_routes = Router::new()
        .route("/", get(CalendarController::calendar_page))
        .with_state(calendar_controller);

    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::health_ready))
        .with_state(pool)
        .merge(api_routes)
        .merge(page_routes)
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
}

pub async fn start_http_server(
    config: &Config,
    pool: Arc<DbPool>,
    calendar_controller: Arc<CalendarController>,
) -> Result<(), Box<dyn std::error::Error>> {
    let app = router(pool, calendar_controller);

    let listener =
        tokio::net::TcpListener::bind(format!("{}:{}", config.host, config.port)).await?;

    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
