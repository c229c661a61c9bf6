use std::sync::Arc;

use tpl_event_monitor::controllers::calendar::CalendarController;
use tpl_event_monitor::domain::calendar::CalendarService;
use tpl_event_monitor::infrastructure::config::Config;
use tpl_event_monitor::infrastructure::db::{check_connection, create_pool, run_migrations};
use tpl_event_monitor::infrastructure::http::start_http_server;
use tpl_event_monitor::infrastructure::logging::init_logging;
use tpl_event_monitor::infrastructure::repositories::{EventRepository, PgEventRepository};

const MAX_DB_CONNECTIONS: u32 = 10;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;

    init_logging(&config);

    tracing::info!(
        "Starting TPL calendar server on {}:{}",
        config.host,
        config.port
    );

    let pool = create_pool(&config.database_url, MAX_DB_CONNECTIONS).await?;
    tracing::info!("Database connection pool created");

    check_connection(&pool).await?;
    run_migrations(&pool).await?;
    tracing::info!("Database connection verified");

    let pool = Arc::new(pool);

    let event_repo: Arc<dyn EventRepository> =
        Arc::new(PgEventRepository::new(pool.clone(), config.key_mode));
    let calendar_service = Arc::new(CalendarService::new(event_repo));
    let calendar_controller = Arc::new(CalendarController::new(calendar_service));

    start_http_server(&config, pool, calendar_controller).await?;

    Ok(())
}
