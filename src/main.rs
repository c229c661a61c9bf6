use anyhow::Context;
use chrono::Utc;
use std::process::ExitCode;
use std::sync::Arc;

use tpl_event_monitor::domain::digest::DigestComposer;
use tpl_event_monitor::domain::feed::Paginator;
use tpl_event_monitor::domain::reconciliation::Pruner;
use tpl_event_monitor::domain::run::{RunOrchestrator, RunReport};
use tpl_event_monitor::infrastructure::config::Config;
use tpl_event_monitor::infrastructure::db::{check_connection, create_pool, run_migrations};
use tpl_event_monitor::infrastructure::diagnostics::public_ip;
use tpl_event_monitor::infrastructure::fetcher::{FetchError, HttpFeedFetcher};
use tpl_event_monitor::infrastructure::logging::init_logging;
use tpl_event_monitor::infrastructure::notifier::{
    ErrorReport, Notification, Notifier, SmtpNotifier,
};
use tpl_event_monitor::infrastructure::repositories::{EventRepository, PgEventRepository};

const MAX_DB_CONNECTIONS: u32 = 5;

#[tokio::main]
async fn main() -> ExitCode {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    init_logging(&config);

    match run(&config).await {
        Ok(report) => {
            if !report.failed_feeds.is_empty() {
                tracing::warn!(failed = ?report.failed_feeds, "Some feeds could not be reconciled");
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = ?e, "Run failed");
            send_error_report(&config, &e).await;
            ExitCode::FAILURE
        }
    }
}

async fn run(config: &Config) -> anyhow::Result<RunReport> {
    tracing::info!(
        environment = %config.environment,
        key_mode = %config.key_mode,
        "Starting TPL event monitor run"
    );

    let feeds = config.load_feeds()?;
    let notifier: Arc<dyn Notifier> = Arc::new(SmtpNotifier::new(&config.smtp)?);

    let pool = create_pool(&config.database_url, MAX_DB_CONNECTIONS)
        .await
        .context("could not connect to the database")?;
    check_connection(&pool).await?;
    run_migrations(&pool).await?;
    tracing::info!("Database ready");

    let pool = Arc::new(pool);
    let repo: Arc<dyn EventRepository> =
        Arc::new(PgEventRepository::new(pool.clone(), config.key_mode));
    let fetcher = Arc::new(HttpFeedFetcher::new(config.fetch_timeout)?);

    let orchestrator = RunOrchestrator::new(
        feeds,
        repo.clone(),
        Paginator::new(fetcher),
        Pruner::new(repo, config.retention_days),
        DigestComposer::new(config.subject_style, config.subject_prefix.clone()),
        notifier,
    );

    Ok(orchestrator.run().await?)
}

async fn send_error_report(config: &Config, error: &anyhow::Error) {
    let (http_status, url) = http_context(error);

    let report = ErrorReport {
        message: format!("{:#}", error),
        occurred_at: Utc::now(),
        environment: config.environment.to_string(),
        http_status,
        url,
        public_ip: public_ip().await,
    };

    let notifier = match SmtpNotifier::new(&config.smtp) {
        Ok(notifier) => notifier,
        Err(e) => {
            tracing::error!(error = %e, "Cannot send error report");
            return;
        }
    };

    if let Err(e) = notifier.send(&Notification::Failure(report)).await {
        tracing::error!(error = %e, "Failed to send error report");
    }
}

/// HTTP status and URL from the first HTTP error in the chain.
fn http_context(error: &anyhow::Error) -> (Option<String>, Option<String>) {
    for cause in error.chain() {
        if let Some(fetch) = cause.downcast_ref::<FetchError>() {
            let status = fetch.status.map(|code| match &fetch.status_text {
                Some(text) => format!("{} {}", code, text),
                None => code.to_string(),
            });
            return (status, Some(fetch.url.clone()));
        }
        if let Some(http) = cause.downcast_ref::<reqwest::Error>() {
            return (
                http.status().map(|s| s.to_string()),
                http.url().map(|u| u.to_string()),
            );
        }
    }
    (None, None)
}
