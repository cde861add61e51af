use actix_cors::Cors;
use actix_web::{App, HttpServer};
use anyhow::Context;
use std::sync::Arc;
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use feeledger::config::{Config, DatabaseConfig, LogFormat};
use feeledger::middleware::error_handler::configure_extractors;
use feeledger::modules::events::{
    ActivityLogRepository, EventDispatcher, EventPublisher, LogNotifier,
};
use feeledger::modules::{self, gateways, health};
use feeledger::AppServices;

fn init_tracing(level: &str, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("feeledger={},actix_web=info", level)));
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

fn cors(allowed_origin: Option<&str>, production: bool) -> Cors {
    match allowed_origin {
        Some(origin) => Cors::default()
            .allowed_origin(origin)
            .allow_any_method()
            .allow_any_header()
            .max_age(3600),
        None if !production => Cors::permissive(),
        None => Cors::default(),
    }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("Failed to load configuration")?;
    init_tracing(&config.app.log_level, config.app.log_format);
    config.validate().context("Configuration validation failed")?;

    tracing::info!(
        env = %config.app.env,
        institution = %config.app.institution_code,
        "Starting fee ledger"
    );

    let pool = config
        .database
        .create_pool()
        .await
        .context("Failed to create database pool")?;
    DatabaseConfig::migrate(&pool).await?;
    tracing::info!(
        max_connections = config.database.max_connections,
        "Database ready"
    );

    let gateway = gateways::build_gateway(&config.gateway)?;
    tracing::info!(gateway = gateway.name(), "Payment gateway configured");

    let (events, receiver) = EventPublisher::channel();
    EventDispatcher::new(
        ActivityLogRepository::new(pool.clone()),
        Arc::new(LogNotifier),
    )
    .spawn(receiver);

    let services = AppServices::build(pool, &config.app, events, gateway)?;

    let bind_address = config.server.bind_address();
    let allowed_origin = config.server.cors_allowed_origin.clone();
    let production = config.app.is_production();

    tracing::info!(address = %bind_address, "HTTP server listening");
    HttpServer::new(move || {
        App::new()
            .wrap(cors(allowed_origin.as_deref(), production))
            .wrap(TracingLogger::default())
            .configure(|cfg| services.register(cfg))
            .configure(configure_extractors)
            .configure(health::configure)
            .configure(modules::configure)
    })
    .workers(config.server.workers)
    .bind(&bind_address)?
    .run()
    .await?;

    Ok(())
}
