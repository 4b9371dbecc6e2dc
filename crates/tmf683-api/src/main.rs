//! TMF683 Party Interaction API server entry point.

use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use tracing::{error, info, warn};

use tmf683_api::config::ServiceConfig;
use tmf683_api::error::AppError;
use tmf683_api::state::AppState;
use tmf683_api::telemetry::Telemetry;
use tmf683_core::clock::{Clock, SystemClock};
use tmf683_core::event_log::EventLogStore;
use tmf683_core::id::{IdGenerator, UuidIdGenerator};
use tmf683_event_bus::DomainEventBus;
use tmf683_party_interaction::application::listeners::register_event_listeners;
use tmf683_party_interaction::domain::repository::PartyInteractionRepository;
use tmf683_store::{
    InMemoryEventLog, InMemoryPartyInteractionRepository, PgEventLog,
    PgPartyInteractionRepository,
};

type Stores = (Arc<dyn PartyInteractionRepository>, Arc<dyn EventLogStore>);

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let config = ServiceConfig::from_env()?;
    let telemetry = Telemetry::init(config.otlp_endpoint.as_deref())?;

    let result = run(config).await;
    if let Err(e) = &result {
        error!(error = %e, "server stopped with an error");
    }

    telemetry.shutdown();
    result
}

async fn run(config: ServiceConfig) -> Result<(), AppError> {
    info!("Starting TMF683 Party Interaction API server");

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let ids: Arc<dyn IdGenerator> = Arc::new(UuidIdGenerator);
    let (interactions, event_log) = build_stores(&config).await?;

    let event_bus = Arc::new(DomainEventBus::new(
        config.event_bus,
        event_log.clone(),
        clock.clone(),
        ids.clone(),
    ));
    register_event_listeners(&event_bus);

    let app = tmf683_api::router(AppState::new(
        clock,
        ids,
        interactions,
        event_log,
        event_bus.clone(),
    ));

    let addr = config.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    drain_dispatches(&event_bus, config.shutdown_grace).await;
    info!("Server stopped");
    Ok(())
}

async fn build_stores(config: &ServiceConfig) -> Result<Stores, AppError> {
    let Some(database_url) = config.database_url.as_deref() else {
        warn!("DATABASE_URL is not set; party interactions and the event log are kept in memory");
        return Ok((
            Arc::new(InMemoryPartyInteractionRepository::new()),
            Arc::new(InMemoryEventLog::new()),
        ));
    };

    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(database_url)
        .await?;
    sqlx::migrate!("../../migrations").run(&pool).await?;
    info!("Database migrations applied");

    Ok((
        Arc::new(PgPartyInteractionRepository::new(pool.clone())),
        Arc::new(PgEventLog::new(pool)),
    ))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Shutdown signal received");
}

async fn drain_dispatches(event_bus: &DomainEventBus, grace: Duration) {
    let pending = event_bus.pending_dispatches();
    if pending == 0 {
        return;
    }

    info!(pending, "Waiting for in-flight event dispatches");
    if tokio::time::timeout(grace, event_bus.wait_for_dispatches())
        .await
        .is_err()
    {
        warn!(
            pending = event_bus.pending_dispatches(),
            grace = ?grace,
            "Shutdown grace period elapsed with event dispatches still running"
        );
    }
}
