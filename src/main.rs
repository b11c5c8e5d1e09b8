mod model;
mod server;

use std::{net::SocketAddr, sync::Arc};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::server::{
    config::Config, error::AppError, realtime::RealtimeHub, router,
    scheduler::maintenance, service::delivery::DeliveryService, startup, state::AppState,
};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fieldops=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Arc::new(Config::from_env()?);

    let db = startup::connect_to_database(&config).await?;
    let session = startup::connect_to_session(&db, &config).await?;
    let http_client = startup::setup_reqwest_client()?;

    tokio::fs::create_dir_all(&config.upload_dir).await?;

    let state = AppState::new(
        db,
        RealtimeHub::new(),
        DeliveryService::from_config(http_client, &config),
        config.clone(),
    );

    // The scheduler shares the realtime hub so job events reach connected clients
    let scheduler_state = state.clone();
    tokio::spawn(async move {
        if let Err(e) = maintenance::start_scheduler(scheduler_state).await {
            tracing::error!("Maintenance scheduler error: {}", e);
        }
    });

    let app = router::router(&config)?.with_state(state).layer(session);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!("Listening on {}", config.bind_addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
