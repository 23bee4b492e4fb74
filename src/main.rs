use std::time::Duration;

use anyhow::Result;
use rumqttc::{AsyncClient, MqttOptions};
use tokio::{net::TcpListener, signal};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use sensor_dashboard_service::{
    api::{self, AppState},
    config::Config,
    db,
    ingest::IngestService,
    live_state::LiveStateCache,
    storage::{AuthorStore, ReadingStore},
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env (ignore error if file absent — env vars may be set externally)
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;

    let pool = db::create_pool(&config.database_url).await?;
    db::run_migrations(&pool).await?;
    info!("Database ready");

    // Shared live state, written only by the ingestion task.
    let cache = LiveStateCache::new();
    let readings = ReadingStore::new(pool.clone());

    // Spawn the broker subscription task. rumqttc handles reconnection
    // internally; the task runs for the process lifetime.
    {
        let mut options = MqttOptions::new(
            "sensor-dashboard-service",
            config.mqtt_broker_host.clone(),
            config.mqtt_broker_port,
        );
        options.set_keep_alive(Duration::from_secs(config.mqtt_keep_alive_secs));

        let (client, eventloop) = AsyncClient::new(options, 64);
        let service =
            IngestService::new(client, &config.mqtt_base_topic, cache.clone(), readings.clone());
        tokio::spawn(service.run(eventloop));

        info!(
            host = %config.mqtt_broker_host,
            port = config.mqtt_broker_port,
            base_topic = %config.mqtt_base_topic,
            "Ingestion task started"
        );
    }

    let state = AppState {
        cache,
        readings,
        authors: AuthorStore::new(pool),
        history_limit: config.history_limit,
    };

    let addr = format!("{}:{}", config.server_host, config.server_port);
    let listener = TcpListener::bind(&addr).await?;
    info!(addr = %addr, "HTTP server listening");

    axum::serve(listener, api::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
