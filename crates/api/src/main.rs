//! API server entry point.

use api::config::{Config, LogFormat};
use api::worker::QueueWorker;
use kv_store::{KeyValueStore, PostgresStore};
use metrics_exporter_prometheus::PrometheusHandle;
use sqlx::PgPool;
use tokio::signal;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Waits for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install SIGINT handler");
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
        () = ctrl_c => {
            tracing::info!("received SIGINT, starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("received SIGTERM, starting graceful shutdown");
        }
    }
}

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    let json = config.log_format == LogFormat::Json;

    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json).then(|| tracing_subscriber::fmt::layer()))
        .init();
}

/// Runs the HTTP server and the queue worker over the given store until a
/// shutdown signal arrives.
async fn serve<S>(config: Config, store: S, metrics_handle: PrometheusHandle)
where
    S: KeyValueStore + Clone + 'static,
{
    let (bus, queue) = api::create_event_bus(
        &config.checkout_events,
        config.queue_max_receive_count,
        config.queue_dead_letter_limit,
    );
    let state = api::create_state(store, bus, &config.tables, config.checkout_events.clone());
    let worker = QueueWorker::new(queue, state.ordering.clone()).spawn();
    let app = api::create_app(state, metrics_handle);

    let addr = config.addr();
    tracing::info!(%addr, "starting API server");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind address");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");

    worker.shutdown().await;
    tracing::info!("server shut down gracefully");
}

#[tokio::main]
async fn main() {
    // 1. Load configuration
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("configuration error: {err}");
            std::process::exit(1);
        }
    };

    // 2. Initialize tracing
    init_tracing(&config);

    // 3. Install Prometheus metrics recorder
    let metrics_handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .expect("failed to install Prometheus recorder");

    // 4. Pick the store and serve
    match config.database_url.clone() {
        Some(url) => {
            let pool = PgPool::connect(&url)
                .await
                .expect("failed to connect to database");
            let store = api::table_schemas(&config.tables)
                .into_iter()
                .fold(PostgresStore::new(pool), |store, (name, schema)| {
                    store.with_table(name, schema)
                });
            store.run_migrations().await.expect("migrations failed");
            tracing::info!("using Postgres store");
            serve(config, store, metrics_handle).await;
        }
        None => {
            let store = api::create_memory_store(&config.tables);
            tracing::info!("using in-memory store");
            serve(config, store, metrics_handle).await;
        }
    }
}
