use anyhow::Context;
use axum::http::HeaderValue;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

use eunify_menu::app::{router, AppState};
use eunify_menu::config::{self, AppConfig};
use eunify_menu::database::{DatabaseHandle, PgMenuStore};
use eunify_menu::menu::{default_menu, Initializer, MemoryMenuStore, MenuStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL etc.
    let _ = dotenvy::dotenv();
    eunify_menu::init_tracing("info,eunify_menu=debug,tower_http=info");

    let config = config::config();
    config.check().map_err(anyhow::Error::msg)?;
    info!("Starting E-Unify menu registry in {:?} mode", config.environment);

    let (store, handle) = open_store(config).await?;

    if config.initializer.on_startup {
        // Abort startup rather than serve a partially seeded registry
        let report = Initializer::new(store.clone(), default_menu())
            .run_with_retry(&config.initializer.retry)
            .await
            .context("menu initialization failed")?;
        info!("Menu registry ready: created {}, skipped {}", report.created, report.skipped);
    }

    let mut app = router(AppState::new(store, &config.security.jwt_secret)).layer(cors_layer(config));
    if config.api.enable_request_logging {
        app = app.layer(TraceLayer::new_for_http());
    }

    let bind_addr = format!("0.0.0.0:{}", config.api.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    info!("E-Unify menu registry listening on http://{}", bind_addr);

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    if let Some(handle) = handle {
        handle.close().await;
    }
    served.context("server error")
}

async fn open_store(config: &AppConfig) -> anyhow::Result<(Arc<dyn MenuStore>, Option<DatabaseHandle>)> {
    if config.database.url.is_none() {
        if eunify_menu::is_development!() {
            warn!("DATABASE_URL not set; using an in-memory menu store");
            return Ok((Arc::new(MemoryMenuStore::new()), None));
        }
        anyhow::bail!("DATABASE_URL must be set outside development");
    }

    let handle = DatabaseHandle::from_config(&config.database).await?;
    let store = PgMenuStore::new(&handle, config.database.query_timeout());
    if let Err(e) = store.ensure_schema().await {
        handle.close().await;
        return Err(e).context("failed to prepare menu_items table");
    }
    Ok((Arc::new(store), Some(handle)))
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    if eunify_menu::is_development!() {
        return CorsLayer::permissive();
    }
    let origins: Vec<HeaderValue> = config
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();
    CorsLayer::new().allow_origin(origins).allow_methods(Any).allow_headers(Any)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
