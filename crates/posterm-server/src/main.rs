mod api;
mod middleware;

use posterm_core::{load_catalog_file, AppConfig, StoreSettings};
use posterm_sync::SyncPayload;
use tracing_subscriber::EnvFilter;

use crate::api::{build_app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = posterm_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let (label, payload) = demo_payload(&config)?;
    if !config.simulator_dir.is_dir() {
        tracing::warn!(
            dir = %config.simulator_dir.display(),
            "simulator directory not found; only the API will be served"
        );
    }
    tracing::info!(
        bind_addr = %config.bind_addr,
        catalog = %label,
        products = payload.products.len(),
        simulator_dir = %config.simulator_dir.display(),
        "starting preview server"
    );

    let app = build_app(AppState::new(label, payload), &config.simulator_dir);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

/// What `GET /api/sync` serves: the YAML catalog when configured, otherwise
/// the configured built-in dataset, with the store settings from config.
fn demo_payload(config: &AppConfig) -> anyhow::Result<(String, SyncPayload)> {
    let (label, catalog) = match &config.catalog_path {
        Some(path) => (path.display().to_string(), load_catalog_file(path)?),
        None => (
            config.demo_dataset.name().to_string(),
            config.demo_dataset.catalog(),
        ),
    };

    let mut settings = StoreSettings {
        business_name: Some(config.business_name.clone()),
        currency: Some(config.currency.clone()),
        ..StoreSettings::default()
    };
    settings.extra.insert(
        "tax_rate".to_string(),
        serde_json::Value::String(config.tax_rate.to_string()),
    );

    let payload = SyncPayload {
        products: catalog.products().to_vec(),
        categories: catalog.categories().to_vec(),
        settings,
    };
    Ok((label, payload))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
