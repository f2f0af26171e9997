mod app;
mod events;
mod render;
mod runner;

use std::str::FromStr;

use clap::{Parser, Subcommand};
use posterm_core::{
    format_amount, load_catalog_file, AppConfig, Catalog, DemoDataset, Layout, ScreenProfile,
    Theme,
};
use posterm_sync::SyncClient;
use tracing_subscriber::EnvFilter;

use crate::app::{CatalogSource, TerminalApp, TerminalSettings};
use crate::render::Renderer;

#[derive(Debug, Parser)]
#[command(name = "posterm-cli")]
#[command(about = "Point-of-sale terminal simulator")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run the terminal, reading touch commands from stdin
    Run {
        /// Screen size in inches: 3.5 (compact) or 8 (widescreen)
        #[arg(long)]
        screen: Option<String>,
        /// Built-in catalog to fall back on: coffee, restaurant or retail
        #[arg(long)]
        dataset: Option<String>,
        /// Never contact the backend
        #[arg(long, default_value_t = false)]
        offline: bool,
        /// Disable ANSI colours
        #[arg(long, default_value_t = false)]
        no_color: bool,
    },
    /// Fetch the catalog from the backend once and print a summary
    Sync,
    /// List the built-in demo datasets
    Datasets,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let config = posterm_core::load_app_config()?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Run {
            screen,
            dataset,
            offline,
            no_color,
        }) => run(&config, screen.as_deref(), dataset.as_deref(), offline, !no_color).await?,
        None => run(&config, None, None, false, true).await?,
        Some(Commands::Sync) => sync_once(&config).await?,
        Some(Commands::Datasets) => list_datasets(&config),
    }

    Ok(())
}

async fn run(
    config: &AppConfig,
    screen: Option<&str>,
    dataset: Option<&str>,
    offline: bool,
    color: bool,
) -> anyhow::Result<()> {
    let profile = screen.map(ScreenProfile::from_str).transpose()?;
    let layout = profile.map_or_else(|| config.layout(), Layout::for_profile);
    let dataset = match dataset {
        Some(d) => DemoDataset::from_str(d)?,
        None => config.demo_dataset,
    };

    let client = if offline {
        None
    } else {
        SyncClient::from_config(config)?
    };
    let (catalog, source) = fallback_catalog(config, dataset)?;

    tracing::info!(
        screen = profile.map_or("custom", ScreenProfile::label),
        width = layout.width,
        height = layout.height,
        widescreen = layout.widescreen,
        backend = config.backend_url.as_deref().unwrap_or("-"),
        online = client.is_some(),
        %source,
        products = catalog.products().len(),
        "starting terminal"
    );

    let settings = TerminalSettings {
        business_name: config.business_name.clone(),
        currency: config.currency.clone(),
        tax_rate: config.tax_rate,
        sync_interval: config.sync_interval(),
        payment_simulation: config.payment_simulation(),
        approval_dwell: config.approval_dwell(),
        online: client.is_some(),
    };
    let app = TerminalApp::new(catalog, source, settings);
    let renderer = Renderer::new(layout, Theme::dark(), color);

    runner::run_terminal(app, &renderer, client).await;
    Ok(())
}

/// The catalog shown until the first successful sync: the YAML file when
/// configured, otherwise the chosen built-in dataset.
fn fallback_catalog(
    config: &AppConfig,
    dataset: DemoDataset,
) -> anyhow::Result<(Catalog, CatalogSource)> {
    match &config.catalog_path {
        Some(path) => {
            let catalog = load_catalog_file(path)?;
            Ok((catalog, CatalogSource::File(path.clone())))
        }
        None => Ok((dataset.catalog(), CatalogSource::Demo(dataset))),
    }
}

async fn sync_once(config: &AppConfig) -> anyhow::Result<()> {
    let Some(client) = SyncClient::from_config(config)? else {
        anyhow::bail!("POSTERM_BACKEND_URL is not set");
    };

    let payload = client.fetch_sync().await?;
    let (catalog, store) = payload.into_parts();
    let currency = store.currency.as_deref().unwrap_or(&config.currency);

    println!(
        "{}: {} products in {} categories",
        store
            .business_name
            .as_deref()
            .unwrap_or(&config.business_name),
        catalog.products().len(),
        catalog.categories().len()
    );
    for category in catalog.categories() {
        let count = catalog
            .products()
            .iter()
            .filter(|p| p.category_id.as_deref() == Some(category.id.as_str()))
            .count();
        println!("  {} {:<16} {count}", category.icon, category.name);
    }
    if let Some(priciest) = catalog.products().iter().max_by_key(|p| p.price) {
        println!(
            "  highest price: {} {}",
            priciest.name,
            format_amount(currency, priciest.price)
        );
    }
    Ok(())
}

fn list_datasets(config: &AppConfig) {
    for dataset in DemoDataset::ALL {
        let catalog = dataset.catalog();
        let marker = if dataset == config.demo_dataset {
            "*"
        } else {
            " "
        };
        println!(
            "{marker} {:<11} {} categories, {} products",
            dataset.name(),
            catalog.categories().len(),
            catalog.products().len()
        );
    }
}
