//! Overlay management CLI.
//!
//! Wires the persistence subsystem against a live SQL API and mapping
//! service: lists the overlays saved for a dashboard, adds a new one
//! (classifying the input to pick the render path), and removes one by name.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use overlay_common::{classify, LayerStack, TileLayer};
use overlay_store::{HttpQueryTransport, OverlayRecordStore, SqlApiConfig};
use overlay_sync::{
    DashboardSession, HttpMapInstantiator, MapsApiConfig, OverlayListController, Protocol,
    RenderRouter,
};

#[derive(Parser, Debug)]
#[command(name = "overlay-cli")]
#[command(about = "Manage persisted dashboard overlays")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// SQL API query endpoint
    #[arg(long, env = "SQL_API_URL", default_value = "https://example.com/api/v2/sql")]
    sql_endpoint: String,

    /// Mapping service host
    #[arg(long, env = "MAPS_HOST", default_value = "example.com")]
    maps_host: String,

    /// Account owning the dashboard
    #[arg(long, env = "MAPS_USERNAME", default_value = "demo")]
    username: String,

    /// API key for both endpoints
    #[arg(long, env = "MAPS_API_KEY", default_value = "")]
    api_key: String,

    /// Visualization id whose overlays to manage
    #[arg(long, env = "DASHBOARD_ID")]
    dashboard_id: String,

    /// Page protocol, decides CDN endpoint selection
    #[arg(long, default_value = "https")]
    protocol: Protocol,

    /// HTTP timeout in seconds
    #[arg(long, default_value = "30")]
    timeout_secs: u64,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the overlays saved for the dashboard
    List,

    /// Add an overlay from a tile URL or raster source token
    Add {
        /// Tile-template URL, or a source token such as a GeoTIFF table name
        url: String,

        /// Layer name; derived from the input when omitted
        #[arg(long)]
        name: Option<String>,
    },

    /// Remove an overlay by layer name
    Remove {
        /// Name of the overlay to remove
        name: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Initialize tracing
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .json()
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let timeout = Duration::from_secs(args.timeout_secs);

    let transport = Arc::new(HttpQueryTransport::new(SqlApiConfig {
        endpoint: args.sql_endpoint.clone(),
        api_key: args.api_key.clone(),
        request_timeout: timeout,
    })?);
    let store = Arc::new(OverlayRecordStore::new(transport));

    let maps_config = MapsApiConfig {
        maps_host: args.maps_host.clone(),
        username: args.username.clone(),
        api_key: args.api_key.clone(),
        protocol: args.protocol,
        request_timeout: timeout,
    };
    let router = RenderRouter::new(HttpMapInstantiator::new(maps_config.clone())?, maps_config);

    // The CLI has no live map; a plain layer stack stands in, with the base
    // layer pinned at index 0 as on the dashboard.
    let map = LayerStack::with_base(TileLayer::overlay("//basemaps.example.com/{z}/{x}/{y}.png"));

    let mut controller = OverlayListController::new(
        DashboardSession::new(args.dashboard_id.clone()),
        router,
        store,
        map,
    );

    info!(dashboard_id = %args.dashboard_id, "Loading saved overlays");
    controller.load().await?;

    match args.command {
        Command::List => {
            if controller.is_empty() {
                println!("No overlays saved for {}", args.dashboard_id);
            }
            for (index, entry) in controller.entries().iter().enumerate() {
                println!(
                    "{:>3}  {:<20} {}",
                    index + 1,
                    entry.record.layer_name,
                    entry.record.source_url
                );
            }
        }
        Command::Add { url, name } => {
            let suggestion = classify(&url);
            let layer_name = name.unwrap_or(suggestion.layer_name);

            let id = controller
                .add(&url, &layer_name, suggestion.is_generated_raster)
                .await?;
            controller.flush().await;

            println!(
                "Added '{}' at position {} ({})",
                layer_name,
                controller.position_of(id).unwrap_or(0),
                if suggestion.is_generated_raster {
                    "generated raster"
                } else {
                    "direct tiles"
                }
            );
        }
        Command::Remove { name } => {
            let id = controller
                .find_by_name(&name)
                .map(|entry| entry.id)
                .ok_or_else(|| anyhow::anyhow!("no overlay named '{}'", name))?;

            controller.remove(id)?;
            controller.flush().await;

            println!("Removed '{}'; {} overlay(s) remain", name, controller.len());
        }
    }

    Ok(())
}
