//! Command-line entry point for host applications.
//!
//! The crate ships no binary of its own: page modules are statically
//! linked, so the host crate registers them and delegates its `main` here.
//!
//! ```no_run
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let registry = corridor::ModuleRegistry::new();
//!     // registry.register("routes/index.rs", Arc::new(Home));
//!     corridor::cli::run(registry).await
//! }
//! ```

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::compiler;
use crate::config::{load_or_default, SiteConfig};
use crate::pages::ModuleRegistry;
use crate::server::{self, DispatchTable, HttpServer, RouteWatcher};

#[derive(Parser)]
#[command(name = "corridor", about = "File-system route compiler and dispatch server")]
struct Cli {
    /// Path to the configuration file.
    #[arg(short, long, default_value = "corridor.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile the routes directory into dispatch artifacts.
    Build,
    /// Serve previously built artifacts.
    Serve,
    /// Build, serve, and rebuild on route-file changes.
    Dev,
}

/// Parse arguments and run the selected command against the host's
/// registered page modules.
pub async fn run(registry: ModuleRegistry) -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_or_default(&cli.config)?;

    init_tracing(&config.observability.log_level);

    match cli.command {
        Commands::Build => {
            compiler::run_build(&config, &registry).await?;
        }
        Commands::Serve => {
            server::start(&config, &registry).await?;
        }
        Commands::Dev => {
            dev(config, registry).await?;
        }
    }
    Ok(())
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("corridor={level}")));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Dev mode: initial build, serve, and hot-swap the table on changes.
async fn dev(
    config: SiteConfig,
    registry: ModuleRegistry,
) -> Result<(), Box<dyn std::error::Error>> {
    let artifacts = compiler::run_build(&config, &registry).await?;
    let table = DispatchTable::load(&artifacts.manifest, &registry)?;

    let listener = TcpListener::bind(&config.server.bind_address).await?;
    let server = HttpServer::new(&config.server, table);
    let handle = server.table_handle();

    let (watcher, mut changes) = RouteWatcher::new(&config.build.routes_dir);
    let _watcher = watcher.run(config.dev.debounce_ms)?;

    let debounce = Duration::from_millis(config.dev.debounce_ms);
    let rebuild_config = config.clone();
    let rebuild_registry = registry.clone();
    tokio::spawn(async move {
        while changes.recv().await.is_some() {
            // Let the change batch settle, then collapse queued events into
            // one rebuild.
            tokio::time::sleep(debounce).await;
            while changes.try_recv().is_ok() {}

            server::reload(&rebuild_config, &rebuild_registry, &handle).await;
        }
    });

    server.run(listener).await?;
    Ok(())
}
