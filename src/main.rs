use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use openstack_shim::auth::follow_updates;
use openstack_shim::config::{load_config, ConfigWatcher, ShimConfig};
use openstack_shim::lifecycle::{wait_for_signal, Shutdown};
use openstack_shim::observability::{logging, metrics};
use openstack_shim::{App, HttpServer};

#[derive(Parser)]
#[command(name = "openstack-shim")]
#[command(about = "OpenStack API compatibility shim", long_about = None)]
struct Args {
    /// TOML configuration file; built-in defaults when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the compiled routes and exit.
    #[arg(long)]
    print_routes: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => ShimConfig::default(),
    };

    logging::init_tracing(&config.observability.log_level)?;
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "openstack-shim starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        enabled_services = ?config.enabled_services,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    let mut app = App::from_config(config.clone())?;
    app.load_endpoints()?;
    app.load_drivers()?;
    let api = Arc::new(app.make_api());

    if args.print_routes {
        for (service, endpoint, pattern) in api.routes() {
            println!("{service:<10} {endpoint:<28} {pattern}");
        }
        return Ok(());
    }

    // Initialize metrics server
    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => {
                if let Err(e) = metrics::init_metrics(addr) {
                    tracing::error!(error = %e, "Failed to start metrics endpoint");
                }
            }
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    // Hot reload of the auth settings. The watcher must outlive the server.
    let _watcher = match &args.config {
        Some(path) => {
            let (watcher, updates) = ConfigWatcher::new(path);
            tokio::spawn(follow_updates(app.deps().auth.clone(), updates));
            match watcher.run() {
                Ok(handle) => Some(handle),
                Err(e) => {
                    tracing::warn!(error = %e, "Config hot reload disabled");
                    None
                }
            }
        }
        None => None,
    };

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    tokio::spawn(wait_for_signal(shutdown.clone()));

    HttpServer::new(api, &config)
        .run(listener, shutdown.wait())
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
