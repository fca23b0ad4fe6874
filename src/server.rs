use crate::adapter::PluginAdapter;
use crate::proto::stream_plugin_server::StreamPluginServer;
use crate::registry::Registry;
use crate::{PluginError, Result};
use clap::Parser;
use std::path::PathBuf;
use tokio::signal;
use tonic::transport::Server;
use tracing::{info, warn};

#[cfg(unix)]
use tokio::net::UnixListener;

/// Command-line arguments for the plugin server.
#[derive(Parser, Debug)]
#[command(author, version, about = "stream plugin server", long_about = None)]
struct Args {
    /// Address to bind to (socket path for unix, host:port for tcp).
    #[arg(long)]
    address: String,

    /// Network type (unix or tcp).
    #[arg(long, default_value = "unix")]
    network: String,
}

/// Builds the gRPC service for `registry` without binding it to a listener.
pub fn service(registry: Registry) -> StreamPluginServer<PluginAdapter> {
    StreamPluginServer::new(PluginAdapter::new(registry))
}

/// Serves the plugins in `registry` on the address given on the command line.
///
/// This is the main entry point for running plugins. It handles:
/// - Command-line argument parsing
/// - Server setup (Unix socket or TCP)
/// - Graceful shutdown on SIGINT/SIGTERM
/// - Automatic cleanup of Unix socket files
///
/// # Arguments
///
/// * `registry` - Plugins the host may instantiate
/// * `args` - Optional command-line arguments (defaults to std::env::args())
///
/// # Example
///
/// ```rust,no_run
/// use stream_plugin_sdk::{serve, Registry};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     serve(Registry::builtin(), None).await?;
///     Ok(())
/// }
/// ```
pub async fn serve(registry: Registry, args: Option<Vec<String>>) -> Result<()> {
    // Parse command-line arguments.
    let args = if let Some(args) = args {
        Args::try_parse_from(args).map_err(|e| PluginError::Server(e.to_string()))?
    } else {
        Args::parse()
    };

    info!(
        "Starting plugin server on {} ({}) with plugins {:?}",
        args.address,
        args.network,
        registry.root_ids()
    );

    // Create the plugin service.
    let service = service(registry);

    // Serve based on network type.
    match args.network.as_str() {
        "unix" => serve_unix(service, &args.address).await,
        "tcp" => serve_tcp(service, &args.address).await,
        network => Err(PluginError::Configuration(format!(
            "Unsupported network type: {}",
            network
        ))),
    }
}

#[cfg(unix)]
async fn serve_unix(service: StreamPluginServer<PluginAdapter>, address: &str) -> Result<()> {
    use tokio_stream::wrappers::UnixListenerStream;

    let path = PathBuf::from(address);

    // Remove existing socket file if it exists.
    if path.exists() {
        warn!("Removing existing socket file: {}", address);
        std::fs::remove_file(&path)?;
    }

    // Create Unix listener.
    let listener = UnixListener::bind(&path)?;
    let stream = UnixListenerStream::new(listener);

    info!("Listening on Unix socket: {}", address);

    // Serve with graceful shutdown.
    Server::builder()
        .add_service(service)
        .serve_with_incoming_shutdown(stream, shutdown_signal())
        .await?;

    // Clean up socket file on shutdown.
    if path.exists() {
        info!("Cleaning up socket file: {}", address);
        let _ = std::fs::remove_file(&path);
    }

    Ok(())
}

#[cfg(not(unix))]
async fn serve_unix(_service: StreamPluginServer<PluginAdapter>, _address: &str) -> Result<()> {
    Err(PluginError::Configuration(
        "Unix sockets not supported on this platform".to_string(),
    ))
}

async fn serve_tcp(service: StreamPluginServer<PluginAdapter>, address: &str) -> Result<()> {
    let addr = address
        .parse()
        .map_err(|e| PluginError::Configuration(format!("Invalid TCP address: {}", e)))?;

    info!("Listening on TCP: {}", address);

    // Serve with graceful shutdown.
    Server::builder()
        .add_service(service)
        .serve_with_shutdown(addr, shutdown_signal())
        .await?;

    Ok(())
}

/// Waits for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT, shutting down gracefully");
        }
        _ = terminate => {
            info!("Received SIGTERM, shutting down gracefully");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(extra: &[&str]) -> Vec<String> {
        std::iter::once("plugin")
            .chain(extra.iter().copied())
            .map(String::from)
            .collect()
    }

    #[tokio::test]
    async fn rejects_unknown_network() {
        let result = serve(
            Registry::builtin(),
            Some(args(&["--address", "x", "--network", "carrier-pigeon"])),
        )
        .await;
        assert!(matches!(result, Err(PluginError::Configuration(msg)) if msg.contains("carrier-pigeon")));
    }

    #[tokio::test]
    async fn rejects_bad_tcp_address() {
        let result = serve(
            Registry::builtin(),
            Some(args(&["--address", "not-an-address", "--network", "tcp"])),
        )
        .await;
        assert!(matches!(result, Err(PluginError::Configuration(_))));
    }

    #[tokio::test]
    async fn missing_address_is_a_server_error() {
        let result = serve(Registry::builtin(), Some(args(&["--network", "tcp"]))).await;
        assert!(matches!(result, Err(PluginError::Server(_))));
    }
}
