//! Serves the add-header plugin.
//!
//! The host configures the plugin with the value to put in `example-header`,
//! then drives one stream context per request/response exchange.

use stream_plugin_sdk::{serve, Registry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing.
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    tracing::info!("Starting add-header plugin");

    serve(Registry::builtin(), None).await?;

    Ok(())
}
