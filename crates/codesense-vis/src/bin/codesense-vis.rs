//! CodeSense Visualization Server
//!
//! Serve trace playback and rendering for the frontend.

use std::env;

use codesense_vis::{Session, VisConfig, VisServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "codesense_vis=info,codesense_render=info,codesense_trace=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = VisConfig::from_env()?;

    // Optional port override as the first argument
    if let Some(port) = env::args().nth(1) {
        config = config.with_port(port.parse()?);
    }

    tracing::info!(
        generator = %config.generator_url,
        interval_ms = config.interval.as_millis() as u64,
        "Starting CodeSense visualizer"
    );

    let session = Session::from_config(&config)?;
    let server = VisServer::new(session);
    server.serve(config.listen_addr).await?;

    Ok(())
}
