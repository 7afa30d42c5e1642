//! Server binary entry point.

use clap::Parser;
use tracing::warn;
use tracing_subscriber::{fmt, EnvFilter};

use backend::server::{run, AppConfig};

#[actix_web::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let config = AppConfig::parse();
    run(config).await?;
    Ok(())
}
