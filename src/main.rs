use anyhow::Result;
use clap::Parser;
use storefront_cart::{cli::{Args, CliApp}, utils::Config};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();

    let filter = if args.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()))
        })
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("🛒 Storefront cart starting...");

    let config = Config::from_env().map_err(|e| {
        tracing::error!("Failed to load configuration: {}", e);
        e
    })?;
    tracing::info!(
        "Configuration loaded for {} environment",
        config.environment
    );

    let app = CliApp::new(config, args.catalog.clone())?;
    app.run(args).await?;

    tracing::info!("🛒 Storefront cart stopped");
    Ok(())
}
