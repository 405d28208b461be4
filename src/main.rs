use anyhow::Context;
use tracing_subscriber::{EnvFilter, fmt};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Init logging
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .context("invalid log filter")?;
    fmt().with_env_filter(filter).init();

    let config = dashgate::config::GateConfig::from_env().context("loading DASHGATE_* configuration")?;

    // Startup banner at info level so something always prints at default verbosity
    let rust_log = std::env::var("RUST_LOG").unwrap_or_else(|_| "<unset>".to_string());
    info!(
        target: "dashgate",
        "dashgate starting: RUST_LOG='{}', http_port={}, environment={:?}, api_base='{}'",
        rust_log, config.http_port, config.environment, config.api_base
    );

    dashgate::server::run(config).await
}
