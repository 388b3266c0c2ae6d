use intake_api::setup;
use intake_core::Config;
use intake_infra::{init_telemetry, LogFormat};

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let config = Config::from_env()?;

    init_telemetry(LogFormat::from_json_flag(config.json_logs()))
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    let (state, router) = setup::initialize_app(config.clone()).await?;

    setup::server::start_server(&config, router).await?;

    // Let running conversions finish before exiting.
    state.queue().shutdown().await;
    tracing::info!("Server stopped");

    Ok(())
}
