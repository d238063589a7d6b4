use mediapress_core::Config;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Load configuration
    let config = Config::from_env()?;

    mediapress_api::telemetry::init_telemetry();

    config.validate()?;

    // Initialize the application (state, routes)
    let (_state, router) = mediapress_api::setup::initialize_app(config.clone())?;

    // Start the server
    mediapress_api::setup::server::start_server(&config, router).await?;

    Ok(())
}
