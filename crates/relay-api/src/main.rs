use relay_core::RelayConfig;

// Use mimalloc as the global allocator for better performance and lower fragmentation,
// especially when running on musl-based systems inside containers.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    relay_api::init_telemetry();

    // Load configuration
    let config = RelayConfig::from_env()?;

    // Initialize the application (platform client, tracker, routes)
    let (_state, router) = relay_api::setup::initialize_app(config.clone()).await?;

    // Start the server
    relay_api::setup::server::start_server(&config, router).await?;

    Ok(())
}
