use anyhow::{Context, Result};
use tariff_store::config::Config;
use tariff_store::logging::{get_logger, init_logging};
use tariff_store::storage::open_backend;
use tariff_store::tariff::TariffSettingsStore;
use tariff_store::web::{self, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // An explicit path wins over the default search locations
    let config = match std::env::args().nth(1) {
        Some(path) => Config::from_file(&path)
            .with_context(|| format!("Failed to load configuration from {}", path))?,
        None => Config::load().context("Failed to load configuration")?,
    };
    config.validate().context("Invalid configuration")?;

    init_logging(&config.logging).context("Failed to initialize logging")?;
    let logger = get_logger("main");
    logger.info(&format!("Tariff store {} starting up", env!("APP_VERSION")));

    let backend = open_backend(&config.storage).context("Failed to open storage")?;
    let state = AppState::new(TariffSettingsStore::new(backend), config.tz()?);

    if let Err(e) = web::serve(state, &config.web.host, config.web.port).await {
        logger.error(&format!("Web server error: {}", e));
        return Err(e.into());
    }
    logger.info("Shutdown complete");
    Ok(())
}
