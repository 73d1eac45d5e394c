mod batch;
mod config;
mod export;
mod gui;
mod model;
mod normalizer;
mod parser;
mod phones;
mod scraper;

use config::{AppConfig, load_config};
use tracing::{error, info};

fn main() {
    tracing_subscriber::fmt::init();

    let config = match load_config("config.json") {
        Ok(cfg) => cfg,
        Err(e) => {
            info!("config.json not loaded ({}), using defaults", e);
            AppConfig::default()
        }
    };

    if let Err(e) = gui::run(config) {
        error!("GUI error: {}", e);
    }
}
