#![allow(dead_code)]
use once_cell::sync::OnceCell;

/// Process configuration, read once from the environment at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Lens GraphQL endpoint. Empty means status lookups fail with a
    /// not-initialized error until the operator sets `LENS_URL`.
    pub lens_url: String,
    pub log_level: String,
    pub log_max_files: String,
}

static CONFIG: OnceCell<Config> = OnceCell::new();

impl Config {
    pub fn init_global() -> Result<&'static Config, String> {
        let cfg = Config::from_env();
        CONFIG
            .set(cfg)
            .map_err(|_| "Config already initialized".to_string())?;
        Ok(CONFIG.get().expect("config"))
    }

    pub fn get() -> &'static Config {
        CONFIG.get().expect("Config not initialized")
    }

    fn from_env() -> Config {
        let lens_url = std::env::var("LENS_URL").unwrap_or_default();
        let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let log_max_files = std::env::var("LOG_MAX_FILES").unwrap_or_else(|_| "7d".to_string());

        Config {
            lens_url,
            log_level,
            log_max_files,
        }
    }
}
