use crate::core::errors::FairshareError;
use dotenv::dotenv;
use once_cell::sync::Lazy;
use std::env;
use std::path::PathBuf;

pub const DEFAULT_PREFERENCES_PATH: &str = ".fairshare/preferences.json";

#[derive(Debug, Clone)]
pub struct Config {
    pub api_base_url: Option<String>,
    pub log_level: String,
    pub preferences_path: PathBuf,
}

impl Config {
    fn from_env() -> Self {
        dotenv().ok();

        Self {
            api_base_url: env::var("FAIRSHARE_API_BASE_URL")
                .ok()
                .map(|url| url.trim().to_string())
                .filter(|url| !url.is_empty()),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            preferences_path: env::var("FAIRSHARE_PREFERENCES_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_PREFERENCES_PATH)),
        }
    }

    /// Base URL of the ledger API. `override_url` (the command-line flag)
    /// wins over the environment.
    pub fn base_url(&self, override_url: Option<&str>) -> Result<String, FairshareError> {
        override_url
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .map(str::to_string)
            .or_else(|| self.api_base_url.clone())
            .ok_or(FairshareError::MissingBaseUrl)
    }
}

pub static CONFIG: Lazy<Config> = Lazy::new(Config::from_env);
