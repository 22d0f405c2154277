use dotenv::dotenv;
use std::env;

/// Process-level settings loaded once from the environment at startup.
/// Runtime-mutable configuration (trading pair, strategy selection, ...)
/// lives in [`crate::config::store::ConfigStore`].
#[derive(Debug, Clone)]
pub struct Settings {
    pub server_port: u16,
    pub pionex_api_key: String,
    pub pionex_api_secret: String,
    /// Hard upper bound on every outbound REST call.
    pub request_timeout_secs: u64,
    pub database_url: String,
    pub config_path: String,
}

impl Settings {
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        dotenv().ok(); // loads `.env` file automatically

        let server_port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "5000".into())
            .parse::<u16>()
            .map_err(|_| "SERVER_PORT must be a valid u16")?;

        let pionex_api_key = env::var("PIONEX_API_KEY").map_err(|_| "PIONEX_API_KEY missing")?;
        let pionex_api_secret =
            env::var("PIONEX_SECRET_KEY").map_err(|_| "PIONEX_SECRET_KEY missing")?;

        let request_timeout_secs = env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "10".into())
            .parse::<u64>()
            .map_err(|_| "REQUEST_TIMEOUT_SECS must be a valid u64")?;

        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://piondash.db?mode=rwc".into());
        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.json".into());

        Ok(Self {
            server_port,
            pionex_api_key,
            pionex_api_secret,
            request_timeout_secs,
            database_url,
            config_path,
        })
    }
}
