//! Application configuration management.
//!
//! Configuration comes from environment variables, deserialized into a
//! type-safe struct with the `envy` crate. A `.env` file is honored when
//! present so local development does not need exported variables.

use serde::Deserialize;

/// Application configuration loaded from environment variables.
///
/// # Environment Variables
///
/// - `DATABASE_URL` (required): PostgreSQL connection string
/// - `SERVER_PORT` (optional): HTTP server port, defaults to 3000
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,

    #[serde(default = "default_port")]
    pub server_port: u16,
}

/// Default port if SERVER_PORT environment variable is not set.
fn default_port() -> u16 {
    3000
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if `DATABASE_URL` is missing or a variable
    /// cannot be parsed into its expected type.
    pub fn from_env() -> Result<Self, envy::Error> {
        // Load .env if present (no-op otherwise)
        dotenvy::dotenv().ok();

        // Field names map to upper-case variables: database_url -> DATABASE_URL
        envy::from_env::<Config>()
    }
}
