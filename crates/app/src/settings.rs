use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

const DEFAULT_CONFIG_PATH: &str = "config/codefails";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub app: App,
    pub server: Server,
}

#[derive(Debug, Clone, Deserialize)]
pub struct App {
    /// Log level for the env filter (`trace`..`error`).
    pub level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Server {
    /// Bind address; defaults to loopback.
    pub bind: Option<String>,
    pub port: u16,
    /// Database connection string; the scheme picks the backend.
    pub database: String,
    /// Secret used to sign session tokens. Must be non-empty.
    pub token_secret: String,
    /// Origin the browser frontend is served from.
    pub frontend_origin: String,
    /// Mark session cookies `Secure` (TLS deployments).
    pub secure_cookies: bool,
}

impl Settings {
    /// Load configuration from the optional TOML file and the
    /// environment (`CODEFAILS_SERVER__TOKEN_SECRET` style).
    pub fn new() -> Result<Self, ConfigError> {
        let settings: Settings = Config::builder()
            .set_default("app.level", "info")?
            .set_default("server.port", 3000)?
            .set_default("server.database", "sqlite:./codefails.db?mode=rwc")?
            .set_default("server.token_secret", "")?
            .set_default("server.frontend_origin", "http://localhost:5173")?
            .set_default("server.secure_cookies", false)?
            .add_source(File::with_name(DEFAULT_CONFIG_PATH).required(false))
            .add_source(Environment::with_prefix("CODEFAILS").separator("__"))
            .build()?
            .try_deserialize()?;

        // The service must not come up able to mint unsigned sessions.
        if settings.server.token_secret.is_empty() {
            return Err(ConfigError::Message(
                "server.token_secret must be set".to_string(),
            ));
        }

        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_token_secret_is_fatal() {
        // No file and no env in the test process: defaults leave the
        // secret empty, which must refuse to produce settings.
        let result = Settings::new();
        assert!(result.is_err());
    }
}
