use anyhow::bail;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggerConfig {
    pub log_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    pub allow_origins: Vec<String>,
    pub address: String,
    /// Seconds before an in-flight request is abandoned.
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    #[serde(default = "default_issuer")]
    pub issuer: String,
    #[serde(default = "default_access_ttl")]
    pub access_ttl: i64,
    #[serde(default = "default_refresh_ttl")]
    pub refresh_ttl: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CookieConfig {
    pub access_name: String,
    pub refresh_name: String,
    pub secure: bool,
    pub http_only: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub enabled: bool,
    /// Seconds a resolved user stays cached.
    pub user_ttl: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub db: DatabaseConfig,
    pub logger: LoggerConfig,
    pub application: ApplicationConfig,
    pub jwt: JwtConfig,
    pub cookie: CookieConfig,
    pub cache: CacheConfig,
}

fn default_request_timeout() -> u64 {
    30
}

fn default_issuer() -> String {
    "userhub".to_string()
}

fn default_access_ttl() -> i64 {
    24 * 60 * 60
}

fn default_refresh_ttl() -> i64 {
    7 * 24 * 60 * 60
}

impl AppConfig {
    pub fn from_file<P: AsRef<std::path::Path>>(path: P) -> anyhow::Result<AppConfig> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> anyhow::Result<AppConfig> {
        let config: AppConfig = toml::from_str(contents)?;
        if config.jwt.secret.trim().is_empty() {
            bail!("`jwt.secret` must not be empty");
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    const CONFIG: &str = r#"
        [db]
        url = "postgres://localhost/userhub"
        max_connections = 5

        [logger]
        log_path = "logs"

        [application]
        address = "0.0.0.0:8080"
        allow_origins = ["*"]

        [jwt]
        secret = "change-me"

        [cookie]
        access_name = "access_token"
        refresh_name = "refresh_token"
        secure = false
        http_only = true

        [cache]
        enabled = true
        user_ttl = 3600
    "#;

    #[rstest]
    fn test_defaults_are_filled_in() {
        let config = AppConfig::from_toml(CONFIG).unwrap();

        assert_eq!(config.application.request_timeout, 30);
        assert_eq!(config.jwt.issuer, "userhub");
        assert_eq!(config.jwt.access_ttl, 86_400);
        assert_eq!(config.jwt.refresh_ttl, 604_800);
    }

    #[rstest]
    fn test_empty_secret_is_rejected() {
        let contents = CONFIG.replace(r#"secret = "change-me""#, r#"secret = " ""#);

        assert!(AppConfig::from_toml(&contents).is_err());
    }

    #[rstest]
    fn test_example_config_parses() {
        let config = AppConfig::from_toml(include_str!("../../config.example.toml"));

        assert!(config.is_ok(), "{:?}", config.err());
    }
}
