//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// JWT configuration.
    pub jwt: JwtConfig,
    /// Report configuration.
    #[serde(default)]
    pub reports: ReportConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Database name. When set it replaces the database segment of `url`.
    #[serde(default)]
    pub name: Option<String>,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

impl DatabaseConfig {
    /// Returns the connection URL with `name` applied.
    #[must_use]
    pub fn connection_url(&self) -> String {
        let Some(name) = self.name.as_deref().filter(|n| !n.is_empty()) else {
            return self.url.clone();
        };

        let (base, query) = match self.url.split_once('?') {
            Some((base, query)) => (base, Some(query)),
            None => (self.url.as_str(), None),
        };

        let Some((scheme, rest)) = base.split_once("://") else {
            return self.url.clone();
        };

        // Only the part after the authority is the database segment.
        let authority = rest.split_once('/').map_or(rest, |(authority, _)| authority);
        let mut url = format!("{scheme}://{authority}/{name}");
        if let Some(query) = query {
            url.push('?');
            url.push_str(query);
        }
        url
    }
}

/// JWT configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    /// Secret key for signing tokens.
    pub secret: String,
    /// Access token expiration in seconds.
    #[serde(default = "default_access_token_expiry")]
    pub access_token_expiry_secs: u64,
}

fn default_access_token_expiry() -> u64 {
    86400 // 1 day
}

/// Report configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ReportConfig {
    /// Locale used for month names (`en` or `tr`).
    #[serde(default = "default_locale")]
    pub locale: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            locale: default_locale(),
        }
    }
}

fn default_locale() -> String {
    "en".to_string()
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// Sources, later ones winning: `config/default`, `config/{RUN_MODE}`,
    /// `TALLY__*` variables, then the conventional `DATABASE_URL`,
    /// `DATABASE_NAME`, `PORT` and `JWT_SECRET` variables.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("TALLY").separator("__"))
            .set_override_option("database.url", std::env::var("DATABASE_URL").ok())?
            .set_override_option("database.name", std::env::var("DATABASE_NAME").ok())?
            .set_override_option("server.port", std::env::var("PORT").ok())?
            .set_override_option("jwt.secret", std::env::var("JWT_SECRET").ok())?
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn db(url: &str, name: Option<&str>) -> DatabaseConfig {
        DatabaseConfig {
            url: url.to_string(),
            name: name.map(str::to_string),
            max_connections: 10,
            min_connections: 1,
        }
    }

    #[rstest]
    #[case("postgres://u:p@localhost:5432/app", None, "postgres://u:p@localhost:5432/app")]
    #[case("postgres://u:p@localhost:5432/app", Some("tally"), "postgres://u:p@localhost:5432/tally")]
    #[case("postgres://u:p@localhost:5432", Some("tally"), "postgres://u:p@localhost:5432/tally")]
    #[case(
        "postgres://u:p@db:5432/app?sslmode=disable",
        Some("tally"),
        "postgres://u:p@db:5432/tally?sslmode=disable"
    )]
    #[case("postgres://u:p@localhost/app", Some(""), "postgres://u:p@localhost/app")]
    fn test_connection_url(#[case] url: &str, #[case] name: Option<&str>, #[case] expected: &str) {
        assert_eq!(db(url, name).connection_url(), expected);
    }

    #[test]
    fn test_load_from_environment() {
        temp_env::with_vars(
            [
                ("RUN_MODE", Some("test-nonexistent")),
                ("TALLY__DATABASE__URL", Some("postgres://localhost/tally")),
                ("TALLY__JWT__SECRET", Some("secret")),
                ("DATABASE_URL", None),
                ("DATABASE_NAME", None),
                ("JWT_SECRET", None),
                ("PORT", Some("8088")),
            ],
            || {
                let config = AppConfig::load().unwrap();
                assert_eq!(config.database.url, "postgres://localhost/tally");
                assert_eq!(config.jwt.secret, "secret");
                assert_eq!(config.jwt.access_token_expiry_secs, 86400);
                assert_eq!(config.server.port, 8088);
                assert_eq!(config.server.host, "0.0.0.0");
                assert_eq!(config.reports.locale, "en");
            },
        );
    }

    #[test]
    fn test_conventional_variables_override_prefixed() {
        temp_env::with_vars(
            [
                ("RUN_MODE", Some("test-nonexistent")),
                ("TALLY__DATABASE__URL", Some("postgres://localhost/one")),
                ("TALLY__JWT__SECRET", Some("secret")),
                ("DATABASE_URL", Some("postgres://localhost/two")),
                ("DATABASE_NAME", Some("books")),
                ("JWT_SECRET", None),
                ("PORT", None),
            ],
            || {
                let config = AppConfig::load().unwrap();
                assert_eq!(config.database.url, "postgres://localhost/two");
                assert_eq!(
                    config.database.connection_url(),
                    "postgres://localhost/books"
                );
                assert_eq!(config.server.port, 3000);
            },
        );
    }
}
