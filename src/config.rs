// Configuration management

use crate::core::errors::NotesError;
use secrecy::{ExposeSecret, SecretString};
use std::env;
use std::fmt;

/// Default speller endpoint (Yandex.Speller JSON API)
pub const DEFAULT_SPELLER_URL: &str =
    "https://speller.yandex.net/services/spellservice.json/checkText";

/// Application configuration loaded from environment variables
///
/// All configuration is validated on load with clear error messages.
pub struct Config {
    // Server configuration
    pub server_address: String,

    // Database configuration
    pub database_url: String,
    pub db_max_connections: u32,
    pub run_migrations: bool,

    // Speller configuration
    pub speller_url: String,
    pub speller_timeout_secs: u64,

    // Authentication configuration
    pub jwt_secret: SecretString,
    pub argon2_m_cost: u32,
    pub argon2_t_cost: u32,
    pub argon2_p_cost: u32,
    pub login_reveals_unknown_user: bool,

    // Middleware configuration
    pub request_timeout_secs: u64,
    pub body_size_limit_bytes: usize,

    // Logging configuration
    pub log_level: String,
    pub log_format: String, // "json" or "text"
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Supports `.env` file loading in development (via dotenv crate).
    pub fn from_env() -> Result<Self, NotesError> {
        // Skip in test environment to avoid interfering with test environment variables
        #[cfg(not(test))]
        {
            dotenv::dotenv().ok(); // Ignore errors (file may not exist)
        }

        Self::from_source(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    pub fn from_source<F>(lookup: F) -> Result<Self, NotesError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = Self {
            server_address: Self::normalize_address(&Self::get_or_default(
                &lookup,
                "SERVER_ADDRESS",
                "0.0.0.0:8080",
            )),
            database_url: Self::get_required(&lookup, "DATABASE_URL")?,
            db_max_connections: Self::parse_or_default(&lookup, "DB_MAX_CONNECTIONS", 10u32)?,
            run_migrations: Self::parse_bool_or_default(&lookup, "RUN_MIGRATIONS", true)?,
            speller_url: Self::get_first_or_default(
                &lookup,
                &["YANDEX_SPELLCHECKER_URL", "SPELLER_URL"],
                DEFAULT_SPELLER_URL,
            ),
            speller_timeout_secs: Self::parse_or_default(&lookup, "SPELLER_TIMEOUT_SECS", 5u64)?,
            jwt_secret: SecretString::new(Self::get_required(&lookup, "JWT_SECRET")?),
            argon2_m_cost: Self::parse_or_default(&lookup, "ARGON2_M_COST", argon2::Params::DEFAULT_M_COST)?,
            argon2_t_cost: Self::parse_or_default(&lookup, "ARGON2_T_COST", argon2::Params::DEFAULT_T_COST)?,
            argon2_p_cost: Self::parse_or_default(&lookup, "ARGON2_P_COST", argon2::Params::DEFAULT_P_COST)?,
            login_reveals_unknown_user: Self::parse_bool_or_default(
                &lookup,
                "LOGIN_REVEALS_UNKNOWN_USER",
                false,
            )?,
            request_timeout_secs: Self::parse_or_default(&lookup, "REQUEST_TIMEOUT_SECS", 30u64)?,
            body_size_limit_bytes: Self::parse_or_default(&lookup, "BODY_SIZE_LIMIT_BYTES", 1024 * 1024usize)?,
            log_level: Self::get_or_default(&lookup, "LOG_LEVEL", "info"),
            log_format: Self::get_or_default(&lookup, "LOG_FORMAT", "json"),
        };

        // Post-load validation
        config.validate()?;

        Ok(config)
    }

    /// Get value or return default; empty values count as unset
    fn get_or_default<F>(lookup: &F, key: &str, default: &str) -> String
    where
        F: Fn(&str) -> Option<String>,
    {
        match lookup(key) {
            Some(value) if !value.is_empty() => value,
            _ => default.to_string(),
        }
    }

    /// First non-empty value among `keys`, in order, or the default
    fn get_first_or_default<F>(lookup: &F, keys: &[&str], default: &str) -> String
    where
        F: Fn(&str) -> Option<String>,
    {
        keys.iter()
            .filter_map(|key| lookup(key))
            .find(|value| !value.is_empty())
            .unwrap_or_else(|| default.to_string())
    }

    /// Get required value
    fn get_required<F>(lookup: &F, key: &str) -> Result<String, NotesError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = lookup(key)
            .ok_or_else(|| NotesError::ConfigurationError(format!("{} not set", key)))?;

        if value.is_empty() {
            return Err(NotesError::ConfigurationError(format!("{} is empty", key)));
        }

        Ok(value)
    }

    /// Parse a positive number or return default
    fn parse_or_default<F, T>(lookup: &F, key: &str, default: T) -> Result<T, NotesError>
    where
        F: Fn(&str) -> Option<String>,
        T: std::str::FromStr + PartialEq + From<u8>,
        T::Err: fmt::Display,
    {
        match lookup(key) {
            Some(value) if !value.is_empty() => {
                let parsed = value.trim().parse::<T>().map_err(|e| {
                    NotesError::ConfigurationError(format!("Invalid {} value '{}': {}", key, value, e))
                })?;

                if parsed == T::from(0u8) {
                    return Err(NotesError::ConfigurationError(format!(
                        "{} must be greater than 0",
                        key
                    )));
                }

                Ok(parsed)
            }
            _ => Ok(default),
        }
    }

    /// Parse a boolean flag (`true`/`false`/`1`/`0`) or return default
    fn parse_bool_or_default<F>(lookup: &F, key: &str, default: bool) -> Result<bool, NotesError>
    where
        F: Fn(&str) -> Option<String>,
    {
        match lookup(key) {
            Some(value) if !value.is_empty() => match value.trim().to_lowercase().as_str() {
                "true" | "1" | "yes" => Ok(true),
                "false" | "0" | "no" => Ok(false),
                _ => Err(NotesError::ConfigurationError(format!(
                    "Invalid {} value '{}': expected true or false",
                    key, value
                ))),
            },
            _ => Ok(default),
        }
    }

    /// Accept the bare `:port` form and bind it on all interfaces
    fn normalize_address(address: &str) -> String {
        if address.starts_with(':') {
            format!("0.0.0.0{}", address)
        } else {
            address.to_string()
        }
    }

    /// Validate all configuration values
    fn validate(&self) -> Result<(), NotesError> {
        Self::validate_server_address(&self.server_address)?;
        Self::validate_url(&self.database_url, "Database")?;
        Self::validate_url(&self.speller_url, "Speller")?;

        argon2::Params::new(self.argon2_m_cost, self.argon2_t_cost, self.argon2_p_cost, None)
            .map_err(|e| NotesError::ConfigurationError(format!("Invalid Argon2 parameters: {}", e)))?;

        Self::validate_log_level(&self.log_level)?;
        Self::validate_log_format(&self.log_format)?;

        Ok(())
    }

    /// Validate `host:port` form
    fn validate_server_address(address: &str) -> Result<(), NotesError> {
        let (host, port) = address.rsplit_once(':').ok_or_else(|| {
            NotesError::ConfigurationError(format!(
                "Invalid SERVER_ADDRESS '{}': expected host:port",
                address
            ))
        })?;

        let port = port.parse::<u16>().map_err(|e| {
            NotesError::ConfigurationError(format!("Invalid SERVER_ADDRESS port '{}': {}", port, e))
        })?;

        if host.is_empty() || port == 0 {
            return Err(NotesError::ConfigurationError(format!(
                "Invalid SERVER_ADDRESS '{}': expected host:port",
                address
            )));
        }

        Ok(())
    }

    /// Validate URL format
    fn validate_url(url: &str, description: &str) -> Result<(), NotesError> {
        url::Url::parse(url).map_err(|e| {
            NotesError::ConfigurationError(format!("Invalid {} URL: {}", description, e))
        })?;
        Ok(())
    }

    /// Validate log level
    fn validate_log_level(level: &str) -> Result<(), NotesError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&level.to_lowercase().as_str()) {
            return Err(NotesError::ConfigurationError(format!(
                "Invalid LOG_LEVEL '{}': must be one of {}",
                level,
                valid_levels.join(", ")
            )));
        }
        Ok(())
    }

    /// Validate log format
    fn validate_log_format(format: &str) -> Result<(), NotesError> {
        if format != "json" && format != "text" {
            return Err(NotesError::ConfigurationError(format!(
                "Invalid LOG_FORMAT '{}': must be 'json' or 'text'",
                format
            )));
        }
        Ok(())
    }

    /// Signing secret bytes for the token service
    pub fn jwt_secret_bytes(&self) -> &[u8] {
        self.jwt_secret.expose_secret().as_bytes()
    }
}

impl Config {
    /// Create a test configuration
    ///
    /// Bypasses environment loading; Argon2 costs are set to the minimum so
    /// hashing stays fast in debug builds.
    pub fn test_config() -> Self {
        Self {
            server_address: "127.0.0.1:8080".to_string(),
            database_url: "postgresql://localhost/notes_test".to_string(),
            db_max_connections: 5,
            run_migrations: false,
            speller_url: "http://127.0.0.1:1/checkText".to_string(),
            speller_timeout_secs: 5,
            jwt_secret: SecretString::new("test-jwt-secret".to_string()),
            argon2_m_cost: 8,
            argon2_t_cost: 1,
            argon2_p_cost: 1,
            login_reveals_unknown_user: false,
            request_timeout_secs: 30,
            body_size_limit_bytes: 1024 * 1024,
            log_level: "info".to_string(),
            log_format: "json".to_string(),
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("server_address", &self.server_address)
            .field("database_url", &"<REDACTED>")
            .field("db_max_connections", &self.db_max_connections)
            .field("run_migrations", &self.run_migrations)
            .field("speller_url", &self.speller_url)
            .field("speller_timeout_secs", &self.speller_timeout_secs)
            .field("jwt_secret", &"<REDACTED>")
            .field("argon2_m_cost", &self.argon2_m_cost)
            .field("argon2_t_cost", &self.argon2_t_cost)
            .field("argon2_p_cost", &self.argon2_p_cost)
            .field("login_reveals_unknown_user", &self.login_reveals_unknown_user)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("body_size_limit_bytes", &self.body_size_limit_bytes)
            .field("log_level", &self.log_level)
            .field("log_format", &self.log_format)
            .finish()
    }
}
