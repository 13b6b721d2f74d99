//! Core runtime configuration.
//!
//! Settings are resolved once at process startup and passed into the store and the REST layer.
//! Nothing reads environment variables while a request is being handled.

use std::time::Duration;

use crate::{ConfigError, ConfigResult};

pub const DEFAULT_PORT: u16 = 3005;
pub const DEFAULT_TABLE: &str = "liaison_mdx";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;
pub const DEFAULT_MIN_CONNECTIONS: u32 = 1;
pub const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 600;

/// Deployment environment. Controls whether failure detail reaches callers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Environment {
    Development,
    #[default]
    Production,
}

impl Environment {
    /// Parse the environment from an optional string value.
    ///
    /// `None` or blank means production.
    pub fn from_env_value(value: Option<String>) -> ConfigResult<Self> {
        let value = value
            .map(|v| v.trim().to_ascii_lowercase())
            .filter(|v| !v.is_empty());

        match value.as_deref() {
            None | Some("production") | Some("prod") => Ok(Self::Production),
            Some("development") | Some("dev") => Ok(Self::Development),
            Some(other) => Err(ConfigError::Invalid(format!(
                "unknown environment {other:?} (expected development or production)"
            ))),
        }
    }

    pub fn exposes_error_detail(self) -> bool {
        self == Self::Development
    }
}

/// Connection pool and table settings for the PostgreSQL store.
#[derive(Clone)]
pub struct StoreConfig {
    pub database_url: String,
    pub table: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: Duration,
    pub idle_timeout: Duration,
}

// Keep credentials in database_url out of logs.
impl std::fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreConfig")
            .field("database_url", &"[REDACTED]")
            .field("table", &self.table)
            .field("max_connections", &self.max_connections)
            .field("min_connections", &self.min_connections)
            .field("acquire_timeout", &self.acquire_timeout)
            .field("idle_timeout", &self.idle_timeout)
            .finish()
    }
}

impl StoreConfig {
    /// Create a `StoreConfig` with default pool settings.
    pub fn new(database_url: impl Into<String>) -> ConfigResult<Self> {
        let database_url = database_url.into();
        if database_url.trim().is_empty() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }

        Ok(Self {
            database_url,
            table: DEFAULT_TABLE.into(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            min_connections: DEFAULT_MIN_CONNECTIONS,
            acquire_timeout: Duration::from_secs(DEFAULT_ACQUIRE_TIMEOUT_SECS),
            idle_timeout: Duration::from_secs(DEFAULT_IDLE_TIMEOUT_SECS),
        })
    }

    /// Build the store settings from a variable lookup.
    ///
    /// `lookup` is usually `|k| std::env::var(k).ok()`; tests pass a map.
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let mut cfg = Self::new(database_url)?;

        if let Some(table) = non_blank(lookup("MDX_TABLE")) {
            validate_table_name(&table)?;
            cfg.table = table;
        }
        if let Some(v) = parse_setting::<u32>(&lookup, "DB_MAX_CONNECTIONS")? {
            cfg.max_connections = v;
        }
        if let Some(v) = parse_setting::<u32>(&lookup, "DB_MIN_CONNECTIONS")? {
            cfg.min_connections = v;
        }
        if let Some(v) = parse_setting::<u64>(&lookup, "DB_ACQUIRE_TIMEOUT_SECS")? {
            cfg.acquire_timeout = Duration::from_secs(v);
        }
        if let Some(v) = parse_setting::<u64>(&lookup, "DB_IDLE_TIMEOUT_SECS")? {
            cfg.idle_timeout = Duration::from_secs(v);
        }

        if cfg.max_connections == 0 {
            return Err(ConfigError::Invalid(
                "DB_MAX_CONNECTIONS must be at least 1".into(),
            ));
        }
        if cfg.min_connections > cfg.max_connections {
            return Err(ConfigError::Invalid(format!(
                "DB_MIN_CONNECTIONS ({}) exceeds DB_MAX_CONNECTIONS ({})",
                cfg.min_connections, cfg.max_connections
            )));
        }

        Ok(cfg)
    }
}

/// Process-wide settings resolved at startup.
#[derive(Clone, Debug)]
pub struct ServiceConfig {
    pub rest_addr: String,
    pub environment: Environment,
    pub store: StoreConfig,
}

impl ServiceConfig {
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let rest_addr = match non_blank(lookup("MDX_REST_ADDR")) {
            Some(addr) => addr,
            None => {
                let port = parse_setting::<u16>(&lookup, "PORT")?.unwrap_or(DEFAULT_PORT);
                format!("0.0.0.0:{port}")
            }
        };

        Ok(Self {
            rest_addr,
            environment: Environment::from_env_value(lookup("MDX_ENV"))?,
            store: StoreConfig::from_lookup(&lookup)?,
        })
    }

    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }
}

/// Validates that a table name is a plain SQL identifier, optionally schema-qualified.
///
/// The name is interpolated into the insert statement, so only ASCII letters, digits and `_`
/// are allowed in each dot-separated part, and a part may not start with a digit.
pub fn validate_table_name(table: &str) -> ConfigResult<()> {
    const MAX_IDENTIFIER_LEN: usize = 63;

    let parts: Vec<&str> = table.split('.').collect();
    if parts.len() > 2 {
        return Err(ConfigError::Invalid(format!(
            "table name {table:?} has too many qualifiers"
        )));
    }

    for part in parts {
        if part.is_empty() || part.len() > MAX_IDENTIFIER_LEN {
            return Err(ConfigError::Invalid(format!(
                "table name {table:?} must have 1 to {MAX_IDENTIFIER_LEN} characters per part"
            )));
        }
        let ok = part
            .bytes()
            .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'z' | b'A'..=b'Z' | b'_'));
        if !ok || part.as_bytes()[0].is_ascii_digit() {
            return Err(ConfigError::Invalid(format!(
                "table name {table:?} contains invalid characters \
                 (only alphanumeric and '_' allowed)"
            )));
        }
    }

    Ok(())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_setting<T>(
    lookup: impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> ConfigResult<Option<T>>
where
    T: std::str::FromStr,
{
    non_blank(lookup(key))
        .map(|raw| {
            raw.parse::<T>()
                .map_err(|_| ConfigError::Invalid(format!("{key} must be a number, got {raw:?}")))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_apply_when_only_database_url_is_set() {
        let cfg = ServiceConfig::from_lookup(lookup(&[("DATABASE_URL", "postgres://db/mdx")]))
            .expect("valid config");

        assert_eq!(cfg.rest_addr, "0.0.0.0:3005");
        assert_eq!(cfg.environment, Environment::Production);
        assert_eq!(cfg.store.table, "liaison_mdx");
        assert_eq!(cfg.store.max_connections, 10);
        assert_eq!(cfg.store.idle_timeout, Duration::from_secs(600));
    }

    #[test]
    fn test_port_is_used_when_rest_addr_is_unset() {
        let cfg = ServiceConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://db/mdx"),
            ("PORT", "8080"),
        ]))
        .unwrap();
        assert_eq!(cfg.rest_addr, "0.0.0.0:8080");
    }

    #[test]
    fn test_missing_database_url_is_rejected() {
        let err = ServiceConfig::from_lookup(lookup(&[])).expect_err("should require url");
        assert!(matches!(err, ConfigError::Missing("DATABASE_URL")));
    }

    #[test]
    fn test_non_numeric_pool_size_is_rejected() {
        let err = StoreConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://db/mdx"),
            ("DB_MAX_CONNECTIONS", "lots"),
        ]))
        .expect_err("should reject");
        assert!(matches!(err, ConfigError::Invalid(msg) if msg.contains("DB_MAX_CONNECTIONS")));
    }

    #[test]
    fn test_min_above_max_is_rejected() {
        let err = StoreConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://db/mdx"),
            ("DB_MAX_CONNECTIONS", "2"),
            ("DB_MIN_CONNECTIONS", "5"),
        ]))
        .expect_err("should reject");
        assert!(matches!(err, ConfigError::Invalid(msg) if msg.contains("exceeds")));
    }

    #[test]
    fn test_environment_parsing() {
        assert_eq!(Environment::from_env_value(None).unwrap(), Environment::Production);
        assert_eq!(
            Environment::from_env_value(Some(" Development ".into())).unwrap(),
            Environment::Development
        );
        assert!(Environment::from_env_value(Some("staging".into())).is_err());
    }

    #[test]
    fn test_table_name_validation() {
        assert!(validate_table_name("liaison_mdx").is_ok());
        assert!(validate_table_name("lab.liaison_mdx").is_ok());
        assert!(validate_table_name("").is_err());
        assert!(validate_table_name("1table").is_err());
        assert!(validate_table_name("mdx; DROP TABLE x").is_err());
        assert!(validate_table_name("a.b.c").is_err());
    }

    #[test]
    fn test_debug_redacts_database_url() {
        let cfg = StoreConfig::new("postgres://user:secret@db/mdx").unwrap();
        let debug = format!("{cfg:?}");
        assert!(!debug.contains("secret"));
        assert!(debug.contains("[REDACTED]"));
    }
}
