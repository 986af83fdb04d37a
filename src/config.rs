use anyhow::{bail, Context};

/// Which `CatalogStore` backs the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres { database_url: String },
    /// Process-local tables, lost on restart.
    Memory,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub backend: StoreBackend,
    pub host: String,
    pub port: u16,
    pub max_connections: u32,
    pub run_migrations: bool,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from an arbitrary key lookup (the process env in production).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let backend = match lookup("CATALOG_STORE").as_deref().unwrap_or("postgres") {
            "postgres" => StoreBackend::Postgres {
                database_url: lookup("DATABASE_URL").context("DATABASE_URL must be set")?,
            },
            "memory" => StoreBackend::Memory,
            other => bail!("CATALOG_STORE must be 'postgres' or 'memory', got '{}'", other),
        };

        Ok(Self {
            backend,
            host: lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: lookup("PORT")
                .unwrap_or_else(|| "8081".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            max_connections: lookup("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|| "20".to_string())
                .parse()
                .context("DB_MAX_CONNECTIONS must be a valid number")?,
            run_migrations: lookup("RUN_MIGRATIONS")
                .unwrap_or_else(|| "true".to_string())
                .parse()
                .context("RUN_MIGRATIONS must be true or false")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_only_database_url_is_set() {
        let config = Config::from_lookup(lookup_from(&[("DATABASE_URL", "postgres://localhost/catalog")]))
            .unwrap();
        assert_eq!(
            config.backend,
            StoreBackend::Postgres {
                database_url: "postgres://localhost/catalog".to_string()
            }
        );
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8081);
        assert_eq!(config.max_connections, 20);
        assert!(config.run_migrations);
    }

    #[test]
    fn explicit_values_override_defaults() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://db/catalog"),
            ("HOST", "0.0.0.0"),
            ("PORT", "9000"),
            ("DB_MAX_CONNECTIONS", "5"),
            ("RUN_MIGRATIONS", "false"),
        ]))
        .unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 9000);
        assert_eq!(config.max_connections, 5);
        assert!(!config.run_migrations);
    }

    #[test]
    fn memory_backend_needs_no_database_url() {
        let config = Config::from_lookup(lookup_from(&[("CATALOG_STORE", "memory")])).unwrap();
        assert_eq!(config.backend, StoreBackend::Memory);
    }

    #[test]
    fn unknown_backend_is_an_error() {
        let err = Config::from_lookup(lookup_from(&[("CATALOG_STORE", "redis")])).unwrap_err();
        assert!(err.to_string().contains("CATALOG_STORE"));
    }

    #[test]
    fn missing_database_url_is_an_error() {
        let err = Config::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(err.to_string().contains("DATABASE_URL"));
    }

    #[test]
    fn invalid_port_is_an_error() {
        let err = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://db/catalog"),
            ("PORT", "eighty"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }
}
