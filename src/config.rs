pub mod logger;

use crate::{config::logger::LoggerConfig, handler, postgres, usecase};
use envconfig::Envconfig;
use strum::EnumString;

#[derive(EnumString, Debug, Clone, Copy, PartialEq, Eq)]
#[strum(ascii_case_insensitive)]
pub enum StoreBackend {
    Memory,
    Postgres,
}

#[derive(Envconfig, Debug)]
pub struct Config {
    #[envconfig(from = "STORE_BACKEND", default = "memory")]
    pub store: StoreBackend,
    #[envconfig(nested)]
    pub handler: handler::config::Config,
    #[envconfig(nested)]
    pub usecase: usecase::config::Config,
    #[envconfig(nested)]
    pub postgres: postgres::config::Config,
    #[envconfig(nested)]
    pub logger: LoggerConfig,
}

pub fn load() -> Result<Config, envconfig::Error> {
    Config::init_from_env()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::logger::LogFormat;
    use crate::domain::{error::ConfigError, id::IdFormat};
    use crate::usecase::usecase::DEFAULT_MAX_RETRIES;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let cfg = Config::init_from_hashmap(&HashMap::new()).unwrap();

        assert_eq!(cfg.store, StoreBackend::Memory);
        assert_eq!(cfg.handler.host, "0.0.0.0");
        assert_eq!(cfg.handler.port, 3000);
        assert_eq!(cfg.usecase.max_retries(), DEFAULT_MAX_RETRIES);
        assert_eq!(DEFAULT_MAX_RETRIES, 8);
        assert_eq!(cfg.usecase.id_format().unwrap(), IdFormat::default());
        assert_eq!(cfg.postgres.dsn, None);
        assert_eq!(cfg.postgres.pool_size, 16);
        assert_eq!(cfg.postgres.timeout_ms, 2000);
        assert_eq!(cfg.logger.format, LogFormat::Json);
    }

    #[test]
    fn test_overrides() {
        let cfg = Config::init_from_hashmap(&vars(&[
            ("STORE_BACKEND", "Postgres"),
            ("PORT", "8080"),
            ("SHORT_ID_LENGTH", "8"),
            ("SHORT_ID_ALPHABET", "abcdef0123"),
            ("SHORTEN_MAX_RETRIES", "3"),
            ("POSTGRES_DSN", "postgres://app@localhost/links"),
            ("RUST_LOG_FORMAT", "TEXT"),
        ]))
        .unwrap();

        assert_eq!(cfg.store, StoreBackend::Postgres);
        assert_eq!(cfg.handler.port, 8080);
        assert_eq!(cfg.usecase.max_retries(), 3);
        let format = cfg.usecase.id_format().unwrap();
        assert_eq!(format.length(), 8);
        assert_eq!(format.alphabet(), "abcdef0123");
        assert_eq!(
            cfg.postgres.dsn.as_deref(),
            Some("postgres://app@localhost/links")
        );
        assert_eq!(cfg.logger.format, LogFormat::Text);
    }

    #[test]
    fn test_invalid_values() {
        assert!(Config::init_from_hashmap(&vars(&[("STORE_BACKEND", "redis")])).is_err());
        assert!(Config::init_from_hashmap(&vars(&[("PORT", "http")])).is_err());

        let cfg = Config::init_from_hashmap(&vars(&[("SHORT_ID_ALPHABET", "ab/")])).unwrap();
        assert_eq!(
            cfg.usecase.id_format(),
            Err(ConfigError::UnsafeCharacter('/'))
        );
    }
}
