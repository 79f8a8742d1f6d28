use std::fmt;

use envconfig::Envconfig;

#[derive(Envconfig, Clone)]
pub struct Config {
    #[envconfig(from = "POSTGRES_DSN")]
    pub dsn: Option<String>,

    #[envconfig(from = "POSTGRES_POOL_SIZE", default = "16")]
    pub pool_size: usize,

    #[envconfig(from = "POSTGRES_TIMEOUT_MS", default = "2000")]
    pub timeout_ms: u64,
}

// The DSN may carry a password.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("dsn", &self.dsn.as_ref().map(|_| "<redacted>"))
            .field("pool_size", &self.pool_size)
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}
