use std::time::Duration;

use crate::{
    domain::{
        error::{ConfigError, StoreError},
        id::ShortId,
        models::UrlMapping,
        repository::MappingStore,
    },
    postgres::config::Config,
};
use anyhow::{Context, Result, anyhow};
use backon::{ExponentialBuilder, Retryable};
use chrono::{DateTime, Utc};
use const_format::formatcp;
use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod};
use tokio_postgres::NoTls;

const SHORT_URL_TABLE_NAME: &str = "short_urls";
const CREATE_SHORT_URL_TABLE_QUERY: &str = formatcp!(
    r#"
    CREATE TABLE IF NOT EXISTS {SHORT_URL_TABLE_NAME} (
        short_id text PRIMARY KEY,
        long_url text NOT NULL,
        created_at timestamptz NOT NULL
    )
"#,
);
const INSERT_URL_QUERY: &str = formatcp!(
    r#"
    INSERT INTO {SHORT_URL_TABLE_NAME} (short_id, long_url, created_at)
    VALUES ($1, $2, $3) ON CONFLICT (short_id) DO NOTHING
"#,
);
const FIND_URL_QUERY: &str = formatcp!(
    r#"
    SELECT long_url, created_at FROM {SHORT_URL_TABLE_NAME} WHERE short_id = $1
"#,
);
const PING_QUERY: &str = "SELECT 1";

pub struct DB {
    pool: Pool,
    timeout: Duration,
}

impl DB {
    pub async fn new(config: Config) -> Result<Self> {
        let dsn = config.dsn.ok_or(ConfigError::MissingDsn)?;
        let pg_config: tokio_postgres::Config = dsn.parse().context("Invalid POSTGRES_DSN")?;

        let manager = Manager::from_config(
            pg_config,
            NoTls,
            ManagerConfig {
                recycling_method: RecyclingMethod::Fast,
            },
        );
        let pool = Pool::builder(manager)
            .max_size(config.pool_size)
            .build()
            .context("Failed to build postgres pool")?;

        let db = DB {
            pool,
            timeout: Duration::from_millis(config.timeout_ms),
        };

        let retry_policy = ExponentialBuilder::default()
            .with_min_delay(Duration::from_millis(100))
            .with_max_delay(Duration::from_secs(5))
            .with_factor(2.0)
            .with_jitter()
            .with_max_times(5);

        let db_ref = &db;
        let create_table = || async move { db_ref.create_table().await };
        create_table
            .retry(retry_policy)
            .sleep(tokio::time::sleep)
            .notify(|err, after| {
                tracing::warn!(error = %err, retry_in = ?after, "Postgres not ready, retrying");
            })
            .await?;

        Ok(db)
    }

    async fn create_table(&self) -> Result<()> {
        let client = self.pool.get().await?;
        client
            .batch_execute(CREATE_SHORT_URL_TABLE_QUERY)
            .await
            .map_err(|e| anyhow!("Failed to create table '{}': {}", SHORT_URL_TABLE_NAME, e))
    }

    async fn with_timeout<T>(
        &self,
        op: impl Future<Output = Result<T>> + Send,
    ) -> Result<T, StoreError> {
        match tokio::time::timeout(self.timeout, op).await {
            Ok(result) => result.map_err(StoreError::Backend),
            Err(_) => Err(StoreError::Timeout(self.timeout)),
        }
    }
}

impl MappingStore for DB {
    async fn try_insert(&self, id: &ShortId, long_url: &str) -> Result<bool, StoreError> {
        self.with_timeout(async {
            let client = self.pool.get().await?;
            let statement = client.prepare_cached(INSERT_URL_QUERY).await?;
            let created_at = Utc::now();
            let inserted = client
                .execute(&statement, &[&id.as_str(), &long_url, &created_at])
                .await?;
            Ok(inserted == 1)
        })
        .await
    }

    async fn lookup(&self, id: &ShortId) -> Result<Option<UrlMapping>, StoreError> {
        self.with_timeout(async {
            let client = self.pool.get().await?;
            let statement = client.prepare_cached(FIND_URL_QUERY).await?;
            let Some(row) = client.query_opt(&statement, &[&id.as_str()]).await? else {
                return Ok(None);
            };

            Ok(Some(UrlMapping {
                short_id: id.clone(),
                long_url: row.try_get("long_url")?,
                created_at: row.try_get::<_, DateTime<Utc>>("created_at")?,
            }))
        })
        .await
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.with_timeout(async {
            let client = self.pool.get().await?;
            client.simple_query(PING_QUERY).await?;
            Ok(())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::id::{Generator, IdFormat, RandomGenerator};
    use std::net::TcpListener;
    use std::time::Instant;

    fn config_from_env() -> Config {
        Config {
            dsn: std::env::var("POSTGRES_DSN").ok(),
            pool_size: 4,
            timeout_ms: 2000,
        }
    }

    #[test]
    fn test_queries_target_table() {
        assert!(CREATE_SHORT_URL_TABLE_QUERY.contains("short_urls"));
        assert!(INSERT_URL_QUERY.contains("ON CONFLICT (short_id) DO NOTHING"));
        assert!(FIND_URL_QUERY.contains("WHERE short_id = $1"));
    }

    #[tokio::test]
    async fn test_missing_dsn_is_rejected() {
        let config = Config {
            dsn: None,
            pool_size: 4,
            timeout_ms: 100,
        };
        let err = DB::new(config).await.err().unwrap();
        assert_eq!(
            err.downcast_ref::<ConfigError>(),
            Some(&ConfigError::MissingDsn)
        );
    }

    /// A pool aimed at a listener that completes the TCP handshake but never
    /// answers the postgres startup message.
    fn silent_db(timeout: Duration) -> (DB, TcpListener) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        let mut pg_config = tokio_postgres::Config::new();
        pg_config
            .host("127.0.0.1")
            .port(port)
            .user("tinylink")
            .dbname("tinylink");
        let manager = Manager::from_config(
            pg_config,
            NoTls,
            ManagerConfig {
                recycling_method: RecyclingMethod::Fast,
            },
        );
        let pool = Pool::builder(manager).max_size(2).build().unwrap();
        (DB { pool, timeout }, listener)
    }

    #[tokio::test]
    async fn test_unresponsive_server_times_out() {
        let timeout = Duration::from_millis(50);
        let (db, _listener) = silent_db(timeout);
        let id = IdFormat::default().parse("aB3xQ9").unwrap();

        let started = Instant::now();
        assert!(matches!(db.ping().await, Err(StoreError::Timeout(t)) if t == timeout));
        assert!(matches!(db.lookup(&id).await, Err(StoreError::Timeout(_))));
        assert!(matches!(
            db.try_insert(&id, "https://example.com/").await,
            Err(StoreError::Timeout(_))
        ));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    #[ignore = "needs POSTGRES_DSN pointing at a live database"]
    async fn test_insert_if_absent_roundtrip() {
        let db = DB::new(config_from_env()).await.unwrap();
        db.ping().await.unwrap();

        let id = RandomGenerator::new(IdFormat::default()).generate();
        let first = "HTTPS://Example.COM/./first";

        assert!(db.try_insert(&id, first).await.unwrap());
        assert!(!db.try_insert(&id, "https://example.com/second").await.unwrap());

        let mapping = db.lookup(&id).await.unwrap().unwrap();
        assert_eq!(mapping.long_url, first);
        assert!(db.exists(&id).await.unwrap());
    }

    #[tokio::test]
    #[ignore = "needs POSTGRES_DSN pointing at a live database"]
    async fn test_lookup_unknown() {
        let db = DB::new(config_from_env()).await.unwrap();
        let id = IdFormat::default().parse("zz0000").unwrap();
        assert!(db.lookup(&id).await.unwrap().is_none());
    }
}
