use url::Url;

use crate::domain::{
    error::{ConfigError, ShortenError, StoreError},
    id::{Generator, IdFormat, ShortId},
    models::UrlMapping,
    repository::MappingStore,
};

pub const DEFAULT_MAX_RETRIES: usize = 8;

pub struct Usecase<G: Generator, S: MappingStore> {
    generator: G,
    url_repository: S,
    format: IdFormat,
    max_retries: usize,
}

impl<G: Generator, S: MappingStore> Usecase<G, S> {
    pub fn new(
        generator: G,
        url_repository: S,
        format: IdFormat,
        max_retries: usize,
    ) -> Result<Self, ConfigError> {
        if max_retries == 0 {
            return Err(ConfigError::ZeroRetries);
        }
        Ok(Usecase {
            generator,
            url_repository,
            format,
            max_retries,
        })
    }

    pub fn store(&self) -> &S {
        &self.url_repository
    }

    /// Reserves a fresh short id for `long_url`, regenerating on collision up to
    /// the retry budget.
    pub async fn shorten(&self, long_url: &str) -> Result<ShortId, ShortenError> {
        check_long_url(long_url)?;

        for attempt in 1..=self.max_retries {
            let candidate = self.generator.generate();
            if self.url_repository.try_insert(&candidate, long_url).await? {
                return Ok(candidate);
            }
            tracing::debug!(
                event = "short_id_collision",
                id = candidate.as_str(),
                attempt,
                "Short id already taken, regenerating"
            );
        }

        tracing::error!(
            event = "short_id_exhausted",
            attempts = self.max_retries,
            keyspace = %self.format.keyspace(),
            "No free short id within the retry budget; consider a longer id or larger alphabet"
        );
        Err(ShortenError::GeneratorExhausted {
            attempts: self.max_retries,
        })
    }

    pub async fn resolve(&self, short_id: &str) -> Result<UrlMapping, ShortenError> {
        let id = self.format.parse(short_id)?;
        self.url_repository
            .lookup(&id)
            .await?
            .ok_or(ShortenError::NotFound)
    }

    pub async fn ping(&self) -> Result<(), StoreError> {
        self.url_repository.ping().await
    }
}

/// Accepts absolute http(s) URLs with a host; everything else is `InvalidInput`.
/// The input is only inspected. Callers store it byte for byte.
pub fn check_long_url(input: &str) -> Result<(), ShortenError> {
    if input.trim().is_empty() {
        return Err(ShortenError::InvalidInput(
            "The 'longUrl' parameter is required.".to_string(),
        ));
    }
    // `Url::parse` would quietly strip these, and they cannot go into a Location header.
    if input.starts_with(char::is_whitespace)
        || input.ends_with(char::is_whitespace)
        || input.contains(char::is_control)
    {
        return Err(ShortenError::InvalidInput(
            "URL must not contain control characters or surrounding whitespace".to_string(),
        ));
    }

    let url = Url::parse(input)
        .map_err(|e| ShortenError::InvalidInput(format!("Invalid URL format: {}", e)))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ShortenError::InvalidInput(format!(
            "Unsupported URL scheme: {}",
            url.scheme()
        )));
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(ShortenError::InvalidInput("URL must have a host".to_string()));
    }
    Ok(())
}
