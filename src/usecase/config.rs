use envconfig::Envconfig;

use crate::{
    domain::{
        error::ConfigError,
        id::{BASE62, DEFAULT_LENGTH, IdFormat},
    },
    usecase::usecase::DEFAULT_MAX_RETRIES,
};

// Unset fields fall back to the id module's and usecase's own defaults.
#[derive(Envconfig, Debug, Clone)]
pub struct Config {
    #[envconfig(from = "SHORT_ID_LENGTH")]
    pub id_length: Option<usize>,

    #[envconfig(from = "SHORT_ID_ALPHABET")]
    pub id_alphabet: Option<String>,

    #[envconfig(from = "SHORTEN_MAX_RETRIES")]
    pub max_retries: Option<usize>,
}

impl Config {
    pub fn id_format(&self) -> Result<IdFormat, ConfigError> {
        IdFormat::new(
            self.id_alphabet.as_deref().unwrap_or(BASE62),
            self.id_length.unwrap_or(DEFAULT_LENGTH),
        )
    }

    pub fn max_retries(&self) -> usize {
        self.max_retries.unwrap_or(DEFAULT_MAX_RETRIES)
    }
}
