use std::fmt;

use rand::Rng;
use serde::Serialize;

use crate::domain::error::{ConfigError, ShortenError};

pub const BASE62: &str = "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";
pub const DEFAULT_LENGTH: usize = 6;

// RFC 3986 unreserved characters.
const URL_SAFE: [bool; 128] = {
    let mut table = [false; 128];

    let mut i = 0;
    while i < 128 {
        let b = i as u8;
        table[i] = b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.' | b'~');
        i += 1;
    }
    table
};

/// Only obtainable through [`IdFormat::parse`] or a [`Generator`].
#[derive(Debug, Serialize, Clone, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct ShortId(String);

impl ShortId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ShortId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ShortId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Shape of every short id in a deployment: a fixed length over a fixed alphabet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdFormat {
    alphabet: Vec<u8>,
    length: usize,
    members: [bool; 128],
}

impl IdFormat {
    pub fn new(alphabet: &str, length: usize) -> Result<Self, ConfigError> {
        if length == 0 {
            return Err(ConfigError::ZeroLength);
        }

        let mut members = [false; 128];
        for c in alphabet.chars() {
            if !c.is_ascii() || !URL_SAFE[c as usize] {
                return Err(ConfigError::UnsafeCharacter(c));
            }
            if members[c as usize] {
                return Err(ConfigError::DuplicateCharacter(c));
            }
            members[c as usize] = true;
        }
        if alphabet.len() < 2 {
            return Err(ConfigError::AlphabetTooSmall);
        }

        Ok(Self {
            alphabet: alphabet.as_bytes().to_vec(),
            length,
            members,
        })
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn alphabet(&self) -> &str {
        // only ASCII gets past `new`
        std::str::from_utf8(&self.alphabet).unwrap_or_default()
    }

    /// Number of distinct ids, `A^L`, saturating at `u128::MAX`.
    pub fn keyspace(&self) -> u128 {
        u32::try_from(self.length)
            .ok()
            .and_then(|l| (self.alphabet.len() as u128).checked_pow(l))
            .unwrap_or(u128::MAX)
    }

    pub fn contains(&self, b: u8) -> bool {
        (b as usize) < self.members.len() && self.members[b as usize]
    }

    pub fn parse(&self, s: &str) -> Result<ShortId, ShortenError> {
        if s.len() != self.length {
            return Err(ShortenError::InvalidInput(format!(
                "short id must be {} characters",
                self.length
            )));
        }
        if !s.bytes().all(|b| self.contains(b)) {
            return Err(ShortenError::InvalidInput(
                "short id contains characters outside the alphabet".to_string(),
            ));
        }
        Ok(ShortId(s.to_string()))
    }
}

impl Default for IdFormat {
    fn default() -> Self {
        let mut members = [false; 128];
        for b in BASE62.bytes() {
            members[b as usize] = true;
        }
        Self {
            alphabet: BASE62.as_bytes().to_vec(),
            length: DEFAULT_LENGTH,
            members,
        }
    }
}

/// Source of candidate ids. Candidates may repeat; the store decides who wins.
pub trait Generator: Send + Sync {
    fn generate(&self) -> ShortId;
}

#[derive(Debug, Clone, Default)]
pub struct RandomGenerator {
    format: IdFormat,
}

impl RandomGenerator {
    pub fn new(format: IdFormat) -> Self {
        Self { format }
    }
}

impl Generator for RandomGenerator {
    fn generate(&self) -> ShortId {
        let mut rng = rand::thread_rng();
        let alphabet = &self.format.alphabet;
        let id = (0..self.format.length)
            .map(|_| alphabet[rng.gen_range(0..alphabet.len())] as char)
            .collect();
        ShortId(id)
    }
}
