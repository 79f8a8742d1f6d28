use crate::domain::id::ShortId;
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UrlMapping {
    pub short_id: ShortId, // pathになる
    /// Exactly as submitted; checked with `url::Url` but never rewritten.
    pub long_url: String,
    pub created_at: DateTime<Utc>,
}
