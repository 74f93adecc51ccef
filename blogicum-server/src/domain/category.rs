use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Latin letters, digits, hyphen and underscore.
pub const SLUG_PATTERN: &str = "[-a-zA-Z0-9_]+";

static SLUG_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!("^{SLUG_PATTERN}$")).expect("slug pattern is a valid regex")
});

pub fn is_valid_slug(slug: &str) -> bool {
    SLUG_RE.is_match(slug)
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Category {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub slug: String,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
}
