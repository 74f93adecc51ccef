use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Comment {
    pub id: i64,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub post_id: i64,
    pub author_id: i64,
    pub author_username: String,
}

/// Lookup key for a comment as seen by its author; any other caller gets nothing back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OwnedComment {
    pub id: i64,
    pub post_id: i64,
    pub author_id: i64,
}
