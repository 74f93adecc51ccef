use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A post joined with the author, category and location it references.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub image: Option<String>,
    pub comment_count: i32,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub author_id: i64,
    pub author_username: String,
    pub category_id: Option<i64>,
    pub category_title: Option<String>,
    pub category_slug: Option<String>,
    pub category_is_published: Option<bool>,
    pub location_id: Option<i64>,
    pub location_name: Option<String>,
    pub location_is_published: Option<bool>,
}

impl Post {
    /// Published, no longer scheduled, and not filed under a hidden category.
    pub fn is_visible(&self, now: DateTime<Utc>) -> bool {
        self.is_published && self.pub_date <= now && self.category_is_published.unwrap_or(true)
    }

    pub fn is_authored_by(&self, user_id: i64) -> bool {
        self.author_id == user_id
    }
}

/// The author-editable fields of a post, already validated.
#[derive(Debug, Clone, PartialEq)]
pub struct PostDraft {
    pub title: String,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub category_id: Option<i64>,
    pub location_id: Option<i64>,
    /// A new file name; `None` keeps whatever the post already has.
    pub image: Option<String>,
    /// Drops the current image on edit.
    pub clear_image: bool,
}

/// Which posts a listing may show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostScope {
    /// Everything an anonymous reader may see.
    Visible { now: DateTime<Utc> },
    /// Visible posts of one category; the category itself is checked by the caller.
    Category { category_id: i64, now: DateTime<Utc> },
    /// Every post of one author, hidden or scheduled ones included.
    Author { author_id: i64 },
}

/// The in-process twin of the SQL filter in `post_repository::push_scope`.
#[cfg(test)]
impl PostScope {
    pub fn admits(&self, post: &Post) -> bool {
        match *self {
            PostScope::Visible { now } => post.is_visible(now),
            PostScope::Category { category_id, now } => {
                post.category_id == Some(category_id) && post.is_published && post.pub_date <= now
            }
            PostScope::Author { author_id } => post.author_id == author_id,
        }
    }
}
