use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::application::post_service::PostFormChoices;
use crate::domain::category::Category;
use crate::domain::comment::Comment;
use crate::domain::page::Page;
use crate::domain::post::Post;
use crate::domain::user::PublicProfile;
use crate::presentation::forms::{CommentForm, PostForm, ProfileForm};

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

// ======================= AUTH =======================

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub expires_in: i64,
    #[serde(rename = "token_type")]
    pub token_type: String,
}

/// Field names of a form whose values are never sent back to the client.
#[derive(Debug, Serialize)]
pub struct BlankFormContext {
    pub fields: &'static [&'static str],
}

// ======================= PAGES =======================

#[derive(Debug, Serialize)]
pub struct IndexContext {
    pub page_obj: Page<Post>,
}

#[derive(Debug, Serialize)]
pub struct CategoryContext {
    pub category: Category,
    pub page_obj: Page<Post>,
}

#[derive(Debug, Serialize)]
pub struct PostDetailContext {
    pub post: Post,
    pub comments: Vec<Comment>,
    pub form: CommentForm,
}

#[derive(Debug, Serialize)]
pub struct ProfileContext {
    pub profile: PublicProfile,
    pub page_obj: Page<Post>,
}

// ======================= FORMS =======================

#[derive(Debug, Serialize)]
pub struct PostFormContext {
    pub form: PostForm,
    pub choices: PostFormChoices,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post: Option<Post>,
}

#[derive(Debug, Serialize)]
pub struct PostDeleteContext {
    pub form: PostForm,
    pub post: Post,
}

#[derive(Debug, Serialize)]
pub struct CommentFormContext {
    pub post: Post,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub form: Option<CommentForm>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<Comment>,
}

#[derive(Debug, Serialize)]
pub struct ProfileFormContext {
    pub form: ProfileForm,
}

// ======================= Utils =======================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
}
