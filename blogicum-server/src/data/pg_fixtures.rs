//! Seed helpers for repository tests that run against a real PostgreSQL database.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::data::post_repository::{PostRepository, PostgresPostRepository};
use crate::data::user_repository::{PostgresUserRepository, UserRepository};
use crate::domain::post::{Post, PostDraft};
use crate::domain::user::{NewUser, User};

pub async fn user(pool: &PgPool, username: &str) -> User {
    PostgresUserRepository::new(pool.clone())
        .create(NewUser {
            username: username.to_string(),
            password_hash: "unused".to_string(),
        })
        .await
        .unwrap()
}

pub async fn category(pool: &PgPool, slug: &str, is_published: bool) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO categories (title, description, slug, is_published) \
         VALUES ($1, '', $1, $2) RETURNING id",
    )
    .bind(slug)
    .bind(is_published)
    .fetch_one(pool)
    .await
    .unwrap()
}

pub fn draft(title: &str, pub_date: DateTime<Utc>, category_id: Option<i64>) -> PostDraft {
    PostDraft {
        title: title.to_string(),
        text: "text".to_string(),
        pub_date,
        category_id,
        location_id: None,
        image: None,
        clear_image: false,
    }
}

pub async fn post(pool: &PgPool, author: &User, draft: PostDraft) -> Post {
    PostgresPostRepository::new(pool.clone())
        .create(author.id, draft)
        .await
        .unwrap()
}

pub async fn unpublish(pool: &PgPool, post_id: i64) {
    sqlx::query("UPDATE posts SET is_published = FALSE WHERE id = $1")
        .bind(post_id)
        .execute(pool)
        .await
        .unwrap();
}
