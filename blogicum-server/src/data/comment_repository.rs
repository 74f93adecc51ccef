use crate::data::db_error;
use crate::data::post_repository::recount_comments;
use crate::domain::comment::{Comment, OwnedComment};
use crate::domain::error::DomainError;
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::info;

/// Comment storage. Creating or deleting a comment also rebuilds the owning post's
/// `comment_count`, atomically with the comment row change.
#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn create(&self, post_id: i64, author_id: i64, text: String)
    -> Result<Comment, DomainError>;
    async fn find_owned(&self, key: OwnedComment) -> Result<Option<Comment>, DomainError>;
    async fn update(&self, key: OwnedComment, text: String)
    -> Result<Option<Comment>, DomainError>;
    async fn delete(&self, key: OwnedComment) -> Result<bool, DomainError>;
    /// Oldest first.
    async fn list_for_post(&self, post_id: i64) -> Result<Vec<Comment>, DomainError>;
}

const COMMENT_SELECT: &str = r#"
    SELECT cm.id, cm.text, cm.pub_date, cm.post_id, cm.author_id, u.username AS author_username
    FROM comments cm
    JOIN users u ON u.id = cm.author_id
"#;

#[derive(Clone)]
pub struct PostgresCommentRepository {
    pool: PgPool,
}

impl PostgresCommentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn create(
        &self,
        post_id: i64,
        author_id: i64,
        text: String,
    ) -> Result<Comment, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("failed to open transaction"))?;

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO comments (text, post_id, author_id)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(&text)
        .bind(post_id)
        .bind(author_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_error("failed to create comment"))?;

        let comment_count = recount_comments(&mut tx, post_id)
            .await
            .map_err(db_error("failed to refresh comment count"))?;

        let comment = sqlx::query_as::<_, Comment>(&format!("{COMMENT_SELECT} WHERE cm.id = $1"))
            .bind(id)
            .fetch_one(&mut *tx)
            .await
            .map_err(db_error("failed to load created comment"))?;

        tx.commit()
            .await
            .map_err(db_error("failed to commit comment"))?;

        info!(comment_id = id, post_id, author_id, comment_count, "comment created");
        Ok(comment)
    }

    async fn find_owned(&self, key: OwnedComment) -> Result<Option<Comment>, DomainError> {
        sqlx::query_as::<_, Comment>(&format!(
            "{COMMENT_SELECT} WHERE cm.id = $1 AND cm.post_id = $2 AND cm.author_id = $3"
        ))
        .bind(key.id)
        .bind(key.post_id)
        .bind(key.author_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("failed to find comment"))
    }

    async fn update(
        &self,
        key: OwnedComment,
        text: String,
    ) -> Result<Option<Comment>, DomainError> {
        let updated = sqlx::query(
            "UPDATE comments SET text = $1 WHERE id = $2 AND post_id = $3 AND author_id = $4",
        )
        .bind(&text)
        .bind(key.id)
        .bind(key.post_id)
        .bind(key.author_id)
        .execute(&self.pool)
        .await
        .map_err(db_error("failed to update comment"))?;

        if updated.rows_affected() == 0 {
            return Ok(None);
        }

        info!(comment_id = key.id, post_id = key.post_id, "comment updated");
        self.find_owned(key).await
    }

    async fn delete(&self, key: OwnedComment) -> Result<bool, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("failed to open transaction"))?;

        let deleted =
            sqlx::query("DELETE FROM comments WHERE id = $1 AND post_id = $2 AND author_id = $3")
                .bind(key.id)
                .bind(key.post_id)
                .bind(key.author_id)
                .execute(&mut *tx)
                .await
                .map_err(db_error("failed to delete comment"))?;

        if deleted.rows_affected() == 0 {
            return Ok(false);
        }

        let comment_count = recount_comments(&mut tx, key.post_id)
            .await
            .map_err(db_error("failed to refresh comment count"))?;

        tx.commit()
            .await
            .map_err(db_error("failed to commit comment deletion"))?;

        info!(comment_id = key.id, post_id = key.post_id, comment_count, "comment deleted");
        Ok(true)
    }

    async fn list_for_post(&self, post_id: i64) -> Result<Vec<Comment>, DomainError> {
        sqlx::query_as::<_, Comment>(&format!(
            "{COMMENT_SELECT} WHERE cm.post_id = $1 ORDER BY cm.pub_date ASC, cm.id ASC"
        ))
        .bind(post_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("failed to list comments"))
    }
}
