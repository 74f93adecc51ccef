use crate::data::db_error;
use crate::domain::error::DomainError;
use crate::domain::post::{Post, PostDraft, PostScope};
use async_trait::async_trait;
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};
use tracing::{debug, info};

#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn create(&self, author_id: i64, draft: PostDraft) -> Result<Post, DomainError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<Post>, DomainError>;
    async fn update(&self, id: i64, draft: PostDraft) -> Result<Option<Post>, DomainError>;
    /// Deletes the post only when `author_id` owns it. Comments go with it.
    async fn delete(&self, id: i64, author_id: i64) -> Result<bool, DomainError>;
    async fn count(&self, scope: &PostScope) -> Result<u64, DomainError>;
    /// Newest `pub_date` first.
    async fn list(
        &self,
        scope: &PostScope,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<Post>, DomainError>;
}

const POST_SELECT: &str = r#"
    SELECT p.id, p.title, p.text, p.pub_date, p.image, p.comment_count, p.is_published,
           p.created_at, p.author_id, u.username AS author_username,
           p.category_id, c.title AS category_title, c.slug AS category_slug,
           c.is_published AS category_is_published,
           p.location_id, l.name AS location_name, l.is_published AS location_is_published
    FROM posts p
    JOIN users u ON u.id = p.author_id
    LEFT JOIN categories c ON c.id = p.category_id
    LEFT JOIN locations l ON l.id = p.location_id
"#;

const POST_COUNT: &str = r#"
    SELECT COUNT(*)
    FROM posts p
    LEFT JOIN categories c ON c.id = p.category_id
"#;

fn push_scope(query: &mut QueryBuilder<'_, Postgres>, scope: &PostScope) {
    match *scope {
        PostScope::Visible { now } => {
            query
                .push(" WHERE p.is_published AND p.pub_date <= ")
                .push_bind(now)
                .push(" AND (p.category_id IS NULL OR c.is_published)");
        }
        PostScope::Category { category_id, now } => {
            query
                .push(" WHERE p.category_id = ")
                .push_bind(category_id)
                .push(" AND p.is_published AND p.pub_date <= ")
                .push_bind(now);
        }
        PostScope::Author { author_id } => {
            query.push(" WHERE p.author_id = ").push_bind(author_id);
        }
    }
}

/// Rebuilds `posts.comment_count` from the comment rows. Runs on the caller's connection so it
/// shares the transaction of the comment mutation that triggered it.
pub(crate) async fn recount_comments(
    conn: &mut PgConnection,
    post_id: i64,
) -> Result<i32, sqlx::Error> {
    let count: i32 = sqlx::query_scalar(
        r#"
        UPDATE posts
        SET comment_count = (SELECT COUNT(*) FROM comments WHERE post_id = $1)::INTEGER
        WHERE id = $1
        RETURNING comment_count
        "#,
    )
    .bind(post_id)
    .fetch_one(conn)
    .await?;
    debug!(post_id, comment_count = count, "comment count refreshed");
    Ok(count)
}

#[derive(Clone)]
pub struct PostgresPostRepository {
    pool: PgPool,
}

impl PostgresPostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn create(&self, author_id: i64, draft: PostDraft) -> Result<Post, DomainError> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO posts (title, text, pub_date, image, author_id, category_id, location_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(&draft.title)
        .bind(&draft.text)
        .bind(draft.pub_date)
        .bind(&draft.image)
        .bind(author_id)
        .bind(draft.category_id)
        .bind(draft.location_id)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("failed to create post"))?;

        info!(post_id = id, author_id, "post created");
        self.find_by_id(id)
            .await?
            .ok_or(DomainError::PostNotFound(id))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Post>, DomainError> {
        sqlx::query_as::<_, Post>(&format!("{POST_SELECT} WHERE p.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("failed to find post by id"))
    }

    async fn update(&self, id: i64, draft: PostDraft) -> Result<Option<Post>, DomainError> {
        let updated = sqlx::query(
            r#"
            UPDATE posts
            SET
                title = $1,
                text = $2,
                pub_date = $3,
                image = CASE WHEN $8 THEN NULL ELSE COALESCE($4, image) END,
                category_id = $5,
                location_id = $6
            WHERE id = $7
            "#,
        )
        .bind(&draft.title)
        .bind(&draft.text)
        .bind(draft.pub_date)
        .bind(&draft.image)
        .bind(draft.category_id)
        .bind(draft.location_id)
        .bind(id)
        .bind(draft.clear_image)
        .execute(&self.pool)
        .await
        .map_err(db_error("failed to update post"))?;

        if updated.rows_affected() == 0 {
            return Ok(None);
        }

        info!(post_id = id, "post updated");
        self.find_by_id(id).await
    }

    async fn delete(&self, id: i64, author_id: i64) -> Result<bool, DomainError> {
        let deleted = sqlx::query("DELETE FROM posts WHERE id = $1 AND author_id = $2")
            .bind(id)
            .bind(author_id)
            .execute(&self.pool)
            .await
            .map_err(db_error("failed to delete post"))?;

        let removed = deleted.rows_affected() > 0;
        if removed {
            info!(post_id = id, author_id, "post deleted");
        }
        Ok(removed)
    }

    async fn count(&self, scope: &PostScope) -> Result<u64, DomainError> {
        let mut query = QueryBuilder::<Postgres>::new(POST_COUNT);
        push_scope(&mut query, scope);
        let count: i64 = query
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("failed to count posts"))?;
        Ok(count.max(0) as u64)
    }

    async fn list(
        &self,
        scope: &PostScope,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<Post>, DomainError> {
        let mut query = QueryBuilder::<Postgres>::new(POST_SELECT);
        push_scope(&mut query, scope);
        query
            .push(" ORDER BY p.pub_date DESC, p.id DESC LIMIT ")
            .push_bind(limit as i64)
            .push(" OFFSET ")
            .push_bind(offset as i64);

        query
            .build_query_as::<Post>()
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("failed to list posts"))
    }
}
