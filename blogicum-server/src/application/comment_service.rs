use std::sync::Arc;

use tracing::instrument;

use crate::data::comment_repository::CommentRepository;
use crate::data::post_repository::PostRepository;
use crate::domain::comment::{Comment, OwnedComment};
use crate::domain::error::DomainError;
use crate::domain::post::Post;
use crate::presentation::forms::CommentForm;

#[derive(Clone)]
pub struct CommentService {
    comments: Arc<dyn CommentRepository>,
    posts: Arc<dyn PostRepository>,
}

impl CommentService {
    pub fn new(comments: Arc<dyn CommentRepository>, posts: Arc<dyn PostRepository>) -> Self {
        Self { comments, posts }
    }

    /// Comments can be left on any existing post, visible or not.
    pub async fn target_post(&self, post_id: i64) -> Result<Post, DomainError> {
        self.posts
            .find_by_id(post_id)
            .await?
            .ok_or(DomainError::PostNotFound(post_id))
    }

    pub async fn comments_for(&self, post_id: i64) -> Result<Vec<Comment>, DomainError> {
        self.comments.list_for_post(post_id).await
    }

    #[instrument(skip(self, form))]
    pub async fn add_comment(
        &self,
        post_id: i64,
        author_id: i64,
        form: CommentForm,
    ) -> Result<Comment, DomainError> {
        self.target_post(post_id).await?;
        let text = form.clean().map_err(DomainError::Validation)?;
        self.comments.create(post_id, author_id, text).await
    }

    /// The post together with one of the caller's own comments on it.
    pub async fn owned_comment(&self, key: OwnedComment) -> Result<(Post, Comment), DomainError> {
        let post = self.target_post(key.post_id).await?;
        let comment = self
            .comments
            .find_owned(key)
            .await?
            .ok_or(DomainError::CommentNotFound(key.id))?;
        Ok((post, comment))
    }

    #[instrument(skip(self, form))]
    pub async fn edit_comment(
        &self,
        key: OwnedComment,
        form: CommentForm,
    ) -> Result<Comment, DomainError> {
        self.owned_comment(key).await?;
        let text = form.clean().map_err(DomainError::Validation)?;
        self.comments
            .update(key, text)
            .await?
            .ok_or(DomainError::CommentNotFound(key.id))
    }

    #[instrument(skip(self))]
    pub async fn delete_comment(&self, key: OwnedComment) -> Result<(), DomainError> {
        self.target_post(key.post_id).await?;
        if self.comments.delete(key).await? {
            Ok(())
        } else {
            Err(DomainError::CommentNotFound(key.id))
        }
    }
}
