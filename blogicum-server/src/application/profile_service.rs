use std::sync::Arc;

use tracing::instrument;

use crate::application::post_service::PostService;
use crate::data::user_repository::UserRepository;
use crate::domain::error::{DomainError, FormErrors};
use crate::domain::page::Page;
use crate::domain::post::{Post, PostScope};
use crate::domain::user::User;
use crate::presentation::forms::{ProfileForm, USERNAME_TAKEN};

#[derive(Clone)]
pub struct ProfileService {
    users: Arc<dyn UserRepository>,
    posts: PostService,
}

impl ProfileService {
    pub fn new(users: Arc<dyn UserRepository>, posts: PostService) -> Self {
        Self { users, posts }
    }

    /// A user's public page lists all of their posts, including hidden and scheduled ones.
    pub async fn profile(
        &self,
        username: &str,
        page: Option<&str>,
    ) -> Result<(User, Page<Post>), DomainError> {
        let user = self
            .users
            .find_by_username(username)
            .await?
            .ok_or_else(|| DomainError::UserNotFound(username.to_string()))?;
        let posts = self
            .posts
            .page(PostScope::Author { author_id: user.id }, page)
            .await?;
        Ok((user, posts))
    }

    pub async fn current_user(&self, id: i64) -> Result<User, DomainError> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::UserNotFound(id.to_string()))
    }

    #[instrument(skip(self, form))]
    pub async fn edit_profile(&self, user_id: i64, form: ProfileForm) -> Result<User, DomainError> {
        let changes = form.clean().map_err(DomainError::Validation)?;

        let taken = self
            .users
            .find_by_username(&changes.username)
            .await?
            .is_some_and(|existing| existing.id != user_id);
        if taken {
            let mut errors = FormErrors::default();
            errors.add("username", USERNAME_TAKEN);
            return Err(DomainError::Validation(errors));
        }

        match self.users.update_profile(user_id, changes).await {
            Ok(Some(user)) => Ok(user),
            Ok(None) => Err(DomainError::UserNotFound(user_id.to_string())),
            Err(DomainError::UserAlreadyExists(_)) => {
                let mut errors = FormErrors::default();
                errors.add("username", USERNAME_TAKEN);
                Err(DomainError::Validation(errors))
            }
            Err(e) => Err(e),
        }
    }
}
