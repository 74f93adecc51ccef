use std::sync::Arc;

use tracing::instrument;

use crate::data::user_repository::UserRepository;
use crate::domain::error::{DomainError, FormErrors};
use crate::domain::user::{NewUser, User};
use crate::infrastructure::security::{JwtKeys, hash_password, verify_password};
use crate::presentation::forms::{LoginForm, RegistrationForm, USERNAME_TAKEN};

#[derive(Clone)]
pub struct AuthService {
    repo: Arc<dyn UserRepository>,
    keys: JwtKeys,
}

impl AuthService {
    pub fn new(repo: Arc<dyn UserRepository>, keys: JwtKeys) -> Self {
        Self { repo, keys }
    }

    pub fn keys(&self) -> &JwtKeys {
        &self.keys
    }

    pub async fn get_user(&self, id: i64) -> Result<User, DomainError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::UserNotFound(id.to_string()))
    }

    fn username_taken() -> DomainError {
        let mut errors = FormErrors::default();
        errors.add("username", USERNAME_TAKEN);
        DomainError::Validation(errors)
    }

    #[instrument(skip(self, form))]
    pub async fn register(&self, form: RegistrationForm) -> Result<User, DomainError> {
        let registration = form.clean().map_err(DomainError::Validation)?;
        if self
            .repo
            .find_by_username(&registration.username)
            .await?
            .is_some()
        {
            return Err(Self::username_taken());
        }

        let password_hash = hash_password(&registration.password)
            .map_err(|err| DomainError::Internal(err.to_string()))?;
        let user = NewUser {
            username: registration.username,
            password_hash,
        };
        match self.repo.create(user).await {
            Err(DomainError::UserAlreadyExists(_)) => Err(Self::username_taken()),
            other => other,
        }
    }

    /// Returns a signed access token for valid credentials.
    #[instrument(skip(self, form))]
    pub async fn login(&self, form: LoginForm) -> Result<(User, String), DomainError> {
        let (username, password) = form.clean().map_err(DomainError::Validation)?;
        let user = self
            .repo
            .find_by_username(&username)
            .await?
            .ok_or(DomainError::InvalidCredentials)?;

        let valid = verify_password(&password, &user.password_hash)
            .map_err(|_| DomainError::InvalidCredentials)?;
        if !valid {
            return Err(DomainError::InvalidCredentials);
        }

        let token = self
            .keys
            .generate_token(user.id)
            .map_err(|err| DomainError::Internal(err.to_string()))?;
        Ok((user, token))
    }
}
