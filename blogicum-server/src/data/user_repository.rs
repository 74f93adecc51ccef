use crate::data::db_error;
use crate::domain::error::DomainError;
use crate::domain::user::{NewUser, ProfileChanges, User};
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{error, info};

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: NewUser) -> Result<User, DomainError>;
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DomainError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, DomainError>;
    async fn update_profile(
        &self,
        id: i64,
        changes: ProfileChanges,
    ) -> Result<Option<User>, DomainError>;
}

const USERNAME_CONSTRAINT: &str = "users_username_key";

fn map_write_error(username: &str, e: sqlx::Error) -> DomainError {
    error!("failed to write user {}: {}", username, e);
    if e.as_database_error().and_then(|db| db.constraint()) == Some(USERNAME_CONSTRAINT) {
        DomainError::UserAlreadyExists(username.to_string())
    } else {
        DomainError::Internal(format!("database error: {}", e))
    }
}

#[derive(Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create(&self, user: NewUser) -> Result<User, DomainError> {
        let created = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, password_hash)
            VALUES ($1, $2)
            RETURNING id, username, email, first_name, last_name, password_hash, date_joined
            "#,
        )
        .bind(&user.username)
        .bind(&user.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error(&user.username, e))?;

        info!(user_id = created.id, username = %created.username, "user created");
        Ok(created)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DomainError> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, first_name, last_name, password_hash, date_joined
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("failed to find user by username"))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, DomainError> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, first_name, last_name, password_hash, date_joined
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("failed to find user by id"))
    }

    async fn update_profile(
        &self,
        id: i64,
        changes: ProfileChanges,
    ) -> Result<Option<User>, DomainError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET username = $1, first_name = $2, last_name = $3, email = $4
            WHERE id = $5
            RETURNING id, username, email, first_name, last_name, password_hash, date_joined
            "#,
        )
        .bind(&changes.username)
        .bind(&changes.first_name)
        .bind(&changes.last_name)
        .bind(&changes.email)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_write_error(&changes.username, e))?;

        if user.is_some() {
            info!(user_id = id, "profile updated");
        }
        Ok(user)
    }
}
