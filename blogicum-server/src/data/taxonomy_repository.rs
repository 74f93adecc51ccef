use crate::data::db_error;
use crate::domain::category::Category;
use crate::domain::error::DomainError;
use crate::domain::location::Location;
use async_trait::async_trait;
use sqlx::PgPool;

/// Read access to the categories and locations posts are filed under. Both are maintained
/// by administrators outside this service.
#[async_trait]
pub trait TaxonomyRepository: Send + Sync {
    async fn find_category_by_slug(&self, slug: &str) -> Result<Option<Category>, DomainError>;
    async fn find_category(&self, id: i64) -> Result<Option<Category>, DomainError>;
    async fn find_location(&self, id: i64) -> Result<Option<Location>, DomainError>;
    async fn list_categories(&self) -> Result<Vec<Category>, DomainError>;
    async fn list_locations(&self) -> Result<Vec<Location>, DomainError>;
}

#[derive(Clone)]
pub struct PostgresTaxonomyRepository {
    pool: PgPool,
}

impl PostgresTaxonomyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TaxonomyRepository for PostgresTaxonomyRepository {
    async fn find_category_by_slug(&self, slug: &str) -> Result<Option<Category>, DomainError> {
        sqlx::query_as::<_, Category>(
            r#"
            SELECT id, title, description, slug, is_published, created_at
            FROM categories
            WHERE slug = $1
            "#,
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("failed to find category by slug"))
    }

    async fn find_category(&self, id: i64) -> Result<Option<Category>, DomainError> {
        sqlx::query_as::<_, Category>(
            r#"
            SELECT id, title, description, slug, is_published, created_at
            FROM categories
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("failed to find category"))
    }

    async fn find_location(&self, id: i64) -> Result<Option<Location>, DomainError> {
        sqlx::query_as::<_, Location>(
            "SELECT id, name, is_published, created_at FROM locations WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("failed to find location"))
    }

    async fn list_categories(&self) -> Result<Vec<Category>, DomainError> {
        sqlx::query_as::<_, Category>(
            r#"
            SELECT id, title, description, slug, is_published, created_at
            FROM categories
            ORDER BY title
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("failed to list categories"))
    }

    async fn list_locations(&self) -> Result<Vec<Location>, DomainError> {
        sqlx::query_as::<_, Location>(
            "SELECT id, name, is_published, created_at FROM locations ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("failed to list locations"))
    }
}
