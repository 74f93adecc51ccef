mod application;
mod data;
mod domain;
mod infrastructure;
mod presentation;
mod server;

use std::sync::Arc;

use anyhow::Context;
use data::comment_repository::PostgresCommentRepository;
use data::post_repository::PostgresPostRepository;
use data::taxonomy_repository::PostgresTaxonomyRepository;
use data::user_repository::PostgresUserRepository;
use infrastructure::config::AppConfig;
use infrastructure::database::{create_pool, run_migrations};
use infrastructure::logging::init_logging;
use infrastructure::security::JwtKeys;
use presentation::routes::Services;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let config = AppConfig::from_env().context("invalid configuration")?;
    let pool = create_pool(&config.database_url, config.database_max_connections)
        .await
        .context("failed to connect to database")?;
    run_migrations(&pool)
        .await
        .context("failed to run migrations")?;

    let services = Services::new(
        Arc::new(PostgresUserRepository::new(pool.clone())),
        Arc::new(PostgresPostRepository::new(pool.clone())),
        Arc::new(PostgresCommentRepository::new(pool.clone())),
        Arc::new(PostgresTaxonomyRepository::new(pool)),
        JwtKeys::new(config.jwt_secret.clone(), config.jwt_ttl_minutes),
    );

    server::start_http_server(config, services).await
}
