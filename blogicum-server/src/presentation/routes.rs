use std::sync::Arc;

use actix_web::web;

use crate::application::auth_service::AuthService;
use crate::application::comment_service::CommentService;
use crate::application::post_service::PostService;
use crate::application::profile_service::ProfileService;
use crate::data::comment_repository::CommentRepository;
use crate::data::post_repository::PostRepository;
use crate::data::taxonomy_repository::TaxonomyRepository;
use crate::data::user_repository::UserRepository;
use crate::infrastructure::security::JwtKeys;
use crate::presentation::handlers;
use crate::presentation::middleware::JwtAuthMiddleware;

/// Application services shared by every worker.
#[derive(Clone)]
pub struct Services {
    pub auth: AuthService,
    pub posts: PostService,
    pub comments: CommentService,
    pub profiles: ProfileService,
}

impl Services {
    pub fn new(
        users: Arc<dyn UserRepository>,
        posts: Arc<dyn PostRepository>,
        comments: Arc<dyn CommentRepository>,
        taxonomy: Arc<dyn TaxonomyRepository>,
        keys: JwtKeys,
    ) -> Self {
        let post_service = PostService::new(Arc::clone(&posts), taxonomy);
        Self {
            auth: AuthService::new(Arc::clone(&users), keys),
            comments: CommentService::new(comments, posts),
            profiles: ProfileService::new(users, post_service.clone()),
            posts: post_service,
        }
    }
}

pub fn configure(services: Services) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        cfg.app_data(web::Data::new(services.auth.clone()))
            .app_data(web::Data::new(services.posts.clone()))
            .app_data(web::Data::new(services.comments.clone()))
            .app_data(web::Data::new(services.profiles.clone()))
            .route("/health", web::get().to(handlers::health))
            .service(
                web::scope("")
                    .wrap(JwtAuthMiddleware::new(services.auth.clone()))
                    .service(handlers::auth::scope())
                    .service(handlers::blog::index)
                    .service(handlers::blog::category_posts)
                    .service(handlers::blog::post_detail)
                    .service(handlers::post::create_post_form)
                    .service(handlers::post::create_post)
                    .service(handlers::post::edit_post_form)
                    .service(handlers::post::edit_post)
                    .service(handlers::post::delete_post_form)
                    .service(handlers::post::delete_post)
                    .service(handlers::comment::add_comment_form)
                    .service(handlers::comment::add_comment)
                    .service(handlers::comment::edit_comment_form)
                    .service(handlers::comment::edit_comment)
                    .service(handlers::comment::delete_comment_form)
                    .service(handlers::comment::delete_comment)
                    // must precede the `{username}` route
                    .service(handlers::profile::edit_profile_form)
                    .service(handlers::profile::edit_profile)
                    .service(handlers::profile::profile),
            );
    }
}
