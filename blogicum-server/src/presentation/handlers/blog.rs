use actix_web::{HttpRequest, HttpResponse, get, web};
use tracing::info;

use crate::application::comment_service::CommentService;
use crate::application::post_service::PostService;
use crate::domain::error::DomainError;
use crate::presentation::dto::{CategoryContext, IndexContext, PageQuery, PostDetailContext};
use crate::presentation::forms::CommentForm;
use crate::presentation::utils::{AuthenticatedUser, request_id};

#[get("/")]
async fn index(
    req: HttpRequest,
    posts: web::Data<PostService>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, DomainError> {
    let page_obj = posts.index(query.page.as_deref()).await?;

    info!(
        request_id = %request_id(&req),
        page = page_obj.number,
        "index retrieved"
    );

    Ok(HttpResponse::Ok().json(IndexContext { page_obj }))
}

#[get("/category/{slug:[-a-zA-Z0-9_]+}/")]
async fn category_posts(
    posts: web::Data<PostService>,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, DomainError> {
    let slug = path.into_inner();
    let (category, page_obj) = posts.category_posts(&slug, query.page.as_deref()).await?;
    Ok(HttpResponse::Ok().json(CategoryContext { category, page_obj }))
}

#[get("/posts/{id:\\d+}/")]
async fn post_detail(
    viewer: Option<AuthenticatedUser>,
    posts: web::Data<PostService>,
    comments: web::Data<CommentService>,
    path: web::Path<i64>,
) -> Result<HttpResponse, DomainError> {
    let post_id = path.into_inner();
    let post = posts
        .post_detail(post_id, viewer.map(|user| user.id))
        .await?;
    let comments = comments.comments_for(post.id).await?;

    Ok(HttpResponse::Ok().json(PostDetailContext {
        post,
        comments,
        form: CommentForm::default(),
    }))
}
