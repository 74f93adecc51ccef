use actix_web::{HttpRequest, HttpResponse, get, post, web};
use tracing::info;

use crate::application::post_service::PostService;
use crate::domain::error::DomainError;
use crate::presentation::dto::{PostDeleteContext, PostFormContext};
use crate::presentation::forms::PostForm;
use crate::presentation::utils::{
    AuthenticatedUser, post_detail_url, profile_url, redirect, request_id,
};

#[get("/posts/create/")]
async fn create_post_form(
    _user: AuthenticatedUser,
    posts: web::Data<PostService>,
) -> Result<HttpResponse, DomainError> {
    let choices = posts.form_choices().await?;
    Ok(HttpResponse::Ok().json(PostFormContext {
        form: PostForm::default(),
        choices,
        post: None,
    }))
}

#[post("/posts/create/")]
async fn create_post(
    req: HttpRequest,
    user: AuthenticatedUser,
    posts: web::Data<PostService>,
    form: web::Form<PostForm>,
) -> Result<HttpResponse, DomainError> {
    let post = posts.create_post(user.id, form.into_inner()).await?;

    info!(
        request_id = %request_id(&req),
        username = %user.username,
        post_id = post.id,
        "post created"
    );

    Ok(redirect(profile_url(&user.username)))
}

#[get("/posts/{id:\\d+}/edit/")]
async fn edit_post_form(
    user: AuthenticatedUser,
    posts: web::Data<PostService>,
    path: web::Path<i64>,
) -> Result<HttpResponse, DomainError> {
    let post = posts.post_for_edit(path.into_inner(), user.id).await?;
    let choices = posts.form_choices().await?;
    Ok(HttpResponse::Ok().json(PostFormContext {
        form: PostForm::from(&post),
        choices,
        post: Some(post),
    }))
}

#[post("/posts/{id:\\d+}/edit/")]
async fn edit_post(
    req: HttpRequest,
    user: AuthenticatedUser,
    posts: web::Data<PostService>,
    path: web::Path<i64>,
    form: web::Form<PostForm>,
) -> Result<HttpResponse, DomainError> {
    let post_id = path.into_inner();
    posts.edit_post(post_id, user.id, form.into_inner()).await?;

    info!(
        request_id = %request_id(&req),
        username = %user.username,
        post_id,
        "post updated"
    );

    Ok(redirect(post_detail_url(post_id)))
}

#[get("/posts/{id:\\d+}/delete/")]
async fn delete_post_form(
    user: AuthenticatedUser,
    posts: web::Data<PostService>,
    path: web::Path<i64>,
) -> Result<HttpResponse, DomainError> {
    let post = posts.post_for_deletion(path.into_inner(), user.id).await?;
    Ok(HttpResponse::Ok().json(PostDeleteContext {
        form: PostForm::from(&post),
        post,
    }))
}

#[post("/posts/{id:\\d+}/delete/")]
async fn delete_post(
    req: HttpRequest,
    user: AuthenticatedUser,
    posts: web::Data<PostService>,
    path: web::Path<i64>,
) -> Result<HttpResponse, DomainError> {
    let post_id = path.into_inner();
    posts.delete_post(post_id, user.id).await?;

    info!(
        request_id = %request_id(&req),
        username = %user.username,
        post_id,
        "post deleted"
    );

    Ok(redirect(profile_url(&user.username)))
}
