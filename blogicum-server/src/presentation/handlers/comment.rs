use actix_web::{HttpRequest, HttpResponse, get, post, web};
use tracing::info;

use crate::application::comment_service::CommentService;
use crate::domain::comment::OwnedComment;
use crate::domain::error::DomainError;
use crate::presentation::dto::CommentFormContext;
use crate::presentation::forms::CommentForm;
use crate::presentation::utils::{AuthenticatedUser, post_detail_url, redirect, request_id};

fn owned(path: web::Path<(i64, i64)>, user: &AuthenticatedUser) -> OwnedComment {
    let (post_id, comment_id) = path.into_inner();
    OwnedComment {
        id: comment_id,
        post_id,
        author_id: user.id,
    }
}

#[get("/posts/{id:\\d+}/comment")]
async fn add_comment_form(
    _user: AuthenticatedUser,
    comments: web::Data<CommentService>,
    path: web::Path<i64>,
) -> Result<HttpResponse, DomainError> {
    let post = comments.target_post(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(CommentFormContext {
        post,
        form: Some(CommentForm::default()),
        comment: None,
    }))
}

#[post("/posts/{id:\\d+}/comment")]
async fn add_comment(
    req: HttpRequest,
    user: AuthenticatedUser,
    comments: web::Data<CommentService>,
    path: web::Path<i64>,
    form: web::Form<CommentForm>,
) -> Result<HttpResponse, DomainError> {
    let post_id = path.into_inner();
    let comment = comments
        .add_comment(post_id, user.id, form.into_inner())
        .await?;

    info!(
        request_id = %request_id(&req),
        username = %user.username,
        post_id,
        comment_id = comment.id,
        "comment added"
    );

    Ok(redirect(post_detail_url(post_id)))
}

#[get("/posts/{id:\\d+}/edit_comment/{comment_id:\\d+}/")]
async fn edit_comment_form(
    user: AuthenticatedUser,
    comments: web::Data<CommentService>,
    path: web::Path<(i64, i64)>,
) -> Result<HttpResponse, DomainError> {
    let (post, comment) = comments.owned_comment(owned(path, &user)).await?;
    Ok(HttpResponse::Ok().json(CommentFormContext {
        post,
        form: Some(CommentForm {
            text: comment.text.clone(),
        }),
        comment: Some(comment),
    }))
}

#[post("/posts/{id:\\d+}/edit_comment/{comment_id:\\d+}/")]
async fn edit_comment(
    req: HttpRequest,
    user: AuthenticatedUser,
    comments: web::Data<CommentService>,
    path: web::Path<(i64, i64)>,
    form: web::Form<CommentForm>,
) -> Result<HttpResponse, DomainError> {
    let key = owned(path, &user);
    comments.edit_comment(key, form.into_inner()).await?;

    info!(
        request_id = %request_id(&req),
        username = %user.username,
        post_id = key.post_id,
        comment_id = key.id,
        "comment updated"
    );

    Ok(redirect(post_detail_url(key.post_id)))
}

#[get("/posts/{id:\\d+}/delete_comment/{comment_id:\\d+}/")]
async fn delete_comment_form(
    user: AuthenticatedUser,
    comments: web::Data<CommentService>,
    path: web::Path<(i64, i64)>,
) -> Result<HttpResponse, DomainError> {
    let (post, comment) = comments.owned_comment(owned(path, &user)).await?;
    Ok(HttpResponse::Ok().json(CommentFormContext {
        post,
        form: None,
        comment: Some(comment),
    }))
}

#[post("/posts/{id:\\d+}/delete_comment/{comment_id:\\d+}/")]
async fn delete_comment(
    req: HttpRequest,
    user: AuthenticatedUser,
    comments: web::Data<CommentService>,
    path: web::Path<(i64, i64)>,
) -> Result<HttpResponse, DomainError> {
    let key = owned(path, &user);
    comments.delete_comment(key).await?;

    info!(
        request_id = %request_id(&req),
        username = %user.username,
        post_id = key.post_id,
        comment_id = key.id,
        "comment deleted"
    );

    Ok(redirect(post_detail_url(key.post_id)))
}
