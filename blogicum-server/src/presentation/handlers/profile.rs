use actix_web::{HttpRequest, HttpResponse, get, post, web};
use tracing::info;

use crate::application::profile_service::ProfileService;
use crate::domain::error::DomainError;
use crate::domain::user::PublicProfile;
use crate::presentation::dto::{PageQuery, ProfileContext, ProfileFormContext};
use crate::presentation::forms::ProfileForm;
use crate::presentation::utils::{AuthenticatedUser, profile_url, redirect, request_id};

#[get("/profile/edit_profile/")]
async fn edit_profile_form(
    user: AuthenticatedUser,
    profiles: web::Data<ProfileService>,
) -> Result<HttpResponse, DomainError> {
    let current = profiles.current_user(user.id).await?;
    Ok(HttpResponse::Ok().json(ProfileFormContext {
        form: ProfileForm::from(&current),
    }))
}

#[post("/profile/edit_profile/")]
async fn edit_profile(
    req: HttpRequest,
    user: AuthenticatedUser,
    profiles: web::Data<ProfileService>,
    form: web::Form<ProfileForm>,
) -> Result<HttpResponse, DomainError> {
    let updated = profiles.edit_profile(user.id, form.into_inner()).await?;

    info!(
        request_id = %request_id(&req),
        user_id = updated.id,
        username = %updated.username,
        "profile updated"
    );

    Ok(redirect(profile_url(&updated.username)))
}

#[get("/profile/{username}/")]
async fn profile(
    profiles: web::Data<ProfileService>,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, DomainError> {
    let username = path.into_inner();
    let (user, page_obj) = profiles
        .profile(&username, query.page.as_deref())
        .await?;
    Ok(HttpResponse::Ok().json(ProfileContext {
        profile: PublicProfile::from(&user),
        page_obj,
    }))
}
