use actix_web::cookie::{Cookie, SameSite};
use actix_web::http::header::LOCATION;
use actix_web::{HttpRequest, HttpResponse, Scope, get, post, web};
use tracing::info;

use crate::application::auth_service::AuthService;
use crate::domain::error::DomainError;
use crate::presentation::dto::{AuthResponse, BlankFormContext};
use crate::presentation::forms::{LoginForm, RegistrationForm};
use crate::presentation::middleware::ACCESS_TOKEN_COOKIE;
use crate::presentation::utils::{redirect, request_id};

pub fn scope() -> Scope {
    web::scope("/auth")
        .service(registration_form)
        .service(register)
        .service(login_form)
        .service(login)
        .service(logout)
}

#[get("/registration/")]
async fn registration_form() -> HttpResponse {
    HttpResponse::Ok().json(BlankFormContext {
        fields: &["username", "password1", "password2"],
    })
}

#[post("/registration/")]
async fn register(
    req: HttpRequest,
    service: web::Data<AuthService>,
    form: web::Form<RegistrationForm>,
) -> Result<HttpResponse, DomainError> {
    let user = service.register(form.into_inner()).await?;

    info!(
        request_id = %request_id(&req),
        user_id = user.id,
        username = %user.username,
        "user registered"
    );

    Ok(redirect("/"))
}

#[get("/login/")]
async fn login_form() -> HttpResponse {
    HttpResponse::Ok().json(BlankFormContext {
        fields: &["username", "password"],
    })
}

#[post("/login/")]
async fn login(
    req: HttpRequest,
    service: web::Data<AuthService>,
    form: web::Form<LoginForm>,
) -> Result<HttpResponse, DomainError> {
    let (user, jwt) = service.login(form.into_inner()).await?;
    let expires_in = service.keys().expires_in();

    info!(
        request_id = %request_id(&req),
        username = %user.username,
        "user logged in"
    );

    let cookie = Cookie::build(ACCESS_TOKEN_COOKIE, jwt.clone())
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(actix_web::cookie::time::Duration::seconds(expires_in))
        .finish();

    Ok(HttpResponse::Ok().cookie(cookie).json(AuthResponse {
        access_token: jwt,
        expires_in,
        token_type: "Bearer".to_string(),
    }))
}

#[post("/logout/")]
async fn logout() -> HttpResponse {
    let mut cookie = Cookie::build(ACCESS_TOKEN_COOKIE, "").path("/").finish();
    cookie.make_removal();
    HttpResponse::Found()
        .insert_header((LOCATION, "/"))
        .cookie(cookie)
        .finish()
}
