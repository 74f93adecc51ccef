use actix_web::dev::Payload;
use actix_web::http::header::LOCATION;
use actix_web::{FromRequest, HttpMessage, HttpRequest, HttpResponse};
use futures_util::future::{Ready, ready};

use crate::application::auth_service::AuthService;
use crate::domain::error::DomainError;
use crate::infrastructure::security::JwtKeys;
use crate::presentation::middleware::RequestId;

/// The caller, resolved from a valid access token by `JwtAuthMiddleware`. Extracting it on a
/// route makes the route login-only: anonymous callers are redirected to the login page.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub id: i64,
    pub username: String,
}

impl FromRequest for AuthenticatedUser {
    type Error = DomainError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        match req.extensions().get::<AuthenticatedUser>() {
            Some(user) => ready(Ok(user.clone())),
            None => ready(Err(DomainError::LoginRequired {
                next: req
                    .uri()
                    .path_and_query()
                    .map(|pq| pq.as_str())
                    .unwrap_or_else(|| req.path())
                    .to_string(),
            })),
        }
    }
}

/// `Ok(None)` for a bad token or a user that no longer exists; storage failures propagate.
pub async fn extract_user_from_token(
    token: &str,
    keys: &JwtKeys,
    auth_service: &AuthService,
) -> Result<Option<AuthenticatedUser>, DomainError> {
    let Some(user_id) = keys.verify_token(token).ok().and_then(|c| c.user_id()) else {
        return Ok(None);
    };

    match auth_service.get_user(user_id).await {
        Ok(user) => Ok(Some(AuthenticatedUser {
            id: user.id,
            username: user.username,
        })),
        Err(DomainError::UserNotFound(_)) => Ok(None),
        Err(e) => Err(e),
    }
}

pub fn redirect(location: impl Into<String>) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((LOCATION, location.into()))
        .finish()
}

pub fn post_detail_url(post_id: i64) -> String {
    format!("/posts/{post_id}/")
}

pub fn profile_url(username: &str) -> String {
    format!("/profile/{username}/")
}

pub fn request_id(req: &HttpRequest) -> String {
    req.extensions()
        .get::<RequestId>()
        .map(|rid| rid.0.clone())
        .unwrap_or_else(|| "unknown".into())
}
