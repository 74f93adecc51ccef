pub mod auth;
pub mod blog;
pub mod comment;
pub mod post;
pub mod profile;

use actix_web::{HttpRequest, HttpResponse, Responder};
use chrono::Utc;
use serde_json::json;

use crate::presentation::dto::HealthResponse;

pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "ok",
        timestamp: Utc::now(),
    })
}

pub async fn not_found(req: HttpRequest) -> HttpResponse {
    HttpResponse::NotFound().json(json!({
        "error": "page not found",
        "details": { "path": req.path() }
    }))
}
