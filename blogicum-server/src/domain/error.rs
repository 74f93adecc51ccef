use std::collections::BTreeMap;

use actix_web::http::header::LOCATION;
use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use validator::ValidationErrors;

pub const LOGIN_PATH: &str = "/auth/login/";

/// Field name -> messages, in the shape a form template would render inline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FormErrors(BTreeMap<String, Vec<String>>);

impl FormErrors {
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn field(&self, name: &str) -> Option<&[String]> {
        self.0.get(name).map(Vec::as_slice)
    }

    pub fn into_result(self) -> Result<(), DomainError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(DomainError::Validation(self))
        }
    }
}

impl From<ValidationErrors> for FormErrors {
    fn from(errors: ValidationErrors) -> Self {
        let mut form = FormErrors::default();
        for (field, field_errors) in errors.field_errors() {
            for error in field_errors {
                let message = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| error.code.to_string());
                form.add(field.to_string(), message);
            }
        }
        form
    }
}

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("user not found: {0}")]
    UserNotFound(String),
    #[error("user already exists: {0}")]
    UserAlreadyExists(String),
    #[error("post not found: {0}")]
    PostNotFound(i64),
    #[error("comment not found: {0}")]
    CommentNotFound(i64),
    #[error("category not found: {0}")]
    CategoryNotFound(String),
    #[error("validation failed")]
    Validation(FormErrors),
    #[error("login required")]
    LoginRequired { next: String },
    #[error("only the author can edit post {post_id}")]
    NotAuthor { post_id: i64 },
    #[error("invalid username or password")]
    InvalidCredentials,
    #[error("internal error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

impl ResponseError for DomainError {
    fn status_code(&self) -> StatusCode {
        match self {
            DomainError::UserNotFound(_)
            | DomainError::PostNotFound(_)
            | DomainError::CommentNotFound(_)
            | DomainError::CategoryNotFound(_) => StatusCode::NOT_FOUND,
            DomainError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            DomainError::LoginRequired { .. } | DomainError::NotAuthor { .. } => StatusCode::FOUND,
            DomainError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            DomainError::UserAlreadyExists(_) => StatusCode::CONFLICT,
            DomainError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            DomainError::LoginRequired { next } => {
                return HttpResponse::Found()
                    .insert_header((LOCATION, format!(
                        "{LOGIN_PATH}?next={}",
                        urlencoding::encode(next)
                    )))
                    .finish();
            }
            DomainError::NotAuthor { post_id } => {
                return HttpResponse::Found()
                    .insert_header((LOCATION, format!("/posts/{post_id}/")))
                    .finish();
            }
            _ => {}
        }

        let message = match self {
            DomainError::Internal(detail) => {
                tracing::error!(detail = %detail, "internal error");
                "internal server error".to_string()
            }
            other => other.to_string(),
        };
        let details = match self {
            DomainError::PostNotFound(id) | DomainError::CommentNotFound(id) => {
                Some(json!({ "resource": id }))
            }
            DomainError::UserNotFound(key) | DomainError::CategoryNotFound(key) => {
                Some(json!({ "resource": key }))
            }
            DomainError::Validation(fields) => Some(json!({ "fields": fields })),
            _ => None,
        };
        let body = ErrorBody {
            error: message.as_str(),
            details,
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}
