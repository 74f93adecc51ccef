use std::borrow::Cow;

use chrono::{DateTime, NaiveDateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidateEmail, ValidationError};

use crate::domain::error::FormErrors;
use crate::domain::post::{Post, PostDraft};
use crate::domain::user::{ProfileChanges, User};

pub const REQUIRED: &str = "This field is required.";
pub const INVALID_CHOICE: &str =
    "Select a valid choice. That choice is not one of the available choices.";
pub const INVALID_DATETIME: &str = "Enter a valid date/time.";
pub const IMAGE_CONTRADICTION: &str =
    "Please either submit a file or check the clear checkbox, not both.";
pub const USERNAME_TAKEN: &str = "A user with that username already exists.";

const PUB_DATE_INPUT_FORMAT: &str = "%Y-%m-%dT%H:%M";
const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
];

static USERNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\w.@+-]+$").expect("username pattern is a valid regex"));

fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error
}

fn validate_required(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(invalid("required", REQUIRED))
    } else {
        Ok(())
    }
}

fn validate_username(value: &str) -> Result<(), ValidationError> {
    validate_required(value)?;
    if USERNAME_RE.is_match(value) {
        Ok(())
    } else {
        Err(invalid(
            "invalid_username",
            "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
        ))
    }
}

fn validate_optional_email(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() || value.validate_email() {
        Ok(())
    } else {
        Err(invalid("email", "Enter a valid email address."))
    }
}

fn validate_password(value: &str) -> Result<(), ValidationError> {
    validate_required(value)?;
    if value.chars().count() < 8 {
        return Err(invalid(
            "password_too_short",
            "This password is too short. It must contain at least 8 characters.",
        ));
    }
    if value.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid(
            "password_entirely_numeric",
            "This password is entirely numeric.",
        ));
    }
    Ok(())
}

/// Accepts `datetime-local` input values as well as RFC 3339 timestamps. Naive values are UTC.
pub fn parse_pub_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|naive| naive.and_utc())
}

fn parse_choice(value: Option<&str>) -> Result<Option<i64>, ()> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => raw.parse::<i64>().map(Some).map_err(|_| ()),
    }
}

fn trimmed(value: &str) -> String {
    value.trim().to_string()
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct PostForm {
    #[validate(
        custom(function = "validate_required"),
        length(max = 256, message = "Ensure this value has at most 256 characters.")
    )]
    pub title: String,
    #[validate(custom(function = "validate_required"))]
    pub text: String,
    #[validate(custom(function = "validate_required"))]
    pub pub_date: String,
    pub category: Option<String>,
    pub location: Option<String>,
    #[validate(length(max = 100, message = "Ensure this value has at most 100 characters."))]
    pub image: Option<String>,
    /// The "clear" checkbox next to the current image.
    #[serde(rename = "image-clear", skip_serializing)]
    pub image_clear: Option<String>,
}

impl PostForm {
    /// Field-level checks only; whether the chosen category and location exist is up to the
    /// caller.
    pub fn clean(self) -> Result<PostDraft, FormErrors> {
        let form = PostForm {
            title: trimmed(&self.title),
            text: trimmed(&self.text),
            pub_date: trimmed(&self.pub_date),
            category: blank_to_none(self.category),
            location: blank_to_none(self.location),
            image: blank_to_none(self.image),
            image_clear: blank_to_none(self.image_clear),
        };

        let mut errors = form
            .validate()
            .err()
            .map(FormErrors::from)
            .unwrap_or_default();

        let pub_date = if form.pub_date.is_empty() {
            None
        } else {
            let parsed = parse_pub_date(&form.pub_date);
            if parsed.is_none() {
                errors.add("pub_date", INVALID_DATETIME);
            }
            parsed
        };
        let category_id = parse_choice(form.category.as_deref()).unwrap_or_else(|_| {
            errors.add("category", INVALID_CHOICE);
            None
        });
        let location_id = parse_choice(form.location.as_deref()).unwrap_or_else(|_| {
            errors.add("location", INVALID_CHOICE);
            None
        });
        let clear_image = form.image_clear.is_some();
        if clear_image && form.image.is_some() {
            errors.add("image", IMAGE_CONTRADICTION);
        }

        match pub_date {
            Some(pub_date) if errors.is_empty() => Ok(PostDraft {
                title: form.title,
                text: form.text,
                pub_date,
                category_id,
                location_id,
                image: form.image,
                clear_image,
            }),
            _ => Err(errors),
        }
    }
}

impl From<&Post> for PostForm {
    fn from(post: &Post) -> Self {
        Self {
            title: post.title.clone(),
            text: post.text.clone(),
            pub_date: post.pub_date.format(PUB_DATE_INPUT_FORMAT).to_string(),
            category: post.category_id.map(|id| id.to_string()),
            location: post.location_id.map(|id| id.to_string()),
            image: post.image.clone(),
            image_clear: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct CommentForm {
    #[validate(custom(function = "validate_required"))]
    pub text: String,
}

impl CommentForm {
    pub fn clean(self) -> Result<String, FormErrors> {
        let form = CommentForm {
            text: trimmed(&self.text),
        };
        form.validate().map_err(FormErrors::from)?;
        Ok(form.text)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ProfileForm {
    #[validate(
        custom(function = "validate_username"),
        length(max = 150, message = "Ensure this value has at most 150 characters.")
    )]
    pub username: String,
    #[validate(length(max = 150, message = "Ensure this value has at most 150 characters."))]
    pub first_name: String,
    #[validate(length(max = 150, message = "Ensure this value has at most 150 characters."))]
    pub last_name: String,
    #[validate(
        custom(function = "validate_optional_email"),
        length(max = 254, message = "Ensure this value has at most 254 characters.")
    )]
    pub email: String,
}

impl ProfileForm {
    pub fn clean(self) -> Result<ProfileChanges, FormErrors> {
        let form = ProfileForm {
            username: trimmed(&self.username),
            first_name: trimmed(&self.first_name),
            last_name: trimmed(&self.last_name),
            email: trimmed(&self.email),
        };
        form.validate().map_err(FormErrors::from)?;
        Ok(ProfileChanges {
            username: form.username,
            first_name: form.first_name,
            last_name: form.last_name,
            email: form.email,
        })
    }
}

impl From<&User> for ProfileForm {
    fn from(user: &User) -> Self {
        Self {
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
        }
    }
}

/// Account sign-up. Passwords are never echoed back in a form context.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct RegistrationForm {
    #[validate(
        custom(function = "validate_username"),
        length(max = 150, message = "Ensure this value has at most 150 characters.")
    )]
    pub username: String,
    #[validate(custom(function = "validate_password"))]
    pub password1: String,
    #[validate(custom(function = "validate_required"))]
    pub password2: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub username: String,
    pub password: String,
}

impl RegistrationForm {
    pub fn clean(self) -> Result<Registration, FormErrors> {
        let form = RegistrationForm {
            username: trimmed(&self.username),
            ..self
        };
        let mut errors = form
            .validate()
            .err()
            .map(FormErrors::from)
            .unwrap_or_default();
        if !form.password2.is_empty() && form.password1 != form.password2 {
            errors.add("password2", "The two password fields didn’t match.");
        }
        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(Registration {
            username: form.username,
            password: form.password1,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct LoginForm {
    #[validate(custom(function = "validate_required"))]
    pub username: String,
    #[validate(custom(function = "validate_required"))]
    pub password: String,
}

impl LoginForm {
    pub fn clean(self) -> Result<(String, String), FormErrors> {
        self.validate().map_err(FormErrors::from)?;
        Ok((trimmed(&self.username), self.password))
    }
}
