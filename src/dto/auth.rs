use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Deserialize, Debug, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 150, message = "Enter a username of at most 150 characters."))]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[validate(length(min = 1, message = "This field is required."))]
    pub password: String,
    #[validate(must_match(other = "password", message = "Passwords do not match"))]
    pub confirm_password: String,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Blank form returned to anonymous callers on `GET`.
#[derive(Debug, Serialize, Default, ToSchema)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
}

#[derive(Debug, Serialize, Default, ToSchema)]
pub struct LoginForm {
    pub username: String,
    pub next: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct NextQuery {
    pub next: Option<String>,
}
