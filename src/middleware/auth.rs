use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Response},
};
use tower_sessions::Session;
use uuid::Uuid;

use crate::{
    error::AppError,
    middleware::session::{self, CurrentUser},
    response::SeeOther,
};

pub const LOGIN_PATH: &str = "/login/";

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub username: String,
    pub email: String,
    pub role: String,
}

impl From<CurrentUser> for AuthUser {
    fn from(user: CurrentUser) -> Self {
        Self {
            user_id: user.id,
            username: user.username,
            email: user.email,
            role: user.role,
        }
    }
}

pub fn ensure_role(user: &AuthUser, role: &str) -> Result<(), AppError> {
    if user.role != role {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

pub fn ensure_admin(user: &AuthUser) -> Result<(), AppError> {
    ensure_role(user, "admin")
}

/// Rejection for protected handlers.
pub enum AuthRejection {
    /// Not logged in: send the caller to the login page.
    RedirectToLogin { next: String },
    /// The session layer is missing or the store failed.
    Session(AppError),
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            AuthRejection::RedirectToLogin { next } => SeeOther::with_message(
                format!("{LOGIN_PATH}?next={next}"),
                "Please log in to continue.",
            )
            .into_response(),
            AuthRejection::Session(err) => err.into_response(),
        }
    }
}

fn session_from_parts(parts: &Parts) -> Result<Session, AppError> {
    parts
        .extensions
        .get::<Session>()
        .cloned()
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("session layer is not installed")))
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = session_from_parts(parts).map_err(AuthRejection::Session)?;
        let user = session::current_user(&session)
            .await
            .map_err(AuthRejection::Session)?;

        match user {
            Some(user) => Ok(user.into()),
            None => Err(AuthRejection::RedirectToLogin {
                next: parts.uri.path().to_string(),
            }),
        }
    }
}

/// The logged-in user, if any. Never rejects for a missing login.
pub struct MaybeUser(pub Option<AuthUser>);

impl<S> FromRequestParts<S> for MaybeUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = session_from_parts(parts)?;
        let user = session::current_user(&session).await?;
        Ok(MaybeUser(user.map(AuthUser::from)))
    }
}
