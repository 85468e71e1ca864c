use axum::{
    Json, Router,
    extract::{Query, State},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_sessions::Session;

use crate::{
    dto::auth::{LoginForm, LoginRequest, NextQuery, RegisterForm, RegisterRequest},
    error::AppResult,
    middleware::{auth::MaybeUser, session},
    response::{ApiResponse, SeeOther},
    services::auth_service::{authenticate, register_user},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register/", get(register_form).post(register))
        .route("/login/", get(login_form).post(login))
        .route("/logout/", post(logout))
}

/// Only relative paths are followed after login.
fn safe_next(next: Option<String>) -> String {
    match next {
        Some(path) if path.starts_with('/') && !path.starts_with("//") => path,
        _ => "/".to_string(),
    }
}

fn already_logged_in() -> Response {
    SeeOther::with_message("/", "You are already logged in.").into_response()
}

#[utoipa::path(
    get,
    path = "/register/",
    responses(
        (status = 200, description = "Blank registration form", body = ApiResponse<RegisterForm>),
        (status = 303, description = "Already logged in"),
    ),
    tag = "Auth"
)]
pub async fn register_form(MaybeUser(user): MaybeUser) -> Response {
    if user.is_some() {
        return already_logged_in();
    }
    Json(ApiResponse::success("Register", RegisterForm::default(), None)).into_response()
}

#[utoipa::path(
    post,
    path = "/register/",
    request_body = RegisterRequest,
    responses(
        (status = 303, description = "Account created; redirects to login"),
        (status = 400, description = "Validation failed"),
    ),
    tag = "Auth"
)]
pub async fn register(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    Json(payload): Json<RegisterRequest>,
) -> AppResult<Response> {
    if user.is_some() {
        return Ok(already_logged_in());
    }
    let resp = register_user(&state, payload).await?;
    Ok(SeeOther::new("/login/", resp).into_response())
}

#[utoipa::path(
    get,
    path = "/login/",
    params(
        ("next" = Option<String>, Query, description = "Path to return to after login")
    ),
    responses(
        (status = 200, description = "Blank login form", body = ApiResponse<LoginForm>),
        (status = 303, description = "Already logged in"),
    ),
    tag = "Auth"
)]
pub async fn login_form(MaybeUser(user): MaybeUser, Query(query): Query<NextQuery>) -> Response {
    if user.is_some() {
        return already_logged_in();
    }
    let form = LoginForm {
        username: String::new(),
        next: query.next,
    };
    Json(ApiResponse::success("Login", form, None)).into_response()
}

#[utoipa::path(
    post,
    path = "/login/",
    params(
        ("next" = Option<String>, Query, description = "Path to return to after login")
    ),
    request_body = LoginRequest,
    responses(
        (status = 303, description = "Logged in"),
        (status = 400, description = "Invalid credentials"),
    ),
    tag = "Auth"
)]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    MaybeUser(user): MaybeUser,
    Query(query): Query<NextQuery>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Response> {
    if user.is_some() {
        return Ok(already_logged_in());
    }
    let current = authenticate(&state, payload).await?;
    let username = current.username.clone();
    session::login(&session, current).await?;
    Ok(SeeOther::with_message(safe_next(query.next), format!("Welcome, {username}!")).into_response())
}

#[utoipa::path(
    post,
    path = "/logout/",
    responses(
        (status = 303, description = "Session discarded"),
    ),
    tag = "Auth"
)]
pub async fn logout(session: Session) -> AppResult<SeeOther<serde_json::Value>> {
    session::logout(&session).await?;
    Ok(SeeOther::with_message("/", "Logged out."))
}
