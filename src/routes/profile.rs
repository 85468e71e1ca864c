use axum::{Json, Router, extract::State, routing::get};

use crate::{
    dto::profile::UpdateProfileRequest,
    error::AppResult,
    middleware::auth::AuthUser,
    models::Profile,
    response::{ApiResponse, SeeOther},
    services::profile_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/profile/", get(get_profile).post(update_profile))
}

#[utoipa::path(
    get,
    path = "/profile/",
    responses(
        (status = 200, description = "Delivery profile of the caller", body = ApiResponse<Profile>)
    ),
    tag = "Profile"
)]
pub async fn get_profile(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<Profile>>> {
    let resp = profile_service::get_profile(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/profile/",
    request_body = UpdateProfileRequest,
    responses(
        (status = 303, description = "Profile saved; redirects to the profile", body = ApiResponse<Profile>),
        (status = 400, description = "Validation failed"),
    ),
    tag = "Profile"
)]
pub async fn update_profile(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> AppResult<SeeOther<Profile>> {
    let resp = profile_service::update_profile(&state, &user, payload).await?;
    Ok(SeeOther::new("/profile/", resp))
}
