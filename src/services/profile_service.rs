use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, Set,
    sea_query::OnConflict,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::profile::UpdateProfileRequest,
    entity::profiles::{self, ActiveModel as ProfileActive, Entity as Profiles},
    error::AppResult,
    middleware::auth::AuthUser,
    models::Profile,
    response::{ApiResponse, Meta},
    state::AppState,
};

/// Load the user's profile, creating an empty one on first access.
pub async fn get_or_create_profile<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
) -> Result<profiles::Model, DbErr> {
    if let Some(profile) = find_profile(db, user_id).await? {
        return Ok(profile);
    }

    Profiles::insert(empty_profile(user_id))
        .on_conflict(
            OnConflict::column(profiles::Column::UserId)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;

    find_profile(db, user_id)
        .await?
        .ok_or_else(|| DbErr::RecordNotFound(format!("profile for user {user_id}")))
}

pub fn empty_profile(user_id: Uuid) -> ProfileActive {
    ProfileActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        phone: Set(String::new()),
        address: Set(String::new()),
    }
}

async fn find_profile<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
) -> Result<Option<profiles::Model>, DbErr> {
    Profiles::find()
        .filter(profiles::Column::UserId.eq(user_id))
        .one(db)
        .await
}

pub async fn get_profile(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<Profile>> {
    let profile = get_or_create_profile(&state.orm, user.user_id).await?;
    Ok(ApiResponse::success(
        "Profile",
        Profile::from(profile),
        Some(Meta::empty()),
    ))
}

pub async fn update_profile(
    state: &AppState,
    user: &AuthUser,
    payload: UpdateProfileRequest,
) -> AppResult<ApiResponse<Profile>> {
    let payload = UpdateProfileRequest {
        phone: payload.phone.trim().to_string(),
        address: payload.address.trim().to_string(),
    };
    payload.validate()?;

    let existing = get_or_create_profile(&state.orm, user.user_id).await?;
    let mut active: ProfileActive = existing.into();
    active.phone = Set(payload.phone);
    active.address = Set(payload.address);
    let profile = active.update(&state.orm).await?;

    Ok(ApiResponse::success(
        "Profile updated.",
        Profile::from(profile),
        Some(Meta::empty()),
    ))
}
