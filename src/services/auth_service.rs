use std::sync::LazyLock;

use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::Utc;
use password_hash::rand_core::OsRng;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DbErr, EntityTrait, QueryFilter, Set, SqlErr,
    TransactionTrait,
};
use uuid::Uuid;
use validator::{Validate, ValidateEmail};

use crate::{
    dto::auth::{LoginRequest, RegisterRequest},
    entity::users::{self, ActiveModel as UserActive, Entity as Users},
    error::{AppError, AppResult, field_error},
    middleware::session::CurrentUser,
    models::User,
    response::ApiResponse,
    services::profile_service::empty_profile,
    state::AppState,
};

const INVALID_CREDENTIALS: &str = "Invalid credentials";
const USERNAME_TAKEN: &str = "A user with that username already exists.";

/// Verified against when the username is unknown, so both failures cost one hash.
static DUMMY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("food-order-dummy-password").ok());

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?
        .to_string();
    Ok(hash)
}

fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Spend the same work as a real check and discard the result.
fn verify_dummy(password: &str) {
    if let Some(hash) = DUMMY_HASH.as_deref() {
        let _ = verify_password(password, hash);
    }
}

fn username_conflict(err: DbErr) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => field_error("username", USERNAME_TAKEN),
        _ => AppError::OrmError(err),
    }
}

/// Create the account and its empty profile. The caller is not logged in.
pub async fn register_user(
    state: &AppState,
    payload: RegisterRequest,
) -> AppResult<ApiResponse<User>> {
    let payload = RegisterRequest {
        username: payload.username.trim().to_string(),
        email: payload.email.trim().to_string(),
        ..payload
    };
    payload.validate()?;
    if !payload.email.is_empty() && !payload.email.validate_email() {
        return Err(field_error("email", "Enter a valid email address."));
    }

    let password_hash = hash_password(&payload.password)?;

    let txn = state.orm.begin().await?;
    let user = UserActive {
        id: Set(Uuid::new_v4()),
        username: Set(payload.username),
        email: Set(payload.email),
        password_hash: Set(password_hash),
        role: Set("user".into()),
        created_at: Set(Utc::now().into()),
    }
    .insert(&txn)
    .await
    .map_err(username_conflict)?;
    empty_profile(user.id).insert(&txn).await?;
    txn.commit().await?;

    tracing::info!(user_id = %user.id, username = %user.username, "user registered");

    Ok(ApiResponse::success(
        "Account created. Please log in.",
        User::from(user),
        None,
    ))
}

/// Check credentials. Unknown usernames and wrong passwords fail identically.
pub async fn authenticate(state: &AppState, payload: LoginRequest) -> AppResult<CurrentUser> {
    let LoginRequest { username, password } = payload;
    let user = Users::find()
        .filter(users::Column::Username.eq(username.trim()))
        .one(&state.orm)
        .await?;

    let user = match user {
        Some(u) => u,
        None => {
            verify_dummy(&password);
            return Err(AppError::BadRequest(INVALID_CREDENTIALS.into()));
        }
    };

    if !verify_password(&password, &user.password_hash)? {
        return Err(AppError::BadRequest(INVALID_CREDENTIALS.into()));
    }

    tracing::info!(user_id = %user.id, "user logged in");

    Ok(CurrentUser {
        id: user.id,
        username: user.username,
        email: user.email,
        role: user.role,
    })
}
