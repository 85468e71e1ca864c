//! Session layer and typed access to the values kept in it.

use serde::{Deserialize, Serialize};
use tower_sessions::{Expiry, Session, SessionManagerLayer, SessionStore};
use uuid::Uuid;

use crate::{cart::Cart, error::AppResult};

pub const SESSION_COOKIE_NAME: &str = "food_order_session";

/// Two weeks of inactivity.
const SESSION_EXPIRY_SECONDS: i64 = 14 * 24 * 60 * 60;

pub mod keys {
    pub const CURRENT_USER: &str = "current_user";
    pub const CART: &str = "cart";
}

/// Identity of the logged-in user as stored in the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub role: String,
}

pub fn create_session_layer<S>(store: S, secure: bool) -> SessionManagerLayer<S>
where
    S: SessionStore + Clone,
{
    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(secure)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}

pub async fn load_cart(session: &Session) -> AppResult<Cart> {
    Ok(session.get::<Cart>(keys::CART).await?.unwrap_or_default())
}

pub async fn store_cart(session: &Session, cart: &Cart) -> AppResult<()> {
    session.insert(keys::CART, cart).await?;
    Ok(())
}

pub async fn current_user(session: &Session) -> AppResult<Option<CurrentUser>> {
    Ok(session.get::<CurrentUser>(keys::CURRENT_USER).await?)
}

/// Log a user in. The session id is rotated first; the cart survives.
pub async fn login(session: &Session, user: CurrentUser) -> AppResult<()> {
    session.cycle_id().await?;
    session.insert(keys::CURRENT_USER, user).await?;
    Ok(())
}

/// Log out by discarding the whole session, cart included.
pub async fn logout(session: &Session) -> AppResult<()> {
    session.flush().await?;
    Ok(())
}
