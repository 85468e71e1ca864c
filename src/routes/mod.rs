use axum::Router;

use crate::state::AppState;

pub mod admin;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod doc;
pub mod health;
pub mod orders;
pub mod params;
pub mod profile;

// Page routes live at the root; state is provided at the top level.
pub fn create_router() -> Router<AppState> {
    Router::new()
        .merge(catalog::router())
        .merge(cart::router())
        .merge(orders::route())
        .merge(auth::router())
        .merge(profile::router())
        .nest("/admin", admin::router())
}
