use axum::{Json, Router, extract::State, routing::get};
use tower_sessions::Session;

use crate::{
    dto::cart::{CartAction, CartView},
    error::AppResult,
    middleware::session::{load_cart, store_cart},
    response::{ApiResponse, SeeOther},
    services::cart_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/cart/", get(cart_view).post(cart_update))
}

#[utoipa::path(
    get,
    path = "/cart/",
    responses(
        (status = 200, description = "Cart lines priced against the live menu", body = ApiResponse<CartView>)
    ),
    tag = "Cart"
)]
pub async fn cart_view(
    State(state): State<AppState>,
    session: Session,
) -> AppResult<Json<ApiResponse<CartView>>> {
    let cart = load_cart(&session).await?;
    let resp = cart_service::view_cart(&state, &cart).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/cart/",
    request_body = CartAction,
    responses(
        (status = 303, description = "Cart updated or cleared; redirects to the cart"),
    ),
    tag = "Cart"
)]
pub async fn cart_update(
    session: Session,
    Json(action): Json<CartAction>,
) -> AppResult<SeeOther<serde_json::Value>> {
    let mut cart = load_cart(&session).await?;
    let message = cart_service::apply_action(&mut cart, action);
    store_cart(&session, &cart).await?;
    Ok(SeeOther::with_message("/cart/", message))
}
