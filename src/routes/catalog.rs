use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use tower_sessions::Session;

use crate::{
    dto::catalog::{AddToCartRequest, BrowseQuery, MenuPage},
    error::AppResult,
    middleware::session::{load_cart, store_cart},
    models::MenuItem,
    response::{ApiResponse, SeeOther},
    services::{cart_service, catalog_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(browse))
        .route("/item/{slug}/", get(item_detail).post(add_to_cart))
}

#[utoipa::path(
    get,
    path = "/",
    params(BrowseQuery),
    responses(
        (status = 200, description = "Categories and available menu items", body = ApiResponse<MenuPage>)
    ),
    tag = "Menu"
)]
pub async fn browse(
    State(state): State<AppState>,
    Query(query): Query<BrowseQuery>,
) -> AppResult<Json<ApiResponse<MenuPage>>> {
    let resp = catalog_service::browse(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/item/{slug}/",
    params(
        ("slug" = String, Path, description = "Menu item slug")
    ),
    responses(
        (status = 200, description = "Menu item", body = ApiResponse<MenuItem>),
        (status = 404, description = "Missing or unavailable item"),
    ),
    tag = "Menu"
)]
pub async fn item_detail(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<ApiResponse<MenuItem>>> {
    let resp = catalog_service::get_item(&state, &slug).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/item/{slug}/",
    params(
        ("slug" = String, Path, description = "Menu item slug")
    ),
    request_body = AddToCartRequest,
    responses(
        (status = 303, description = "Added; redirects to the cart"),
        (status = 404, description = "Missing or unavailable item"),
    ),
    tag = "Cart"
)]
pub async fn add_to_cart(
    State(state): State<AppState>,
    session: Session,
    Path(slug): Path<String>,
    Json(payload): Json<AddToCartRequest>,
) -> AppResult<SeeOther<serde_json::Value>> {
    let mut cart = load_cart(&session).await?;
    let message = cart_service::add_item(&state, &mut cart, &slug, payload).await?;
    store_cart(&session, &cart).await?;
    Ok(SeeOther::with_message("/cart/", message))
}
