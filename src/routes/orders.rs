use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use tower_sessions::Session;
use uuid::Uuid;

use crate::{
    dto::orders::{CheckoutPage, CheckoutRequest, OrderList, OrderWithItems},
    error::{AppError, AppResult, field_errors},
    middleware::{
        auth::AuthUser,
        session::{load_cart, store_cart},
    },
    response::{ApiResponse, SeeOther},
    services::order_service,
    state::AppState,
};

pub fn route() -> Router<AppState> {
    Router::new()
        .route("/checkout/", get(checkout_form).post(checkout))
        .route("/orders/", get(list_order))
        .route("/orders/{id}/", get(get_order))
}

#[utoipa::path(
    get,
    path = "/checkout/",
    responses(
        (status = 200, description = "Priced cart and prefilled delivery form", body = ApiResponse<CheckoutPage>),
        (status = 303, description = "Cart is empty (to `/`) or login required"),
    ),
    tag = "Orders"
)]
pub async fn checkout_form(
    State(state): State<AppState>,
    user: AuthUser,
    session: Session,
) -> AppResult<Json<ApiResponse<CheckoutPage>>> {
    let cart = load_cart(&session).await?;
    let resp = order_service::checkout_page(&state, &user, &cart).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/checkout/",
    request_body = CheckoutRequest,
    responses(
        (status = 303, description = "Order placed; redirects to the order", body = ApiResponse<OrderWithItems>),
        (status = 400, description = "Invalid delivery details", body = ApiResponse<CheckoutPage>),
    ),
    tag = "Orders"
)]
pub async fn checkout(
    State(state): State<AppState>,
    user: AuthUser,
    session: Session,
    Json(payload): Json<CheckoutRequest>,
) -> AppResult<Response> {
    let mut cart = load_cart(&session).await?;
    let entered = payload.clone();

    match order_service::place_order(&state, &user, &mut cart, payload).await {
        Ok(resp) => {
            store_cart(&session, &cart).await?;
            let location = resp
                .data
                .as_ref()
                .map(|placed| format!("/orders/{}/", placed.order.id))
                .unwrap_or_else(|| "/orders/".to_string());
            Ok(SeeOther::new(location, resp).into_response())
        }
        Err(AppError::Validation(errors)) => {
            let page =
                order_service::invalid_checkout_page(&state, &cart, entered, field_errors(&errors))
                    .await?;
            Ok((StatusCode::BAD_REQUEST, Json(page)).into_response())
        }
        Err(err) => Err(err),
    }
}

#[utoipa::path(
    get,
    path = "/orders/",
    responses(
        (status = 200, description = "The caller's orders, newest first", body = ApiResponse<OrderList>)
    ),
    tag = "Orders"
)]
pub async fn list_order(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<OrderList>>> {
    let resp = order_service::list_orders(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/orders/{id}/",
    params(
        ("id" = Uuid, Path, description = "Order ID")
    ),
    responses(
        (status = 200, description = "One of the caller's orders", body = ApiResponse<OrderWithItems>),
        (status = 404, description = "Order not found"),
    ),
    tag = "Orders"
)]
pub async fn get_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<OrderWithItems>>> {
    let resp = order_service::get_order(&state, &user, id).await?;
    Ok(Json(resp))
}
