use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    cart::Cart,
    dto::orders::{CheckoutPage, CheckoutRequest, OrderList, OrderWithItems},
    entity::{
        menu_items::Entity as MenuItems,
        order_items::{self, ActiveModel as OrderItemActive, Entity as OrderItems},
        orders::{self, ActiveModel as OrderActive, Entity as Orders, OrderStatus},
    },
    error::{AppError, AppResult, FieldErrors, field_error},
    middleware::auth::AuthUser,
    models::{Order, OrderItem},
    response::{ApiResponse, Meta},
    services::{catalog_service::price_cart, profile_service::get_or_create_profile},
    state::AppState,
};

/// Fallback recipient when the account has no email address.
const FALLBACK_RECIPIENT: &str = "test@example.com";

/// Largest value `orders.total_price` (`NUMERIC(10, 2)`) can hold.
fn max_order_total() -> Decimal {
    Decimal::new(99_999_999_99, 2)
}

fn ensure_total_fits(total: Decimal) -> AppResult<()> {
    if total > max_order_total() {
        return Err(field_error(
            "cart",
            "The order total is too large. Please reduce the quantities.",
        ));
    }
    Ok(())
}

/// Checkout form prefilled from the caller's profile.
pub async fn checkout_page(
    state: &AppState,
    user: &AuthUser,
    cart: &Cart,
) -> AppResult<ApiResponse<CheckoutPage>> {
    let priced = price_cart(&state.orm, cart).await?;
    if priced.is_empty() {
        return Err(AppError::CartEmpty);
    }
    let profile = get_or_create_profile(&state.orm, user.user_id).await?;
    let form = CheckoutRequest {
        phone: profile.phone,
        address: profile.address,
    };

    Ok(ApiResponse::success(
        "Checkout",
        CheckoutPage {
            form,
            cart: priced.into(),
            errors: None,
        },
        Some(Meta::empty()),
    ))
}

/// Checkout form echoed back with the caller's input and the errors found.
pub async fn invalid_checkout_page(
    state: &AppState,
    cart: &Cart,
    form: CheckoutRequest,
    errors: FieldErrors,
) -> AppResult<ApiResponse<CheckoutPage>> {
    let priced = price_cart(&state.orm, cart).await?;
    Ok(ApiResponse::success(
        "Please correct the errors below.",
        CheckoutPage {
            form,
            cart: priced.into(),
            errors: Some(errors),
        },
        Some(Meta::empty()),
    ))
}

/// Turn the session cart into a persisted order.
///
/// Pricing, the order row and its items share one transaction; the cart is
/// cleared only after commit. The confirmation email is best effort.
pub async fn place_order(
    state: &AppState,
    user: &AuthUser,
    cart: &mut Cart,
    payload: CheckoutRequest,
) -> AppResult<ApiResponse<OrderWithItems>> {
    let txn = state.orm.begin().await?;

    let priced = price_cart(&txn, cart).await?;
    if priced.is_empty() {
        return Err(AppError::CartEmpty);
    }

    let payload = payload.trimmed();
    payload.validate()?;
    ensure_total_fits(priced.total)?;

    let now = Utc::now();
    let order = OrderActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user.user_id),
        status: Set(OrderStatus::Pending),
        total_price: Set(priced.total),
        address: Set(payload.address),
        phone: Set(payload.phone),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(&txn)
    .await?;

    let mut items: Vec<OrderItem> = Vec::with_capacity(priced.lines.len());
    for line in priced.lines {
        let row = OrderItemActive {
            id: Set(Uuid::new_v4()),
            order_id: Set(order.id),
            menu_item_id: Set(line.item.id),
            quantity: Set(line.quantity),
            price: Set(line.item.price),
        }
        .insert(&txn)
        .await?;
        items.push(OrderItem::from_entity(row, Some(line.item)));
    }

    txn.commit().await?;
    cart.clear();

    tracing::info!(
        order_id = %order.id,
        user_id = %user.user_id,
        total = %order.total_price,
        items = items.len(),
        "order placed"
    );

    send_confirmation(state, user, &order).await;

    Ok(ApiResponse::success(
        format!("Order placed successfully! Your order id is {}.", order.id),
        OrderWithItems {
            order: Order::from(order),
            items,
        },
        Some(Meta::empty()),
    ))
}

async fn send_confirmation(state: &AppState, user: &AuthUser, order: &orders::Model) {
    let recipient = if user.email.trim().is_empty() {
        FALLBACK_RECIPIENT
    } else {
        user.email.trim()
    };
    let subject = format!("Order #{} Confirmation", order.id);
    let body = format!(
        "Thank you for your order! Your order id is {}. Status: {}.",
        order.id, order.status
    );

    if let Err(err) = state.mailer.send(recipient, &subject, &body).await {
        tracing::warn!(error = %err, order_id = %order.id, "order confirmation email failed");
    }
}

pub async fn list_orders(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<OrderList>> {
    let orders: Vec<Order> = Orders::find()
        .filter(orders::Column::UserId.eq(user.user_id))
        .order_by_desc(orders::Column::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Order::from)
        .collect();

    let meta = Meta::total(orders.len() as i64);
    Ok(ApiResponse::success(
        "Ok",
        OrderList { items: orders },
        Some(meta),
    ))
}

/// Fetch one of the caller's orders. Another user's order is reported as missing.
pub async fn get_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<OrderWithItems>> {
    let order = Orders::find()
        .filter(
            Condition::all()
                .add(orders::Column::UserId.eq(user.user_id))
                .add(orders::Column::Id.eq(id)),
        )
        .one(&state.orm)
        .await?;
    let order = match order {
        Some(o) => o,
        None => return Err(AppError::NotFound),
    };

    let items = load_items(&state.orm, order.id).await?;

    Ok(ApiResponse::success(
        "OK",
        OrderWithItems {
            order: Order::from(order),
            items,
        },
        Some(Meta::empty()),
    ))
}

pub async fn load_items<C: ConnectionTrait>(db: &C, order_id: Uuid) -> Result<Vec<OrderItem>, DbErr> {
    let rows = OrderItems::find()
        .filter(order_items::Column::OrderId.eq(order_id))
        .find_also_related(MenuItems)
        .all(db)
        .await?;
    Ok(rows
        .into_iter()
        .map(|(item, menu_item)| OrderItem::from_entity(item, menu_item))
        .collect())
}
