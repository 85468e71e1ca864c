use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::{
        admin::{
            CreateCategoryRequest, CreateMenuItemRequest, UpdateMenuItemRequest,
            UpdateOrderStatusRequest,
        },
        orders::{OrderList, OrderWithItems},
    },
    entity::{
        categories::{self, ActiveModel as CategoryActive, Entity as Categories},
        menu_items::{self, ActiveModel as MenuItemActive, Entity as MenuItems},
        orders::{self, ActiveModel as OrderActive, Entity as Orders},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{Category, MenuItem, Order},
    response::{ApiResponse, Meta},
    routes::params::{OrderListQuery, SortOrder},
    services::order_service::load_items,
    slug::{menu_item_slug, slugify},
    state::AppState,
};

fn ensure_price(price: Decimal) -> AppResult<()> {
    if price.is_sign_negative() {
        return Err(AppError::BadRequest("price must not be negative".into()));
    }
    Ok(())
}

pub async fn create_category(
    state: &AppState,
    user: &AuthUser,
    payload: CreateCategoryRequest,
) -> AppResult<ApiResponse<Category>> {
    ensure_admin(user)?;
    payload.validate()?;

    let name = payload.name.trim().to_string();
    let slug = match payload.slug {
        Some(slug) => slugify(&slug),
        None => slugify(&name),
    };
    if slug.is_empty() {
        return Err(AppError::BadRequest("slug must not be empty".into()));
    }

    let exist = Categories::find()
        .filter(
            Condition::any()
                .add(categories::Column::Name.eq(name.as_str()))
                .add(categories::Column::Slug.eq(slug.as_str())),
        )
        .one(&state.orm)
        .await?;
    if exist.is_some() {
        return Err(AppError::BadRequest(
            "category name or slug already exists".into(),
        ));
    }

    let category = CategoryActive {
        id: Set(Uuid::new_v4()),
        name: Set(name),
        slug: Set(slug),
    }
    .insert(&state.orm)
    .await?;

    tracing::info!(category_id = %category.id, slug = %category.slug, "category created");

    Ok(ApiResponse::success(
        "Category created",
        Category::from(category),
        Some(Meta::empty()),
    ))
}

pub async fn create_item(
    state: &AppState,
    user: &AuthUser,
    payload: CreateMenuItemRequest,
) -> AppResult<ApiResponse<MenuItem>> {
    ensure_admin(user)?;
    payload.validate()?;
    ensure_price(payload.price)?;

    let category = Categories::find_by_id(payload.category_id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::BadRequest("category not found".into()))?;

    let name = payload.name.trim().to_string();
    let slug = match payload.slug {
        Some(slug) => slugify(&slug),
        None => menu_item_slug(&name, &category.slug),
    };
    if slug.is_empty() {
        return Err(AppError::BadRequest("slug must not be empty".into()));
    }

    let exist = MenuItems::find()
        .filter(menu_items::Column::Slug.eq(slug.as_str()))
        .one(&state.orm)
        .await?;
    if exist.is_some() {
        return Err(AppError::BadRequest("menu item slug already exists".into()));
    }

    let item = MenuItemActive {
        id: Set(Uuid::new_v4()),
        category_id: Set(category.id),
        name: Set(name),
        slug: Set(slug),
        description: Set(payload.description),
        price: Set(payload.price),
        is_available: Set(payload.is_available.unwrap_or(true)),
    }
    .insert(&state.orm)
    .await?;

    tracing::info!(item_id = %item.id, slug = %item.slug, "menu item created");

    Ok(ApiResponse::success(
        "Menu item created",
        MenuItem::from(item),
        Some(Meta::empty()),
    ))
}

/// Edit a menu item in place. Existing order snapshots are untouched.
pub async fn update_item(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateMenuItemRequest,
) -> AppResult<ApiResponse<MenuItem>> {
    ensure_admin(user)?;
    payload.validate()?;

    let existing = MenuItems::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(item) => item,
        None => return Err(AppError::NotFound),
    };

    let mut active: MenuItemActive = existing.into();
    if let Some(name) = payload.name {
        active.name = Set(name.trim().to_string());
    }
    if let Some(description) = payload.description {
        active.description = Set(description);
    }
    if let Some(price) = payload.price {
        ensure_price(price)?;
        active.price = Set(price);
    }
    if let Some(is_available) = payload.is_available {
        active.is_available = Set(is_available);
    }

    let item = active.update(&state.orm).await?;

    Ok(ApiResponse::success(
        "Updated",
        MenuItem::from(item),
        Some(Meta::empty()),
    ))
}

pub async fn list_all_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    ensure_admin(user)?;
    let (page, limit, offset) = query.pagination.normalize();

    let mut condition = Condition::all();
    if let Some(status) = query.status {
        condition = condition.add(orders::Column::Status.eq(status));
    }

    let mut finder = Orders::find().filter(condition);
    finder = match query.sort_order.unwrap_or(SortOrder::Desc) {
        SortOrder::Asc => finder.order_by_asc(orders::Column::CreatedAt),
        SortOrder::Desc => finder.order_by_desc(orders::Column::CreatedAt),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Order::from)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Ok", OrderList { items }, Some(meta)))
}

pub async fn get_order_admin(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<OrderWithItems>> {
    ensure_admin(user)?;
    let order = Orders::find_by_id(id).one(&state.orm).await?;
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

pub async fn update_order_status(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateOrderStatusRequest,
) -> AppResult<ApiResponse<Order>> {
    ensure_admin(user)?;

    let order = Orders::find_by_id(id).one(&state.orm).await?;
    let order = match order {
        Some(o) => o,
        None => return Err(AppError::NotFound),
    };

    let previous = order.status;
    let mut active: OrderActive = order.into();
    active.status = Set(payload.status);
    active.updated_at = Set(Utc::now().into());
    let order = active.update(&state.orm).await?;

    tracing::info!(
        order_id = %order.id,
        from = %previous,
        to = %order.status,
        "order status changed"
    );

    Ok(ApiResponse::success(
        "Order status updated",
        Order::from(order),
        Some(Meta::empty()),
    ))
}
