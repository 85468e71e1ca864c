use std::collections::HashMap;

use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use crate::{
    cart::{Cart, PricedCart},
    dto::catalog::{BrowseQuery, MenuPage},
    entity::{
        categories::{self, Entity as Categories},
        menu_items::{self, Entity as MenuItems},
    },
    error::{AppError, AppResult},
    models::{Category, MenuItem},
    response::{ApiResponse, Meta},
    state::AppState,
};

pub async fn list_categories<C: ConnectionTrait>(db: &C) -> Result<Vec<categories::Model>, DbErr> {
    Categories::find()
        .order_by_asc(categories::Column::Name)
        .all(db)
        .await
}

/// Available items ordered by name, optionally restricted to one category.
pub async fn list_items<C: ConnectionTrait>(
    db: &C,
    category_slug: Option<&str>,
) -> Result<Vec<menu_items::Model>, DbErr> {
    let mut finder = MenuItems::find().filter(menu_items::Column::IsAvailable.eq(true));
    if let Some(slug) = category_slug {
        finder = finder
            .inner_join(Categories)
            .filter(categories::Column::Slug.eq(slug));
    }
    finder.order_by_asc(menu_items::Column::Name).all(db).await
}

/// One available item. Missing and unavailable items look the same.
pub async fn find_available_item<C: ConnectionTrait>(
    db: &C,
    slug: &str,
) -> Result<Option<menu_items::Model>, DbErr> {
    MenuItems::find()
        .filter(menu_items::Column::Slug.eq(slug))
        .filter(menu_items::Column::IsAvailable.eq(true))
        .one(db)
        .await
}

/// Resolve the cart against the live catalog. Stale ids are dropped.
pub async fn price_cart<C: ConnectionTrait>(db: &C, cart: &Cart) -> Result<PricedCart, DbErr> {
    if cart.is_empty() {
        return Ok(PricedCart::default());
    }
    let catalog: HashMap<Uuid, menu_items::Model> = MenuItems::find()
        .filter(menu_items::Column::Id.is_in(cart.item_ids()))
        .all(db)
        .await?
        .into_iter()
        .map(|item| (item.id, item))
        .collect();
    Ok(cart.price(&catalog))
}

pub async fn browse(state: &AppState, query: BrowseQuery) -> AppResult<ApiResponse<MenuPage>> {
    let active_category = query.category.filter(|s| !s.is_empty());

    let categories = list_categories(&state.orm)
        .await?
        .into_iter()
        .map(Category::from)
        .collect();
    let items: Vec<MenuItem> = list_items(&state.orm, active_category.as_deref())
        .await?
        .into_iter()
        .map(MenuItem::from)
        .collect();

    let meta = Meta::total(items.len() as i64);
    Ok(ApiResponse::success(
        "Menu",
        MenuPage {
            categories,
            items,
            active_category,
        },
        Some(meta),
    ))
}

pub async fn get_item(state: &AppState, slug: &str) -> AppResult<ApiResponse<MenuItem>> {
    let item = find_available_item(&state.orm, slug)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success("Menu item", MenuItem::from(item), None))
}
