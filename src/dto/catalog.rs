use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::models::{Category, MenuItem};

#[derive(Debug, Deserialize, Default, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct BrowseQuery {
    /// Category slug to filter by.
    pub category: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MenuPage {
    pub categories: Vec<Category>,
    pub items: Vec<MenuItem>,
    pub active_category: Option<String>,
}

#[derive(Debug, Deserialize, Default, ToSchema)]
pub struct AddToCartRequest {
    /// Defaults to 1; anything below 1 counts as 1.
    pub quantity: Option<i64>,
}
