use std::fmt;

use rust_decimal::Decimal;
use serde::{
    Deserialize, Deserializer, Serialize,
    de::{MapAccess, Visitor},
};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    cart::{PricedCart, PricedLine},
    models::MenuItem,
};

#[derive(Debug, Serialize, ToSchema)]
pub struct CartLineDto {
    pub item: MenuItem,
    pub quantity: i32,
    #[schema(value_type = String, example = "10.00")]
    pub line_total: Decimal,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartView {
    pub items: Vec<CartLineDto>,
    #[schema(value_type = String, example = "13.00")]
    pub total: Decimal,
}

impl From<PricedLine> for CartLineDto {
    fn from(line: PricedLine) -> Self {
        Self {
            item: line.item.into(),
            quantity: line.quantity,
            line_total: line.line_total,
        }
    }
}

impl From<PricedCart> for CartView {
    fn from(priced: PricedCart) -> Self {
        Self {
            items: priced.lines.into_iter().map(CartLineDto::from).collect(),
            total: priced.total,
        }
    }
}

/// Body of `POST /cart/`.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum CartAction {
    /// Set quantities; zero or less removes the line.
    Update {
        #[serde(deserialize_with = "ordered_quantities")]
        #[schema(value_type = Object)]
        quantities: Vec<(Uuid, i64)>,
    },
    Clear,
}

/// Read `{item_id: quantity}` in submission order. Entries whose key is not a
/// UUID or whose value is not an integer are skipped.
fn ordered_quantities<'de, D>(deserializer: D) -> Result<Vec<(Uuid, i64)>, D::Error>
where
    D: Deserializer<'de>,
{
    struct QuantitiesVisitor;

    impl<'de> Visitor<'de> for QuantitiesVisitor {
        type Value = Vec<(Uuid, i64)>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a map of item id to quantity")
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut quantities = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some((key, value)) = map.next_entry::<String, serde_json::Value>()? {
                let quantity = value
                    .as_i64()
                    .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()));
                match (key.parse::<Uuid>(), quantity) {
                    (Ok(item_id), Some(quantity)) => quantities.push((item_id, quantity)),
                    _ => tracing::debug!(key = %key, "ignoring malformed cart quantity"),
                }
            }
            Ok(quantities)
        }
    }

    deserializer.deserialize_map(QuantitiesVisitor)
}
