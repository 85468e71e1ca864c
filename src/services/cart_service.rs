use crate::{
    cart::Cart,
    dto::{
        cart::{CartAction, CartView},
        catalog::AddToCartRequest,
    },
    error::{AppError, AppResult},
    response::{ApiResponse, Meta},
    services::catalog_service::{find_available_item, price_cart},
    state::AppState,
};

pub async fn view_cart(state: &AppState, cart: &Cart) -> AppResult<ApiResponse<CartView>> {
    let priced = price_cart(&state.orm, cart).await?;
    let meta = Meta::total(priced.lines.len() as i64);
    Ok(ApiResponse::success("OK", CartView::from(priced), Some(meta)))
}

/// Add an available item to the cart and return the acknowledgment message.
pub async fn add_item(
    state: &AppState,
    cart: &mut Cart,
    slug: &str,
    payload: AddToCartRequest,
) -> AppResult<String> {
    let item = find_available_item(&state.orm, slug)
        .await?
        .ok_or(AppError::NotFound)?;

    let added = cart.add(item.id, payload.quantity.unwrap_or(1));
    tracing::debug!(item_id = %item.id, quantity = added, "added to cart");

    Ok(format!("Added {added} × {} to cart.", item.name))
}

/// Apply an update or clear action and return the acknowledgment message.
pub fn apply_action(cart: &mut Cart, action: CartAction) -> &'static str {
    match action {
        CartAction::Update { quantities } => {
            cart.update(quantities);
            "Cart updated."
        }
        CartAction::Clear => {
            cart.clear();
            "Cart cleared."
        }
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    #[test]
    fn update_action_drops_zero_quantities() {
        let mut cart = Cart::new();
        let seven = Uuid::new_v4();
        let nine = Uuid::new_v4();
        cart.add(seven, 2);
        cart.add(nine, 1);

        let message = apply_action(
            &mut cart,
            CartAction::Update {
                quantities: vec![(seven, 0)],
            },
        );
        assert_eq!(message, "Cart updated.");
        assert_eq!(cart.item_ids(), vec![nine]);
    }

    #[test]
    fn clear_action_empties_cart() {
        let mut cart = Cart::new();
        cart.add(Uuid::new_v4(), 1);
        assert_eq!(apply_action(&mut cart, CartAction::Clear), "Cart cleared.");
        assert!(cart.is_empty());
    }

    #[test]
    fn cart_action_parses_tagged_json() {
        let id = Uuid::new_v4();
        let action: CartAction = serde_json::from_value(serde_json::json!({
            "action": "update",
            "quantities": { id.to_string(): 3 }
        }))
        .unwrap();
        match action {
            CartAction::Update { quantities } => assert_eq!(quantities, vec![(id, 3)]),
            CartAction::Clear => panic!("expected update"),
        }
    }
}
