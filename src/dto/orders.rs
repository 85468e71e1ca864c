use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    dto::cart::CartView,
    error::FieldErrors,
    models::{Order, OrderItem},
};

#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate, ToSchema)]
pub struct CheckoutRequest {
    #[serde(default)]
    #[validate(length(min = 1, max = 20, message = "Enter a phone number of at most 20 characters."))]
    pub phone: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "This field is required."))]
    pub address: String,
}

impl CheckoutRequest {
    /// Surrounding whitespace never counts as input.
    pub fn trimmed(&self) -> Self {
        Self {
            phone: self.phone.trim().to_string(),
            address: self.address.trim().to_string(),
        }
    }
}

/// Checkout form state: the priced cart, the form values and any errors.
#[derive(Debug, Serialize, ToSchema)]
pub struct CheckoutPage {
    pub form: CheckoutRequest,
    pub cart: CartView,
    #[schema(value_type = Option<Object>)]
    pub errors: Option<FieldErrors>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderWithItems {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderList {
    pub items: Vec<Order>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_fields_fail_after_trimming() {
        let req = CheckoutRequest {
            phone: "   ".into(),
            address: "\n".into(),
        }
        .trimmed();
        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("phone"));
        assert!(fields.contains_key("address"));
    }

    #[test]
    fn missing_fields_reach_validation() {
        let req: CheckoutRequest = serde_json::from_str(r#"{"phone":"555"}"#).unwrap();
        assert_eq!(req.phone, "555");
        let errors = req.trimmed().validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("address"));
        assert!(!fields.contains_key("phone"));
    }

    #[test]
    fn phone_longer_than_twenty_chars_is_rejected() {
        let req = CheckoutRequest {
            phone: "0".repeat(21),
            address: "1 Main St".into(),
        };
        assert!(req.validate().is_err());
    }
}
