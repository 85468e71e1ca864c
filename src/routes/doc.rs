use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{ApiKey, ApiKeyValue, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        admin::{
            CreateCategoryRequest, CreateMenuItemRequest, UpdateMenuItemRequest,
            UpdateOrderStatusRequest,
        },
        auth::{LoginForm, LoginRequest, RegisterForm, RegisterRequest},
        cart::{CartAction, CartLineDto, CartView},
        catalog::{AddToCartRequest, MenuPage},
        orders::{CheckoutPage, CheckoutRequest, OrderList, OrderWithItems},
        profile::UpdateProfileRequest,
    },
    middleware::session::SESSION_COOKIE_NAME,
    models::{Category, MenuItem, Order, OrderItem, OrderStatus, Profile, User},
    response::{ApiResponse, Meta},
    routes::{admin, auth, cart, catalog, health, orders, params, profile},
};

struct SessionCookieAddon;

impl Modify for SessionCookieAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "session_cookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new(SESSION_COOKIE_NAME))),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        catalog::browse,
        catalog::item_detail,
        catalog::add_to_cart,
        cart::cart_view,
        cart::cart_update,
        orders::checkout_form,
        orders::checkout,
        orders::list_order,
        orders::get_order,
        auth::register_form,
        auth::register,
        auth::login_form,
        auth::login,
        auth::logout,
        profile::get_profile,
        profile::update_profile,
        admin::create_category,
        admin::create_item,
        admin::update_item,
        admin::list_all_orders,
        admin::get_order_admin,
        admin::update_order_status
    ),
    components(
        schemas(
            User,
            Profile,
            Category,
            MenuItem,
            Order,
            OrderItem,
            OrderStatus,
            MenuPage,
            AddToCartRequest,
            CartAction,
            CartLineDto,
            CartView,
            CheckoutRequest,
            CheckoutPage,
            OrderList,
            OrderWithItems,
            RegisterRequest,
            RegisterForm,
            LoginRequest,
            LoginForm,
            UpdateProfileRequest,
            CreateCategoryRequest,
            CreateMenuItemRequest,
            UpdateMenuItemRequest,
            UpdateOrderStatusRequest,
            params::Pagination,
            params::SortOrder,
            Meta,
            ApiResponse<MenuPage>,
            ApiResponse<CartView>,
            ApiResponse<CheckoutPage>,
            ApiResponse<OrderWithItems>,
            ApiResponse<OrderList>,
            ApiResponse<Profile>
        )
    ),
    modifiers(&SessionCookieAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Menu", description = "Menu browsing endpoints"),
        (name = "Cart", description = "Session cart endpoints"),
        (name = "Orders", description = "Checkout and order history endpoints"),
        (name = "Auth", description = "Registration and session login endpoints"),
        (name = "Profile", description = "Delivery profile endpoints"),
        (name = "Admin", description = "Catalog and order management endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_session_routes() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/checkout/"));
        assert!(doc.paths.paths.contains_key("/admin/orders/{id}/status"));
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("session_cookie"));
    }
}
