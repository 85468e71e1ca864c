use food_order::{
    cart::Cart,
    db::{create_orm_conn, run_migrations},
    dto::{
        admin::{
            CreateCategoryRequest, CreateMenuItemRequest, UpdateMenuItemRequest,
            UpdateOrderStatusRequest,
        },
        auth::{LoginRequest, RegisterRequest},
        catalog::{AddToCartRequest, BrowseQuery},
        orders::CheckoutRequest,
        profile::UpdateProfileRequest,
    },
    entity::{orders::OrderStatus, users},
    error::AppError,
    mailer::Mailer,
    middleware::auth::AuthUser,
    routes::params::{OrderListQuery, Pagination},
    services::{
        admin_service, auth_service, cart_service, catalog_service, order_service,
        profile_service,
    },
    state::AppState,
};
use rust_decimal::Decimal;
use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, Statement,
};
use uuid::Uuid;

// Integration flow: admin builds a menu, a user registers, fills a cart and checks out.
#[tokio::test]
async fn register_cart_checkout_and_admin_flow() -> anyhow::Result<()> {
    // Allow skipping when no DB is configured in the environment.
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!(
                "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
            );
            return Ok(());
        }
    };

    let state = setup_state(&database_url).await?;
    let admin = AuthUser {
        user_id: Uuid::new_v4(),
        username: "admin".into(),
        email: String::new(),
        role: "admin".into(),
    };

    // Menu
    let pizza = admin_service::create_category(
        &state,
        &admin,
        CreateCategoryRequest {
            name: "Pizza".into(),
            slug: None,
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(pizza.slug, "pizza");

    let drinks = admin_service::create_category(
        &state,
        &admin,
        CreateCategoryRequest {
            name: "Drinks".into(),
            slug: None,
        },
    )
    .await?
    .data
    .unwrap();

    let margherita = create_item(&state, &admin, pizza.id, "Margherita", Decimal::new(1000, 2)).await?;
    let soda = create_item(&state, &admin, drinks.id, "Soda", Decimal::new(150, 2)).await?;
    let arancini = create_item(&state, &admin, pizza.id, "Arancini", Decimal::new(450, 2)).await?;
    let calzone = admin_service::create_item(
        &state,
        &admin,
        CreateMenuItemRequest {
            category_id: pizza.id,
            name: "Calzone".into(),
            slug: None,
            description: String::new(),
            price: Decimal::new(900, 2),
            is_available: Some(false),
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(margherita.slug, "margherita-pizza");

    // Browsing hides unavailable items, filters by category and sorts by name
    let menu = browse_names(&state, None).await?;
    assert_eq!(menu, vec!["Arancini", "Margherita", "Soda"]);
    assert_eq!(browse_names(&state, Some("drinks")).await?, vec!["Soda"]);
    assert!(browse_names(&state, Some("no-such-category")).await?.is_empty());

    let hidden = catalog_service::get_item(&state, &calzone.slug).await.unwrap_err();
    assert!(matches!(hidden, AppError::NotFound));
    let shown = catalog_service::get_item(&state, &soda.slug).await?.data.unwrap();
    assert_eq!(shown.id, soda.id);

    // Mismatched passwords create nothing
    let err = auth_service::register_user(&state, register_request("eater", "pw1", "pw2"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
    assert_eq!(count_users(&state, "eater").await?, 0);

    auth_service::register_user(&state, register_request("eater", "pw1", "pw1")).await?;
    auth_service::register_user(&state, register_request("other", "pw2", "pw2")).await?;
    assert_eq!(count_users(&state, "eater").await?, 1);

    let duplicate = auth_service::register_user(&state, register_request("eater", "x", "x"))
        .await
        .unwrap_err();
    assert!(matches!(duplicate, AppError::Validation(_)));

    let wrong = auth_service::authenticate(
        &state,
        LoginRequest {
            username: "eater".into(),
            password: "nope".into(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(wrong, AppError::BadRequest(_)));

    let user = login(&state, "eater", "pw1").await?;
    let other = login(&state, "other", "pw2").await?;

    // Profile exists from registration and prefills checkout
    profile_service::update_profile(
        &state,
        &user,
        UpdateProfileRequest {
            phone: " 555-0100 ".into(),
            address: "1 Main St".into(),
        },
    )
    .await?;
    let profile = profile_service::get_profile(&state, &user).await?.data.unwrap();
    assert_eq!(profile.phone, "555-0100");

    // Empty cart: no order
    let mut cart = Cart::new();
    let err = order_service::place_order(&state, &user, &mut cart, checkout_request())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::CartEmpty));
    assert_eq!(count_orders(&state).await?, 0);

    // 1 × 10.00 + 2 × 1.50 = 13.00
    let added = cart_service::add_item(
        &state,
        &mut cart,
        &margherita.slug,
        AddToCartRequest { quantity: None },
    )
    .await?;
    assert_eq!(added, "Added 1 × Margherita to cart.");
    cart_service::add_item(
        &state,
        &mut cart,
        &soda.slug,
        AddToCartRequest { quantity: Some(2) },
    )
    .await?;
    let priced = catalog_service::price_cart(&state.orm, &cart).await?;
    assert_eq!(priced.total, Decimal::new(1300, 2));

    let page = order_service::checkout_page(&state, &user, &cart).await?.data.unwrap();
    assert_eq!(page.form.address, "1 Main St");

    // Invalid delivery details keep the cart
    let err = order_service::place_order(
        &state,
        &user,
        &mut cart,
        CheckoutRequest {
            phone: "   ".into(),
            address: "1 Main St".into(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
    assert_eq!(cart.len(), 2);
    assert_eq!(count_orders(&state).await?, 0);

    let placed = order_service::place_order(&state, &user, &mut cart, checkout_request())
        .await?
        .data
        .unwrap();
    assert!(cart.is_empty());
    assert_eq!(placed.order.status, OrderStatus::Pending);
    assert_eq!(placed.order.total_price, Decimal::new(1300, 2));
    assert_eq!(placed.items.len(), 2);
    let first_order_id = placed.order.id;

    let outbox = state.mailer.outbox();
    assert_eq!(outbox.len(), 1);
    assert_eq!(outbox[0].to, "eater@example.com");
    assert_eq!(
        outbox[0].subject,
        format!("Order #{} Confirmation", placed.order.id)
    );

    // Price changes leave the snapshot alone
    admin_service::update_item(
        &state,
        &admin,
        margherita.id,
        UpdateMenuItemRequest {
            price: Some(Decimal::new(1100, 2)),
            ..Default::default()
        },
    )
    .await?;
    let stored = order_service::get_order(&state, &user, placed.order.id)
        .await?
        .data
        .unwrap();
    assert_eq!(stored.order.total_price, Decimal::new(1300, 2));
    let pizza_line = stored
        .items
        .iter()
        .find(|line| line.menu_item_id == margherita.id)
        .unwrap();
    assert_eq!(pizza_line.price, Decimal::new(1000, 2));

    // Someone else's order does not exist for them
    let foreign = order_service::get_order(&state, &other, placed.order.id)
        .await
        .unwrap_err();
    assert!(matches!(foreign, AppError::NotFound));
    let listed = order_service::list_orders(&state, &other).await?.data.unwrap();
    assert!(listed.items.is_empty());

    // Status changes are admin only
    let forbidden = admin_service::update_order_status(
        &state,
        &user,
        placed.order.id,
        UpdateOrderStatusRequest {
            status: OrderStatus::Delivered,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(forbidden, AppError::Forbidden));

    let updated = admin_service::update_order_status(
        &state,
        &admin,
        placed.order.id,
        UpdateOrderStatusRequest {
            status: OrderStatus::Preparing,
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(updated.status, OrderStatus::Preparing);

    // A mail failure does not undo the order
    let broken_mail = AppState {
        orm: state.orm.clone(),
        mailer: Mailer::memory("not an address"),
    };
    let mut cart = Cart::new();
    cart.add(soda.id, 1);
    let placed = order_service::place_order(&broken_mail, &other, &mut cart, checkout_request())
        .await?
        .data
        .unwrap();
    assert_eq!(placed.order.total_price, Decimal::new(150, 2));
    assert!(broken_mail.mailer.outbox().is_empty());
    assert_eq!(count_orders(&state).await?, 2);
    let other_order_id = placed.order.id;

    // Lines whose item vanished are dropped at checkout
    let mut cart = Cart::new();
    cart.add(Uuid::new_v4(), 3);
    cart.add(arancini.id, 1);
    let second = order_service::place_order(&state, &user, &mut cart, checkout_request())
        .await?
        .data
        .unwrap();
    assert_eq!(second.items.len(), 1);
    assert_eq!(second.items[0].menu_item_id, arancini.id);
    assert_eq!(second.order.total_price, Decimal::new(450, 2));

    // Newest first
    let mine = order_service::list_orders(&state, &user).await?.data.unwrap();
    let ids: Vec<Uuid> = mine.items.iter().map(|order| order.id).collect();
    assert_eq!(ids, vec![second.order.id, first_order_id]);

    // Admin listing: pagination and status filter
    let page = admin_service::list_all_orders(
        &state,
        &admin,
        OrderListQuery {
            pagination: Pagination {
                page: Some(1),
                per_page: Some(1),
            },
            status: None,
            sort_order: None,
        },
    )
    .await?;
    assert_eq!(page.meta.as_ref().and_then(|meta| meta.total), Some(3));
    let page_items = page.data.unwrap().items;
    assert_eq!(page_items.len(), 1);
    assert_eq!(page_items[0].id, second.order.id);

    let preparing = admin_service::list_all_orders(
        &state,
        &admin,
        OrderListQuery {
            status: Some(OrderStatus::Preparing),
            ..Default::default()
        },
    )
    .await?
    .data
    .unwrap();
    let preparing_ids: Vec<Uuid> = preparing.items.iter().map(|order| order.id).collect();
    assert_eq!(preparing_ids, vec![first_order_id]);

    let not_admin = admin_service::list_all_orders(&state, &user, OrderListQuery::default())
        .await
        .unwrap_err();
    assert!(matches!(not_admin, AppError::Forbidden));

    // Admins can open any order
    let any = admin_service::get_order_admin(&state, &admin, other_order_id)
        .await?
        .data
        .unwrap();
    assert_eq!(any.order.user_id, other.user_id);
    assert_eq!(any.items.len(), 1);
    let missing = admin_service::get_order_admin(&state, &admin, Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(missing, AppError::NotFound));

    // A total beyond what an order can store is a form error, not a crash
    let mut cart = Cart::new();
    cart.add(margherita.id, 20_000_000);
    let too_big = order_service::place_order(&state, &user, &mut cart, checkout_request())
        .await
        .unwrap_err();
    assert!(matches!(too_big, AppError::Validation(_)));
    assert_eq!(cart.len(), 1);
    assert_eq!(count_orders(&state).await?, 3);

    Ok(())
}

async fn setup_state(database_url: &str) -> anyhow::Result<AppState> {
    let orm = create_orm_conn(database_url).await?;
    run_migrations(&orm).await?;

    // Clean tables between runs
    let backend = orm.get_database_backend();
    orm.execute(Statement::from_string(
        backend,
        "TRUNCATE TABLE order_items, orders, menu_items, categories, profiles, users CASCADE",
    ))
    .await?;

    Ok(AppState {
        orm,
        mailer: Mailer::memory("no-reply@example.com"),
    })
}

async fn create_item(
    state: &AppState,
    admin: &AuthUser,
    category_id: Uuid,
    name: &str,
    price: Decimal,
) -> anyhow::Result<food_order::models::MenuItem> {
    let item = admin_service::create_item(
        state,
        admin,
        CreateMenuItemRequest {
            category_id,
            name: name.into(),
            slug: None,
            description: String::new(),
            price,
            is_available: None,
        },
    )
    .await?
    .data
    .unwrap();
    Ok(item)
}

async fn browse_names(state: &AppState, category: Option<&str>) -> anyhow::Result<Vec<String>> {
    let page = catalog_service::browse(
        state,
        BrowseQuery {
            category: category.map(str::to_string),
        },
    )
    .await?
    .data
    .unwrap();
    Ok(page.items.into_iter().map(|item| item.name).collect())
}

fn register_request(username: &str, password: &str, confirm: &str) -> RegisterRequest {
    RegisterRequest {
        username: username.into(),
        email: format!("{username}@example.com"),
        password: password.into(),
        confirm_password: confirm.into(),
    }
}

async fn login(state: &AppState, username: &str, password: &str) -> anyhow::Result<AuthUser> {
    let current = auth_service::authenticate(
        state,
        LoginRequest {
            username: username.into(),
            password: password.into(),
        },
    )
    .await?;
    Ok(AuthUser::from(current))
}

fn checkout_request() -> CheckoutRequest {
    CheckoutRequest {
        phone: "555-0100".into(),
        address: "1 Main St".into(),
    }
}

async fn count_users(state: &AppState, username: &str) -> anyhow::Result<u64> {
    Ok(users::Entity::find()
        .filter(users::Column::Username.eq(username))
        .count(&state.orm)
        .await?)
}

async fn count_orders(state: &AppState) -> anyhow::Result<u64> {
    Ok(food_order::entity::Orders::find().count(&state.orm).await?)
}
