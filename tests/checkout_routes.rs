use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
    response::Response,
};
use food_order::{
    db::{create_orm_conn, run_migrations},
    dto::{
        admin::{CreateCategoryRequest, CreateMenuItemRequest},
        auth::RegisterRequest,
    },
    mailer::Mailer,
    middleware::{auth::AuthUser, session::create_session_layer},
    routes::create_router,
    services::{admin_service, auth_service},
    state::AppState,
};
use rust_decimal::Decimal;
use sea_orm::{ConnectionTrait, Statement};
use serde_json::{Value, json};
use tower::ServiceExt;
use tower_sessions::MemoryStore;
use uuid::Uuid;

/// Router plus the session cookie it last handed out.
struct Client {
    app: Router,
    cookie: Option<String>,
}

impl Client {
    async fn send(&mut self, method: &str, uri: &str, body: Option<Value>) -> Response {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(cookie) = &self.cookie {
            request = request.header(header::COOKIE, cookie.as_str());
        }
        let request = match body {
            Some(body) => request
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        if let Some(set_cookie) = response.headers().get(header::SET_COOKIE) {
            let pair = set_cookie.to_str().unwrap().split(';').next().unwrap();
            self.cookie = Some(pair.to_string());
        }
        response
    }
}

async fn json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn checkout_redirects_on_success_and_echoes_the_form_on_errors() -> anyhow::Result<()> {
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!(
                "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run checkout route tests."
            );
            return Ok(());
        }
    };

    let state = setup_state(&database_url).await?;
    let slug = seed_item(&state).await?;
    auth_service::register_user(
        &state,
        RegisterRequest {
            username: "diner".into(),
            email: "diner@example.com".into(),
            password: "pw".into(),
            confirm_password: "pw".into(),
        },
    )
    .await?;

    let mut client = Client {
        app: create_router()
            .layer(create_session_layer(MemoryStore::default(), false))
            .with_state(state),
        cookie: None,
    };

    let response = client
        .send(
            "POST",
            "/login/",
            Some(json!({ "username": "diner", "password": "pw" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(client.cookie.is_some());

    // Empty cart wins over an incomplete form
    let response = client
        .send("POST", "/checkout/", Some(json!({ "phone": "555" })))
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/");

    let response = client
        .send("POST", &format!("/item/{slug}/"), Some(json!({ "quantity": 2 })))
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/cart/");

    // Missing and blank fields come back as a 400 form with the cart intact
    let response = client
        .send("POST", "/checkout/", Some(json!({ "phone": "555" })))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["data"]["form"]["phone"], "555");
    assert!(body["data"]["errors"]["address"].is_array());

    let response = client
        .send(
            "POST",
            "/checkout/",
            Some(json!({ "phone": "   ", "address": "1 Main St" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["data"]["form"]["address"], "1 Main St");
    assert!(body["data"]["errors"]["phone"].is_array());
    assert_eq!(body["data"]["cart"]["total"], "10.00");

    let body = json_body(client.send("GET", "/cart/", None).await).await;
    assert_eq!(body["data"]["items"].as_array().map(Vec::len), Some(1));

    // Success: redirect to the new order and an empty stored cart
    let response = client
        .send(
            "POST",
            "/checkout/",
            Some(json!({ "phone": "555-0100", "address": "1 Main St" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let location = response.headers()[header::LOCATION].to_str()?.to_string();
    let body = json_body(response).await;
    let order_id = body["data"]["order"]["id"].as_str().unwrap().to_string();
    assert_eq!(location, format!("/orders/{order_id}/"));
    assert_eq!(body["data"]["order"]["total_price"], "10.00");

    let response = client.send("GET", &location, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["data"]["items"][0]["quantity"], 2);

    let body = json_body(client.send("GET", "/cart/", None).await).await;
    assert_eq!(body["data"]["items"], json!([]));

    Ok(())
}

async fn setup_state(database_url: &str) -> anyhow::Result<AppState> {
    let orm = create_orm_conn(database_url).await?;
    run_migrations(&orm).await?;

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

async fn seed_item(state: &AppState) -> anyhow::Result<String> {
    let admin = AuthUser {
        user_id: Uuid::new_v4(),
        username: "admin".into(),
        email: String::new(),
        role: "admin".into(),
    };
    let category = admin_service::create_category(
        state,
        &admin,
        CreateCategoryRequest {
            name: "Bakery".into(),
            slug: None,
        },
    )
    .await?
    .data
    .unwrap();
    let item = admin_service::create_item(
        state,
        &admin,
        CreateMenuItemRequest {
            category_id: category.id,
            name: "Focaccia".into(),
            slug: None,
            description: String::new(),
            price: Decimal::new(500, 2),
            is_available: None,
        },
    )
    .await?
    .data
    .unwrap();
    Ok(item.slug)
}
