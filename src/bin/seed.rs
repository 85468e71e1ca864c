use food_order::{
    config::AppConfig,
    db::{create_orm_conn, pg_pool, run_migrations},
    services::auth_service::hash_password,
    slug::{menu_item_slug, slugify},
};
use uuid::Uuid;

const MENU: &[(&str, &[(&str, &str, &str)])] = &[
    (
        "Pizza",
        &[
            ("Margherita", "Tomato, mozzarella and basil", "10.00"),
            ("Pepperoni", "Spicy salami and mozzarella", "12.50"),
        ],
    ),
    (
        "Drinks",
        &[
            ("Soda", "330ml can", "1.50"),
            ("Lemonade", "Freshly squeezed", "3.00"),
        ],
    ),
    (
        "Desserts",
        &[("Tiramisu", "Coffee and mascarpone", "5.75")],
    ),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let orm = create_orm_conn(&config.database_url).await?;
    // Ensure migrations are applied.
    run_migrations(&orm).await?;
    let pool = pg_pool(&orm);

    let admin_id = ensure_user(&pool, "admin", "admin@example.com", "admin123", "admin").await?;
    let user_id = ensure_user(&pool, "demo", "demo@example.com", "demo123", "user").await?;
    seed_menu(&pool).await?;

    println!("Seed completed. Admin ID: {admin_id}, User ID: {user_id}");
    Ok(())
}

async fn ensure_user(
    pool: &sqlx::PgPool,
    username: &str,
    email: &str,
    password: &str,
    role: &str,
) -> anyhow::Result<Uuid> {
    let password_hash = hash_password(password)?;

    let row: Option<(Uuid,)> = sqlx::query_as(
        r#"
        INSERT INTO users (id, username, email, password_hash, role)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (username) DO UPDATE SET role = EXCLUDED.role
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(username)
    .bind(email)
    .bind(password_hash)
    .bind(role)
    .fetch_optional(pool)
    .await?;

    let user_id = match row {
        Some((id,)) => id,
        None => {
            let existing: (Uuid,) = sqlx::query_as("SELECT id FROM users WHERE username = $1")
                .bind(username)
                .fetch_one(pool)
                .await?;
            existing.0
        }
    };

    sqlx::query(
        r#"
        INSERT INTO profiles (id, user_id)
        VALUES ($1, $2)
        ON CONFLICT (user_id) DO NOTHING
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .execute(pool)
    .await?;

    Ok(user_id)
}

async fn seed_menu(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    for (category, items) in MENU {
        let category_slug = slugify(category);
        let (category_id,): (Uuid,) = sqlx::query_as(
            r#"
            INSERT INTO categories (id, name, slug)
            VALUES ($1, $2, $3)
            ON CONFLICT (slug) DO UPDATE SET name = EXCLUDED.name
            RETURNING id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(*category)
        .bind(&category_slug)
        .fetch_one(pool)
        .await?;

        for (name, description, price) in *items {
            sqlx::query(
                r#"
                INSERT INTO menu_items (id, category_id, name, slug, description, price)
                VALUES ($1, $2, $3, $4, $5, $6::NUMERIC)
                ON CONFLICT (slug) DO NOTHING
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(category_id)
            .bind(*name)
            .bind(menu_item_slug(name, &category_slug))
            .bind(*description)
            .bind(*price)
            .execute(pool)
            .await?;
        }
    }

    println!("Seeded menu");
    Ok(())
}
