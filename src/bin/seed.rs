use axum_bookstore_api::{config::AppConfig, db::create_pool};
use chrono::{Datelike, NaiveDate, Utc};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    // Ensure migrations are applied.
    sqlx::migrate!("./migrations").run(&pool).await?;

    seed_categories(&pool).await?;
    seed_books(&pool).await?;

    println!("Seed completed");
    Ok(())
}

async fn seed_categories(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    for name in ["Fiction", "Non-Fiction", "Science"] {
        sqlx::query(
            r#"
            INSERT INTO categories (name)
            VALUES ($1)
            ON CONFLICT (name) DO NOTHING
            "#,
        )
        .bind(name)
        .execute(pool)
        .await?;
    }

    println!("Seeded categories");
    Ok(())
}

async fn seed_books(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let this_year = Utc::now().year();
    let books = vec![
        (
            "Sample Book 1",
            "Author 1",
            "1234567890",
            NaiveDate::from_ymd_opt(this_year - 1, 1, 15).unwrap(),
            "29.99",
            "Sample book description",
            "Fiction",
        ),
        (
            "Sample Book 2",
            "Author 2",
            "0987654321",
            NaiveDate::from_ymd_opt(this_year - 2, 6, 1).unwrap(),
            "39.99",
            "Another sample book description",
            "Non-Fiction",
        ),
    ];

    for (title, author, isbn, published, price, description, category) in books {
        sqlx::query(
            r#"
            INSERT INTO books (title, author, isbn, published_date, price, description, category_id)
            SELECT $1, $2, $3, $4, $5::numeric, $6, c.id
            FROM categories c
            WHERE c.name = $7
            ON CONFLICT (isbn) DO NOTHING
            "#,
        )
        .bind(title)
        .bind(author)
        .bind(isbn)
        .bind(published)
        .bind(price)
        .bind(description)
        .bind(category)
        .execute(pool)
        .await?;
    }

    println!("Seeded books");
    Ok(())
}
