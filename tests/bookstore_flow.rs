use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{ConnectionTrait, Statement};

use axum_bookstore_api::{
    db::{create_orm_conn, create_pool, run_migrations},
    dto::{
        books::{CoverImageUpload, CreateBookRequest, UpdateBookRequest},
        categories::CreateCategoryRequest,
        customers::CreateCustomerRequest,
        orders::{CreateOrderRequest, UpdateOrderRequest},
    },
    error::AppError,
    imaging::{ImageError, ImageStore},
    routes::params::{BookQuery, Pagination, QuickSearchQuery},
    services::{book_service, category_service, customer_service, order_service},
    state::AppState,
};

/// Image host stub that records every call and always succeeds.
#[derive(Default)]
struct RecordingImages {
    uploads: Mutex<Vec<String>>,
    deletes: Mutex<Vec<String>>,
}

impl RecordingImages {
    fn upload_count(&self) -> usize {
        self.uploads.lock().unwrap().len()
    }

    fn delete_count(&self) -> usize {
        self.deletes.lock().unwrap().len()
    }
}

#[async_trait]
impl ImageStore for RecordingImages {
    async fn upload(&self, filename: &str, _bytes: Vec<u8>) -> Result<String, ImageError> {
        self.uploads.lock().unwrap().push(filename.to_string());
        Ok(format!(
            "https://res.example.com/demo/image/upload/v1700000000/book-covers/{filename}"
        ))
    }

    async fn delete(&self, public_id: &str) -> Result<bool, ImageError> {
        self.deletes.lock().unwrap().push(public_id.to_string());
        Ok(true)
    }
}

// End-to-end flow over the real store: catalog search and paging, order
// composition with full-replace edits, and the cover image lifecycle.
#[tokio::test]
async fn catalog_orders_and_cover_lifecycle_flow() -> anyhow::Result<()> {
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

    let images = Arc::new(RecordingImages::default());
    let state = setup_state(&database_url, images.clone()).await?;

    // Seed a category and two books, one with a cover.
    let category = category_service::create_category(
        &state,
        CreateCategoryRequest {
            name: "Science Fiction".into(),
        },
    )
    .await?
    .data
    .unwrap();

    let dune = book_service::create_book(
        &state,
        CreateBookRequest {
            title: "Dune".into(),
            author: "Frank Herbert".into(),
            published_date: NaiveDate::from_ymd_opt(1965, 8, 1).unwrap(),
            isbn: "9780441172719".into(),
            category_id: category.id,
            price: Decimal::new(1999, 2),
            description: Some("Desert planet epic".into()),
            cover_image: Some(CoverImageUpload {
                filename: "dune.jpg".into(),
                data: BASE64.encode(b"fake image bytes"),
            }),
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(images.upload_count(), 1);
    let cover_url = dune.cover_image_url.clone().expect("cover stored");
    assert!(cover_url.contains("book-covers/dune.jpg"));

    let foundation = book_service::create_book(
        &state,
        CreateBookRequest {
            title: "Foundation".into(),
            author: "Asimov".into(),
            published_date: NaiveDate::from_ymd_opt(1951, 6, 1).unwrap(),
            isbn: "9780553293357".into(),
            category_id: category.id,
            price: Decimal::new(1499, 2),
            description: None,
            cover_image: None,
        },
    )
    .await?
    .data
    .unwrap();
    assert!(foundation.cover_image_url.is_none());

    // Case-insensitive search matches "Dune" only.
    let found = book_service::list_books(
        &state,
        BookQuery {
            page: None,
            per_page: None,
            q: Some("dune".into()),
            category_id: None,
        },
    )
    .await?;
    let found_items = found.data.unwrap().items;
    assert_eq!(found_items.len(), 1);
    assert_eq!(found_items[0].title, "Dune");

    // Category filter plus paging: newest published first, one per page.
    let page_one = book_service::list_books(
        &state,
        BookQuery {
            page: Some(1),
            per_page: Some(1),
            q: None,
            category_id: Some(category.id),
        },
    )
    .await?;
    let meta = page_one.meta.clone().unwrap();
    assert_eq!(meta.total, Some(2));
    assert_eq!(meta.total_pages, Some(2));
    let page_one_items = page_one.data.unwrap().items;
    assert_eq!(page_one_items.len(), 1);
    assert_eq!(page_one_items[0].title, "Dune");

    // A page past the end is empty, not an error.
    let far_page = book_service::list_books(
        &state,
        BookQuery {
            page: Some(99),
            per_page: Some(1),
            q: None,
            category_id: Some(category.id),
        },
    )
    .await?;
    assert!(far_page.data.unwrap().items.is_empty());

    // Quick search: matches carry display fields; blank input short-circuits.
    let suggestions = book_service::quick_search(
        &state,
        QuickSearchQuery {
            q: Some("DUNE".into()),
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(suggestions.items.len(), 1);
    assert_eq!(suggestions.items[0].isbn, "9780441172719");

    let blank = book_service::quick_search(
        &state,
        QuickSearchQuery {
            q: Some("   ".into()),
        },
    )
    .await?
    .data
    .unwrap();
    assert!(blank.items.is_empty());

    // A category with books cannot be deleted.
    let blocked = category_service::delete_category(&state, category.id).await;
    assert!(matches!(blocked, Err(AppError::Validation(_))));

    // Order composition.
    let customer = customer_service::create_customer(
        &state,
        CreateCustomerRequest {
            name: "Paul Atreides".into(),
            email: "paul@arrakis.example".into(),
            phone: "555-0199".into(),
        },
    )
    .await?
    .data
    .unwrap();

    // Missing customer selection fails before any write.
    let rejected = order_service::create_order(
        &state,
        CreateOrderRequest {
            customer_id: 0,
            order_date: None,
            items_json: Some(r#"[{"productName":"A","quantity":1,"unitPrice":1.0}]"#.into()),
        },
    )
    .await;
    assert!(matches!(rejected, Err(AppError::Validation(_))));
    let orders = order_service::list_orders(
        &state,
        Pagination {
            page: None,
            per_page: None,
        },
    )
    .await?;
    assert_eq!(orders.meta.unwrap().total, Some(0));

    // Create with a single item, then replace the whole set via edit.
    let created = order_service::create_order(
        &state,
        CreateOrderRequest {
            customer_id: customer.id,
            order_date: None,
            items_json: Some(r#"[{"productName":"C","quantity":3,"unitPrice":2.0}]"#.into()),
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(created.order.total_amount, Decimal::new(60, 1));
    assert_eq!(created.items.len(), 1);

    let edited = order_service::update_order(
        &state,
        created.order.id,
        UpdateOrderRequest {
            order_id: created.order.id,
            customer_id: customer.id,
            order_date: None,
            items_json: Some(
                r#"[{"productName":"A","quantity":2,"unitPrice":5.0},{"productName":"B","quantity":1,"unitPrice":3.0}]"#
                    .into(),
            ),
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(edited.order.total_amount, Decimal::new(130, 1));
    assert_eq!(edited.items.len(), 2);

    let fetched = order_service::get_order(&state, created.order.id)
        .await?
        .data
        .unwrap();
    assert_eq!(fetched.items.len(), 2);
    assert_eq!(fetched.items[0].product_name, "A");
    assert_eq!(fetched.items[0].subtotal, Decimal::new(100, 1));
    assert_eq!(fetched.items[1].subtotal, Decimal::new(30, 1));

    // Path/body id mismatch reads as a missing order.
    let mismatch = order_service::update_order(
        &state,
        created.order.id,
        UpdateOrderRequest {
            order_id: created.order.id + 1,
            customer_id: customer.id,
            order_date: None,
            items_json: None,
        },
    )
    .await;
    assert!(matches!(mismatch, Err(AppError::NotFound)));

    // Delete removes items first; a second delete is a quiet no-op.
    order_service::delete_order(&state, created.order.id).await?;
    let gone = order_service::get_order(&state, created.order.id).await;
    assert!(matches!(gone, Err(AppError::NotFound)));
    order_service::delete_order(&state, created.order.id).await?;

    // Replacing a cover releases the old hosted image before uploading.
    let deletes_before = images.delete_count();
    let updated = book_service::update_book(
        &state,
        dune.id,
        UpdateBookRequest {
            book_id: dune.id,
            title: dune.title.clone(),
            author: dune.author.clone(),
            published_date: dune.published_date,
            isbn: dune.isbn.clone(),
            category_id: dune.category_id,
            price: dune.price,
            description: dune.description.clone(),
            cover_image: Some(CoverImageUpload {
                filename: "dune-v2.jpg".into(),
                data: BASE64.encode(b"new image bytes"),
            }),
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(images.delete_count(), deletes_before + 1);
    assert_eq!(images.upload_count(), 2);
    assert_eq!(
        images.deletes.lock().unwrap().last().map(String::as_str),
        Some("book-covers/dune.jpg")
    );
    assert!(
        updated
            .cover_image_url
            .as_deref()
            .unwrap()
            .contains("dune-v2.jpg")
    );

    // Deleting a book with a cover issues exactly one image delete; a book
    // without one issues none.
    let deletes_before = images.delete_count();
    book_service::delete_book(&state, dune.id).await?;
    assert_eq!(images.delete_count(), deletes_before + 1);

    let deletes_before = images.delete_count();
    book_service::delete_book(&state, foundation.id).await?;
    assert_eq!(images.delete_count(), deletes_before);

    // With its books gone the category can be removed.
    category_service::delete_category(&state, category.id).await?;

    Ok(())
}

async fn setup_state(
    database_url: &str,
    images: Arc<RecordingImages>,
) -> anyhow::Result<AppState> {
    let pool = create_pool(database_url).await?;
    let orm = create_orm_conn(database_url).await?;
    run_migrations(&orm).await?;

    // Clean tables between runs
    let backend = orm.get_database_backend();
    orm.execute(Statement::from_string(
        backend,
        "TRUNCATE TABLE order_items, orders, audit_logs, books, customers, categories RESTART IDENTITY CASCADE",
    ))
    .await?;

    Ok(AppState { pool, orm, images })
}
