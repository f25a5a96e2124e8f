use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

use crate::{
    audit::log_audit,
    dto::books::{
        BookList, BookSuggestion, BookSuggestionList, CoverImageUpload, CreateBookRequest,
        UpdateBookRequest,
    },
    entity::{
        books::{ActiveModel, Column, Entity as Books, Model as BookModel},
        categories::Entity as Categories,
    },
    error::{AppError, AppResult},
    imaging::extract_public_id,
    models::Book,
    response::{ApiResponse, Meta},
    routes::params::{BookQuery, QuickSearchQuery},
    state::AppState,
};

pub async fn list_books(state: &AppState, query: BookQuery) -> AppResult<ApiResponse<BookList>> {
    let (page, limit, offset) = query.pagination().normalize();
    let mut condition = Condition::all();

    if let Some(search) = query.q.as_ref().filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search);
        condition = condition.add(
            Condition::any()
                .add(Expr::col(Column::Title).ilike(pattern.clone()))
                .add(Expr::col(Column::Author).ilike(pattern)),
        );
    }

    if let Some(category_id) = query.category_id {
        condition = condition.add(Column::CategoryId.eq(category_id));
    }

    // Most recently published first; id ascending keeps equal dates in
    // insertion order.
    let finder = Books::find()
        .filter(condition)
        .order_by_desc(Column::PublishedDate)
        .order_by_asc(Column::Id);

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(book_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    let data = BookList { items };
    Ok(ApiResponse::success("Books", data, Some(meta)))
}

/// Typeahead search: up to 10 display-only matches. A blank query returns
/// an empty list without touching the store.
pub async fn quick_search(
    state: &AppState,
    query: QuickSearchQuery,
) -> AppResult<ApiResponse<BookSuggestionList>> {
    let q = query.q.unwrap_or_default();
    let q = q.trim();
    if q.is_empty() {
        let data = BookSuggestionList { items: Vec::new() };
        return Ok(ApiResponse::success("Books", data, None));
    }

    let pattern = format!("%{}%", q);
    let items = Books::find()
        .filter(
            Condition::any()
                .add(Expr::col(Column::Title).ilike(pattern.clone()))
                .add(Expr::col(Column::Author).ilike(pattern)),
        )
        .limit(10)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|b| BookSuggestion {
            title: b.title,
            author: b.author,
            price: b.price,
            isbn: b.isbn,
        })
        .collect();

    let data = BookSuggestionList { items };
    Ok(ApiResponse::success("Books", data, None))
}

pub async fn get_book(state: &AppState, id: i32) -> AppResult<ApiResponse<Book>> {
    let result = Books::find_by_id(id)
        .one(&state.orm)
        .await?
        .map(book_from_entity);
    let result = match result {
        Some(b) => b,
        None => return Err(AppError::NotFound),
    };
    Ok(ApiResponse::success("Book", result, None))
}

pub async fn create_book(
    state: &AppState,
    payload: CreateBookRequest,
) -> AppResult<ApiResponse<Book>> {
    validate_book_fields(
        &payload.title,
        &payload.author,
        &payload.isbn,
        payload.price,
        payload.description.as_deref(),
    )?;
    ensure_category_exists(state, payload.category_id).await?;

    let cover_image_url = match &payload.cover_image {
        Some(upload) => upload_cover(state, upload).await?,
        None => None,
    };

    let active = ActiveModel {
        id: NotSet,
        title: Set(payload.title),
        author: Set(payload.author),
        published_date: Set(payload.published_date),
        isbn: Set(payload.isbn),
        category_id: Set(payload.category_id),
        price: Set(payload.price),
        cover_image_url: Set(cover_image_url),
        description: Set(payload.description),
        created_at: NotSet,
    };
    let book = active.insert(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        "book_create",
        Some("books"),
        Some(serde_json::json!({ "book_id": book.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Book created",
        book_from_entity(book),
        Some(Meta::empty()),
    ))
}

pub async fn update_book(
    state: &AppState,
    id: i32,
    payload: UpdateBookRequest,
) -> AppResult<ApiResponse<Book>> {
    if id != payload.book_id {
        return Err(AppError::NotFound);
    }
    validate_book_fields(
        &payload.title,
        &payload.author,
        &payload.isbn,
        payload.price,
        payload.description.as_deref(),
    )?;

    let existing = Books::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(b) => b,
        None => return Err(AppError::NotFound),
    };
    ensure_category_exists(state, payload.category_id).await?;

    // Replacing the cover releases the old hosted image first; the record
    // keeps whatever the upload step produced.
    let mut cover_image_url = existing.cover_image_url.clone();
    if let Some(upload) = &payload.cover_image {
        if let Some(old_url) = cover_image_url.as_deref().filter(|u| !u.is_empty()) {
            release_cover(state, old_url).await;
        }
        cover_image_url = upload_cover(state, upload).await?;
    }

    let mut active: ActiveModel = existing.into();
    active.title = Set(payload.title);
    active.author = Set(payload.author);
    active.published_date = Set(payload.published_date);
    active.isbn = Set(payload.isbn);
    active.category_id = Set(payload.category_id);
    active.price = Set(payload.price);
    active.cover_image_url = Set(cover_image_url);
    active.description = Set(payload.description);
    let book = active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        "book_update",
        Some("books"),
        Some(serde_json::json!({ "book_id": book.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Updated",
        book_from_entity(book),
        Some(Meta::empty()),
    ))
}

pub async fn delete_book(state: &AppState, id: i32) -> AppResult<ApiResponse<serde_json::Value>> {
    let book = Books::find_by_id(id).one(&state.orm).await?;
    let book = match book {
        Some(b) => b,
        // Already gone; deletion is idempotent.
        None => {
            return Ok(ApiResponse::success(
                "Deleted",
                serde_json::json!({}),
                Some(Meta::empty()),
            ));
        }
    };

    if let Some(url) = book.cover_image_url.as_deref().filter(|u| !u.is_empty()) {
        release_cover(state, url).await;
    }

    Books::delete_by_id(id).exec(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        "book_delete",
        Some("books"),
        Some(serde_json::json!({ "book_id": id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

async fn ensure_category_exists(state: &AppState, category_id: i32) -> AppResult<()> {
    let exists = Categories::find_by_id(category_id).one(&state.orm).await?;
    if exists.is_none() {
        return Err(AppError::NotFound);
    }
    Ok(())
}

fn validate_book_fields(
    title: &str,
    author: &str,
    isbn: &str,
    price: rust_decimal::Decimal,
    description: Option<&str>,
) -> AppResult<()> {
    if title.is_empty() || title.len() > 200 {
        return Err(AppError::Validation(
            "title is required and must not exceed 200 characters".into(),
        ));
    }
    if author.is_empty() || author.len() > 100 {
        return Err(AppError::Validation(
            "author is required and must not exceed 100 characters".into(),
        ));
    }
    if isbn.is_empty() || isbn.len() > 20 {
        return Err(AppError::Validation(
            "isbn is required and must not exceed 20 characters".into(),
        ));
    }
    if price <= rust_decimal::Decimal::ZERO {
        return Err(AppError::Validation("price must be greater than 0".into()));
    }
    if description.is_some_and(|d| d.len() > 2000) {
        return Err(AppError::Validation(
            "description must not exceed 2000 characters".into(),
        ));
    }
    Ok(())
}

/// Upload a cover, absorbing host failures: the book operation proceeds
/// without a cover when the host is unavailable.
async fn upload_cover(state: &AppState, upload: &CoverImageUpload) -> AppResult<Option<String>> {
    let bytes = BASE64
        .decode(upload.data.as_bytes())
        .map_err(|_| AppError::Validation("cover image is not valid base64".into()))?;

    match state.images.upload(&upload.filename, bytes).await {
        Ok(url) => Ok(Some(url)),
        Err(err) => {
            tracing::warn!(error = %err, filename = %upload.filename, "cover upload failed");
            Ok(None)
        }
    }
}

/// Best-effort deletion of a hosted cover. An unextractable id is skipped
/// silently; host failures are logged and ignored.
async fn release_cover(state: &AppState, cover_url: &str) {
    let Some(public_id) = extract_public_id(cover_url) else {
        return;
    };
    match state.images.delete(&public_id).await {
        Ok(true) => {}
        Ok(false) => {
            tracing::warn!(public_id = %public_id, "image host did not confirm cover deletion");
        }
        Err(err) => {
            tracing::warn!(error = %err, public_id = %public_id, "cover deletion failed");
        }
    }
}

fn book_from_entity(model: BookModel) -> Book {
    Book {
        id: model.id,
        title: model.title,
        author: model.author,
        published_date: model.published_date,
        isbn: model.isbn,
        category_id: model.category_id,
        price: model.price,
        cover_image_url: model.cover_image_url,
        description: model.description,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
