use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};

use crate::{
    dto::books::{BookList, BookSuggestionList, CreateBookRequest, UpdateBookRequest},
    error::AppResult,
    models::Book,
    response::ApiResponse,
    routes::params::{BookQuery, QuickSearchQuery},
    services::book_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_books).post(create_book))
        .route("/search", get(quick_search))
        .route(
            "/{id}",
            get(get_book).put(update_book).delete(delete_book),
        )
}

#[utoipa::path(
    get,
    path = "/api/books",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 8"),
        ("q" = Option<String>, Query, description = "Title/author substring, case-insensitive"),
        ("category_id" = Option<i32>, Query, description = "Restrict to one category"),
    ),
    responses(
        (status = 200, description = "List books, most recently published first", body = ApiResponse<BookList>)
    ),
    tag = "Books"
)]
pub async fn list_books(
    State(state): State<AppState>,
    Query(query): Query<BookQuery>,
) -> AppResult<Json<ApiResponse<BookList>>> {
    let resp = book_service::list_books(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/books/search",
    params(
        ("q" = Option<String>, Query, description = "Title/author substring"),
    ),
    responses(
        (status = 200, description = "Up to 10 matches with display fields only", body = ApiResponse<BookSuggestionList>)
    ),
    tag = "Books"
)]
pub async fn quick_search(
    State(state): State<AppState>,
    Query(query): Query<QuickSearchQuery>,
) -> AppResult<Json<ApiResponse<BookSuggestionList>>> {
    let resp = book_service::quick_search(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/books/{id}",
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Get book", body = ApiResponse<Book>),
        (status = 404, description = "Book not found"),
    ),
    tag = "Books"
)]
pub async fn get_book(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<Book>>> {
    let resp = book_service::get_book(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/books",
    request_body = CreateBookRequest,
    responses(
        (status = 200, description = "Create book, uploading the cover when supplied", body = ApiResponse<Book>),
        (status = 400, description = "Validation failed"),
        (status = 404, description = "Category not found"),
    ),
    tag = "Books"
)]
pub async fn create_book(
    State(state): State<AppState>,
    Json(payload): Json<CreateBookRequest>,
) -> AppResult<Json<ApiResponse<Book>>> {
    let resp = book_service::create_book(&state, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/books/{id}",
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    request_body = UpdateBookRequest,
    responses(
        (status = 200, description = "Updated book", body = ApiResponse<Book>),
        (status = 400, description = "Validation failed"),
        (status = 404, description = "Book not found or id mismatch"),
    ),
    tag = "Books"
)]
pub async fn update_book(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateBookRequest>,
) -> AppResult<Json<ApiResponse<Book>>> {
    let resp = book_service::update_book(&state, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/books/{id}",
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Deleted book and released its hosted cover"),
    ),
    tag = "Books"
)]
pub async fn delete_book(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = book_service::delete_book(&state, id).await?;
    Ok(Json(resp))
}
