use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::Book;

/// Cover file carried inline in the JSON submission: original filename plus
/// base64-encoded bytes.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CoverImageUpload {
    pub filename: String,
    pub data: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateBookRequest {
    pub title: String,
    pub author: String,
    pub published_date: NaiveDate,
    pub isbn: String,
    pub category_id: i32,
    pub price: Decimal,
    pub description: Option<String>,
    pub cover_image: Option<CoverImageUpload>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateBookRequest {
    pub book_id: i32,
    pub title: String,
    pub author: String,
    pub published_date: NaiveDate,
    pub isbn: String,
    pub category_id: i32,
    pub price: Decimal,
    pub description: Option<String>,
    pub cover_image: Option<CoverImageUpload>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BookList {
    pub items: Vec<Book>,
}

/// Display fields for the typeahead quick search.
#[derive(Debug, Serialize, ToSchema)]
pub struct BookSuggestion {
    pub title: String,
    pub author: String,
    pub price: Decimal,
    pub isbn: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BookSuggestionList {
    pub items: Vec<BookSuggestion>,
}
