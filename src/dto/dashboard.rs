use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use crate::models::{Book, Order};

#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardSummary {
    pub total_books: i64,
    pub total_categories: i64,
    pub total_customers: i64,
    pub total_orders: i64,
    pub total_revenue: Decimal,
    pub recent_orders: Vec<Order>,
    pub recent_books: Vec<Book>,
}
