use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{Order, OrderItem};

/// One entry of the client's line-item payload. The payload arrives as a
/// JSON string whose elements use the camelCase keys the form widget emits.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemInput {
    pub product_name: String,
    pub quantity: i32,
    pub unit_price: Decimal,
}

impl OrderItemInput {
    pub fn subtotal(&self) -> Decimal {
        Decimal::from(self.quantity) * self.unit_price
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    pub customer_id: i32,
    pub order_date: Option<DateTime<Utc>>,
    pub items_json: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOrderRequest {
    pub order_id: i32,
    pub customer_id: i32,
    pub order_date: Option<DateTime<Utc>>,
    pub items_json: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderWithItems {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderList {
    pub items: Vec<Order>,
}
