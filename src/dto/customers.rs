use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{Customer, Order};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCustomerRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateCustomerRequest {
    pub customer_id: i32,
    pub name: String,
    pub email: String,
    pub phone: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CustomerList {
    pub items: Vec<Customer>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CustomerWithOrders {
    pub customer: Customer,
    pub orders: Vec<Order>,
}
