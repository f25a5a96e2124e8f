use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};

use crate::{
    dto::customers::{CreateCustomerRequest, CustomerList, CustomerWithOrders, UpdateCustomerRequest},
    error::AppResult,
    models::Customer,
    response::ApiResponse,
    services::customer_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_customers).post(create_customer))
        .route(
            "/{id}",
            get(get_customer).put(update_customer).delete(delete_customer),
        )
}

#[utoipa::path(
    get,
    path = "/api/customers",
    responses(
        (status = 200, description = "List customers", body = ApiResponse<CustomerList>)
    ),
    tag = "Customers"
)]
pub async fn list_customers(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<CustomerList>>> {
    let resp = customer_service::list_customers(&state).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/customers/{id}",
    params(
        ("id" = i32, Path, description = "Customer ID")
    ),
    responses(
        (status = 200, description = "Get customer with their orders", body = ApiResponse<CustomerWithOrders>),
        (status = 404, description = "Customer not found"),
    ),
    tag = "Customers"
)]
pub async fn get_customer(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<CustomerWithOrders>>> {
    let resp = customer_service::get_customer(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/customers",
    request_body = CreateCustomerRequest,
    responses(
        (status = 200, description = "Create customer", body = ApiResponse<Customer>),
        (status = 400, description = "Validation failed"),
    ),
    tag = "Customers"
)]
pub async fn create_customer(
    State(state): State<AppState>,
    Json(payload): Json<CreateCustomerRequest>,
) -> AppResult<Json<ApiResponse<Customer>>> {
    let resp = customer_service::create_customer(&state, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/customers/{id}",
    params(
        ("id" = i32, Path, description = "Customer ID")
    ),
    request_body = UpdateCustomerRequest,
    responses(
        (status = 200, description = "Updated customer", body = ApiResponse<Customer>),
        (status = 400, description = "Validation failed"),
        (status = 404, description = "Customer not found or id mismatch"),
    ),
    tag = "Customers"
)]
pub async fn update_customer(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateCustomerRequest>,
) -> AppResult<Json<ApiResponse<Customer>>> {
    let resp = customer_service::update_customer(&state, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/customers/{id}",
    params(
        ("id" = i32, Path, description = "Customer ID")
    ),
    responses(
        (status = 200, description = "Deleted customer"),
        (status = 404, description = "Customer not found"),
    ),
    tag = "Customers"
)]
pub async fn delete_customer(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = customer_service::delete_customer(&state, id).await?;
    Ok(Json(resp))
}
