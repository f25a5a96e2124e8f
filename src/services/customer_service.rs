use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

use crate::{
    audit::log_audit,
    dto::customers::{CreateCustomerRequest, CustomerList, CustomerWithOrders, UpdateCustomerRequest},
    entity::{
        customers::{ActiveModel, Column, Entity as Customers, Model as CustomerModel},
        orders::{Column as OrderCol, Entity as Orders},
    },
    error::{AppError, AppResult},
    models::{Customer, Order},
    response::{ApiResponse, Meta},
    state::AppState,
};

pub async fn list_customers(state: &AppState) -> AppResult<ApiResponse<CustomerList>> {
    let items = Customers::find()
        .order_by_asc(Column::Name)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(customer_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Customers",
        CustomerList { items },
        None,
    ))
}

pub async fn get_customer(state: &AppState, id: i32) -> AppResult<ApiResponse<CustomerWithOrders>> {
    let customer = Customers::find_by_id(id).one(&state.orm).await?;
    let customer = match customer {
        Some(c) => c,
        None => return Err(AppError::NotFound),
    };

    let orders = Orders::find()
        .filter(OrderCol::CustomerId.eq(customer.id))
        .order_by_desc(OrderCol::OrderDate)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|o| Order {
            id: o.id,
            customer_id: o.customer_id,
            order_date: o.order_date.with_timezone(&Utc),
            total_amount: o.total_amount,
        })
        .collect();

    Ok(ApiResponse::success(
        "Customer",
        CustomerWithOrders {
            customer: customer_from_entity(customer),
            orders,
        },
        None,
    ))
}

pub async fn create_customer(
    state: &AppState,
    payload: CreateCustomerRequest,
) -> AppResult<ApiResponse<Customer>> {
    validate_customer_fields(&payload.name, &payload.email, &payload.phone)?;

    let active = ActiveModel {
        id: NotSet,
        name: Set(payload.name),
        email: Set(payload.email),
        phone: Set(payload.phone),
        created_at: NotSet,
    };
    let customer = active.insert(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        "customer_create",
        Some("customers"),
        Some(serde_json::json!({ "customer_id": customer.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Customer created",
        customer_from_entity(customer),
        Some(Meta::empty()),
    ))
}

pub async fn update_customer(
    state: &AppState,
    id: i32,
    payload: UpdateCustomerRequest,
) -> AppResult<ApiResponse<Customer>> {
    if id != payload.customer_id {
        return Err(AppError::NotFound);
    }
    validate_customer_fields(&payload.name, &payload.email, &payload.phone)?;

    let existing = Customers::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(c) => c,
        None => return Err(AppError::NotFound),
    };

    let mut active: ActiveModel = existing.into();
    active.name = Set(payload.name);
    active.email = Set(payload.email);
    active.phone = Set(payload.phone);
    let customer = active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        "customer_update",
        Some("customers"),
        Some(serde_json::json!({ "customer_id": customer.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Updated",
        customer_from_entity(customer),
        Some(Meta::empty()),
    ))
}

pub async fn delete_customer(
    state: &AppState,
    id: i32,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let result = Customers::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    if let Err(err) = log_audit(
        &state.pool,
        "customer_delete",
        Some("customers"),
        Some(serde_json::json!({ "customer_id": id })),
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

fn validate_customer_fields(name: &str, email: &str, phone: &str) -> AppResult<()> {
    if name.is_empty() || name.len() > 100 {
        return Err(AppError::Validation(
            "name is required and must not exceed 100 characters".into(),
        ));
    }
    if email.is_empty() || email.len() > 100 || !is_valid_email(email) {
        return Err(AppError::Validation("email address is invalid".into()));
    }
    if phone.is_empty() || phone.len() > 20 {
        return Err(AppError::Validation(
            "phone is required and must not exceed 20 characters".into(),
        ));
    }
    Ok(())
}

fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return false;
    }
    domain.contains('.') && domain.split('.').all(|part| !part.is_empty())
}

fn customer_from_entity(model: CustomerModel) -> Customer {
    Customer {
        id: model.id,
        name: model.name,
        email: model.email,
        phone: model.phone,
    }
}
