use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};

use crate::{
    audit::log_audit,
    dto::orders::{CreateOrderRequest, OrderItemInput, OrderList, OrderWithItems, UpdateOrderRequest},
    entity::{
        customers::Entity as Customers,
        order_items::{
            ActiveModel as OrderItemActive, Column as OrderItemCol, Entity as OrderItems,
            Model as OrderItemModel,
        },
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, Model as OrderModel},
    },
    error::{AppError, AppResult},
    models::{Order, OrderItem},
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    state::AppState,
};

/// Parse the serialized line-item payload. An absent or blank payload is an
/// empty order; anything unparseable is a recoverable validation failure.
pub fn parse_order_items(items_json: Option<&str>) -> AppResult<Vec<OrderItemInput>> {
    let raw = match items_json {
        Some(s) if !s.trim().is_empty() => s,
        _ => return Ok(Vec::new()),
    };
    serde_json::from_str::<Vec<OrderItemInput>>(raw)
        .map_err(|_| AppError::Validation("invalid order items".into()))
}

pub fn validate_items(items: &[OrderItemInput]) -> AppResult<()> {
    for item in items {
        if item.product_name.is_empty() || item.product_name.len() > 200 {
            return Err(AppError::Validation(
                "product name is required and must not exceed 200 characters".into(),
            ));
        }
        if item.quantity < 1 {
            return Err(AppError::Validation("quantity must be at least 1".into()));
        }
        if item.unit_price <= Decimal::ZERO {
            return Err(AppError::Validation(
                "unit price must be greater than 0".into(),
            ));
        }
    }
    Ok(())
}

/// Sum of line-item subtotals; an itemless order totals 0.
pub fn order_total(items: &[OrderItemInput]) -> Decimal {
    items.iter().map(OrderItemInput::subtotal).sum()
}

pub async fn list_orders(
    state: &AppState,
    pagination: Pagination,
) -> AppResult<ApiResponse<OrderList>> {
    let (page, limit, offset) = pagination.normalize();

    let finder = Orders::find().order_by_desc(OrderCol::OrderDate);

    let total = finder.clone().count(&state.orm).await? as i64;

    let orders = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(order_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Orders",
        OrderList { items: orders },
        Some(meta),
    ))
}

pub async fn get_order(state: &AppState, id: i32) -> AppResult<ApiResponse<OrderWithItems>> {
    let order = Orders::find_by_id(id).one(&state.orm).await?;
    let order = match order {
        Some(o) => o,
        None => return Err(AppError::NotFound),
    };

    let items = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order.id))
        .order_by_asc(OrderItemCol::Id)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(order_item_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Order",
        OrderWithItems {
            order: order_from_entity(order),
            items,
        },
        Some(Meta::empty()),
    ))
}

pub async fn create_order(
    state: &AppState,
    payload: CreateOrderRequest,
) -> AppResult<ApiResponse<OrderWithItems>> {
    if payload.customer_id <= 0 {
        return Err(AppError::Validation("customer is required".into()));
    }

    let inputs = parse_order_items(payload.items_json.as_deref())?;
    validate_items(&inputs)?;

    let customer = Customers::find_by_id(payload.customer_id)
        .one(&state.orm)
        .await?;
    if customer.is_none() {
        return Err(AppError::NotFound);
    }

    let order_date = payload.order_date.unwrap_or_else(Utc::now);
    let total_amount = order_total(&inputs);

    let txn = state.orm.begin().await?;

    // Items carry the generated order id, so the parent row goes first.
    let order = OrderActive {
        id: NotSet,
        customer_id: Set(payload.customer_id),
        order_date: Set(order_date.into()),
        total_amount: Set(total_amount),
        created_at: NotSet,
    }
    .insert(&txn)
    .await?;

    let mut items: Vec<OrderItem> = Vec::new();
    for input in &inputs {
        let item = OrderItemActive {
            id: NotSet,
            order_id: Set(order.id),
            product_name: Set(input.product_name.clone()),
            quantity: Set(input.quantity),
            unit_price: Set(input.unit_price),
        }
        .insert(&txn)
        .await?;
        items.push(order_item_from_entity(item));
    }

    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        "order_create",
        Some("orders"),
        Some(serde_json::json!({ "order_id": order.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Order created",
        OrderWithItems {
            order: order_from_entity(order),
            items,
        },
        Some(Meta::empty()),
    ))
}

/// Edit replaces the entire item set: existing items are deleted and the
/// payload's items inserted fresh, then the stored total is recomputed.
pub async fn update_order(
    state: &AppState,
    id: i32,
    payload: UpdateOrderRequest,
) -> AppResult<ApiResponse<OrderWithItems>> {
    if id != payload.order_id {
        return Err(AppError::NotFound);
    }

    let inputs = parse_order_items(payload.items_json.as_deref())?;
    validate_items(&inputs)?;

    let existing = Orders::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(o) => o,
        None => return Err(AppError::NotFound),
    };

    let order_date = payload
        .order_date
        .unwrap_or_else(|| existing.order_date.with_timezone(&Utc));
    let total_amount = order_total(&inputs);

    let txn = state.orm.begin().await?;

    OrderItems::delete_many()
        .filter(OrderItemCol::OrderId.eq(id))
        .exec(&txn)
        .await?;

    let mut items: Vec<OrderItem> = Vec::new();
    for input in &inputs {
        let item = OrderItemActive {
            id: NotSet,
            order_id: Set(id),
            product_name: Set(input.product_name.clone()),
            quantity: Set(input.quantity),
            unit_price: Set(input.unit_price),
        }
        .insert(&txn)
        .await?;
        items.push(order_item_from_entity(item));
    }

    let mut active: OrderActive = existing.into();
    active.customer_id = Set(payload.customer_id);
    active.order_date = Set(order_date.into());
    active.total_amount = Set(total_amount);
    let order = active.update(&txn).await?;

    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        "order_update",
        Some("orders"),
        Some(serde_json::json!({ "order_id": order.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Updated",
        OrderWithItems {
            order: order_from_entity(order),
            items,
        },
        Some(Meta::empty()),
    ))
}

pub async fn delete_order(state: &AppState, id: i32) -> AppResult<ApiResponse<serde_json::Value>> {
    let order = Orders::find_by_id(id).one(&state.orm).await?;
    let order = match order {
        Some(o) => o,
        // Already gone; deletion is idempotent.
        None => {
            return Ok(ApiResponse::success(
                "Deleted",
                serde_json::json!({}),
                Some(Meta::empty()),
            ));
        }
    };

    let txn = state.orm.begin().await?;

    // Children first to satisfy the foreign key.
    OrderItems::delete_many()
        .filter(OrderItemCol::OrderId.eq(order.id))
        .exec(&txn)
        .await?;
    Orders::delete_by_id(order.id).exec(&txn).await?;

    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        "order_delete",
        Some("orders"),
        Some(serde_json::json!({ "order_id": id })),
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

fn order_from_entity(model: OrderModel) -> Order {
    Order {
        id: model.id,
        customer_id: model.customer_id,
        order_date: model.order_date.with_timezone(&Utc),
        total_amount: model.total_amount,
    }
}

fn order_item_from_entity(model: OrderItemModel) -> OrderItem {
    let subtotal = Decimal::from(model.quantity) * model.unit_price;
    OrderItem {
        id: model.id,
        order_id: model.order_id,
        product_name: model.product_name,
        quantity: model.quantity,
        unit_price: model.unit_price,
        subtotal,
    }
}
