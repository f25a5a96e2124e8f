use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryOrder, QuerySelect};

use crate::{
    dto::dashboard::DashboardSummary,
    entity::{
        books::{Column as BookCol, Entity as Books},
        categories::Entity as Categories,
        customers::Entity as Customers,
        orders::{Column as OrderCol, Entity as Orders},
    },
    error::AppResult,
    models::{Book, Order},
    response::ApiResponse,
    state::AppState,
};

pub async fn summary(state: &AppState) -> AppResult<ApiResponse<DashboardSummary>> {
    let total_books = Books::find().count(&state.orm).await? as i64;
    let total_categories = Categories::find().count(&state.orm).await? as i64;
    let total_customers = Customers::find().count(&state.orm).await? as i64;
    let total_orders = Orders::find().count(&state.orm).await? as i64;

    // SUM over zero rows is NULL.
    let total_revenue = Orders::find()
        .select_only()
        .column_as(OrderCol::TotalAmount.sum(), "revenue")
        .into_tuple::<Option<Decimal>>()
        .one(&state.orm)
        .await?
        .flatten()
        .unwrap_or(Decimal::ZERO);

    let recent_orders = Orders::find()
        .order_by_desc(OrderCol::OrderDate)
        .limit(5)
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

    let recent_books = Books::find()
        .order_by_desc(BookCol::PublishedDate)
        .limit(5)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|b| Book {
            id: b.id,
            title: b.title,
            author: b.author,
            published_date: b.published_date,
            isbn: b.isbn,
            category_id: b.category_id,
            price: b.price,
            cover_image_url: b.cover_image_url,
            description: b.description,
            created_at: b.created_at.with_timezone(&Utc),
        })
        .collect();

    let data = DashboardSummary {
        total_books,
        total_categories,
        total_customers,
        total_orders,
        total_revenue,
        recent_orders,
        recent_books,
    };

    Ok(ApiResponse::success("Dashboard", data, None))
}
