use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};

use crate::{
    audit::log_audit,
    dto::categories::{CategoryList, CreateCategoryRequest, UpdateCategoryRequest},
    entity::{
        books::{Column as BookCol, Entity as Books},
        categories::{ActiveModel, Column, Entity as Categories, Model as CategoryModel},
    },
    error::{AppError, AppResult},
    models::Category,
    response::{ApiResponse, Meta},
    state::AppState,
};

pub async fn list_categories(state: &AppState) -> AppResult<ApiResponse<CategoryList>> {
    let items = Categories::find()
        .order_by_asc(Column::Name)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(category_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Categories",
        CategoryList { items },
        None,
    ))
}

pub async fn get_category(state: &AppState, id: i32) -> AppResult<ApiResponse<Category>> {
    let result = Categories::find_by_id(id)
        .one(&state.orm)
        .await?
        .map(category_from_entity);
    let result = match result {
        Some(c) => c,
        None => return Err(AppError::NotFound),
    };
    Ok(ApiResponse::success("Category", result, None))
}

pub async fn create_category(
    state: &AppState,
    payload: CreateCategoryRequest,
) -> AppResult<ApiResponse<Category>> {
    validate_name(&payload.name)?;

    let active = ActiveModel {
        id: NotSet,
        name: Set(payload.name),
        created_at: NotSet,
    };
    let category = active.insert(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        "category_create",
        Some("categories"),
        Some(serde_json::json!({ "category_id": category.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Category created",
        category_from_entity(category),
        Some(Meta::empty()),
    ))
}

pub async fn update_category(
    state: &AppState,
    id: i32,
    payload: UpdateCategoryRequest,
) -> AppResult<ApiResponse<Category>> {
    if id != payload.category_id {
        return Err(AppError::NotFound);
    }
    validate_name(&payload.name)?;

    let existing = Categories::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(c) => c,
        None => return Err(AppError::NotFound),
    };

    let mut active: ActiveModel = existing.into();
    active.name = Set(payload.name);
    let category = active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        "category_update",
        Some("categories"),
        Some(serde_json::json!({ "category_id": category.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Updated",
        category_from_entity(category),
        Some(Meta::empty()),
    ))
}

/// Deletion is blocked while books still reference the category.
pub async fn delete_category(
    state: &AppState,
    id: i32,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let in_use = Books::find()
        .filter(BookCol::CategoryId.eq(id))
        .count(&state.orm)
        .await?;
    if in_use > 0 {
        return Err(AppError::Validation(
            "category still has books assigned".into(),
        ));
    }

    let result = Categories::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    if let Err(err) = log_audit(
        &state.pool,
        "category_delete",
        Some("categories"),
        Some(serde_json::json!({ "category_id": id })),
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

fn validate_name(name: &str) -> AppResult<()> {
    if name.is_empty() || name.len() > 100 {
        return Err(AppError::Validation(
            "name is required and must not exceed 100 characters".into(),
        ));
    }
    Ok(())
}

fn category_from_entity(model: CategoryModel) -> Category {
    Category {
        id: model.id,
        name: model.name,
    }
}
