use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::products::{CreateProductRequest, UpdateProductRequest},
    entity::products::{ActiveModel, Column, Entity as Products, Model},
    error::{AppError, AppResult},
    models::Product,
    response::{ApiResponse, Meta},
    routes::params::{ProductQuery, ProductSortBy, SortOrder},
    services::timestamp,
    state::AppState,
};

pub async fn list_products(
    state: &AppState,
    query: ProductQuery,
) -> AppResult<ApiResponse<Vec<Product>>> {
    let conn = state.conn();
    let pagination = query.pagination();
    let (_, limit, offset) = pagination.normalize();
    let mut condition = Condition::all();

    if let Some(search) = query.q.as_ref().filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search);
        condition = condition.add(
            Condition::any()
                .add(Expr::col(Column::Name).ilike(pattern.clone()))
                .add(Expr::col(Column::Description).ilike(pattern)),
        );
    }

    if let Some(category_id) = query.category_id {
        condition = condition.add(Column::CategoryId.eq(category_id));
    }

    if let Some(min_price) = query.min_price {
        condition = condition.add(Column::Price.gte(min_price));
    }

    if let Some(max_price) = query.max_price {
        condition = condition.add(Column::Price.lte(max_price));
    }

    let sort_col = match query.sort_by.unwrap_or(ProductSortBy::CreatedAt) {
        ProductSortBy::CreatedAt => Column::CreatedAt,
        ProductSortBy::Price => Column::Price,
        ProductSortBy::Name => Column::Name,
    };

    let mut finder = Products::find().filter(condition);
    finder = match query.sort_order.unwrap_or(SortOrder::Desc) {
        SortOrder::Asc => finder.order_by_asc(sort_col),
        SortOrder::Desc => finder.order_by_desc(sort_col),
    };

    let total = finder.clone().count(&*conn).await?;

    let items = finder
        .limit(limit as u64)
        .offset(offset)
        .all(&*conn)
        .await?
        .into_iter()
        .map(Product::from)
        .collect();

    Ok(ApiResponse::success(
        "Products",
        items,
        Some(Meta::paged(&pagination, total)),
    ))
}

pub async fn get_product(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Product>> {
    let product = Products::find_by_id(id)
        .one(&*state.conn())
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success("Product", product.into(), None))
}

pub async fn create_product(
    state: &AppState,
    payload: CreateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    let now = timestamp();
    let candidate = Model {
        id: Uuid::new_v4(),
        name: payload.name,
        description: payload.description,
        price: payload.price,
        discount: payload.discount,
        stock: payload.stock,
        category_id: payload.category_id,
        created_at: now,
        updated_at: now,
    };
    candidate.validate()?;

    let product = ActiveModel::from(candidate)
        .reset_all()
        .insert(&*state.conn())
        .await?;
    tracing::info!(product_id = %product.id, "product created");

    Ok(ApiResponse::ok("Product created", product.into()))
}

pub async fn update_product(
    state: &AppState,
    id: Uuid,
    payload: UpdateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    let conn = state.conn();
    let mut candidate = Products::find_by_id(id)
        .one(&*conn)
        .await?
        .ok_or(AppError::NotFound)?;

    if let Some(name) = payload.name {
        candidate.name = name;
    }
    if let Some(description) = payload.description {
        candidate.description = Some(description);
    }
    if let Some(price) = payload.price {
        candidate.price = price;
    }
    if let Some(discount) = payload.discount {
        candidate.discount = discount;
    }
    if let Some(stock) = payload.stock {
        candidate.stock = stock;
    }
    if let Some(category_id) = payload.category_id {
        candidate.category_id = Some(category_id);
    }
    candidate.updated_at = timestamp();
    candidate.validate()?;

    let product = ActiveModel::from(candidate).reset_all().update(&*conn).await?;
    tracing::info!(product_id = %product.id, "product updated");

    Ok(ApiResponse::ok("Updated", product.into()))
}

pub async fn delete_product(
    state: &AppState,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let result = Products::delete_by_id(id).exec(&*state.conn()).await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }
    tracing::info!(product_id = %id, "product deleted");

    Ok(ApiResponse::ok("Deleted", serde_json::json!({ "id": id })))
}
