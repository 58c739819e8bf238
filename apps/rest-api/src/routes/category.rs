//! Category routes: create and list.

use axum::extract::{Extension, Query};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockpos_core::{CategoryFilter, Page, PageOptions, ProductCategory, DEFAULT_PAGE_LIMIT};
use stockpos_db::Database;

use crate::error::{ApiError, ApiResult};
use crate::routes::products::parse_sort_type;

// =============================================================================
// Wire DTOs
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryResponse {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ProductCategory> for CategoryResponse {
    fn from(c: ProductCategory) -> Self {
        CategoryResponse {
            id: c.id,
            name: c.name,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryPageResponse {
    pub categories: Vec<CategoryResponse>,
    pub total_pages: i64,
    pub current_page: i64,
    pub next_page: Option<i64>,
    pub total_items: i64,
}

impl From<Page<ProductCategory>> for CategoryPageResponse {
    fn from(page: Page<ProductCategory>) -> Self {
        CategoryPageResponse {
            categories: page.items.into_iter().map(Into::into).collect(),
            total_pages: page.total_pages,
            current_page: page.current_page,
            next_page: page.next_page,
            total_items: page.total_items,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListCategoriesQuery {
    pub name: Option<String>,
    pub limit: Option<i64>,
    pub page: Option<i64>,
    pub sort_by: Option<String>,
    pub sort_type: Option<String>,
}

/// Wire sort keys for categories, mapped to storage columns.
fn category_sort_column(wire: &str) -> Option<&'static str> {
    match wire {
        "name" => Some("name"),
        "createdAt" => Some("created_at"),
        "updatedAt" => Some("updated_at"),
        _ => None,
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// POST /products/category
pub async fn create_category(
    Extension(db): Extension<Database>,
    Json(body): Json<CreateCategoryRequest>,
) -> ApiResult<(StatusCode, Json<CategoryResponse>)> {
    let category = db.categories().create(&body.name).await?;
    Ok((StatusCode::CREATED, Json(category.into())))
}

/// GET /products/category
pub async fn list_categories(
    Extension(db): Extension<Database>,
    Query(query): Query<ListCategoriesQuery>,
) -> ApiResult<Json<CategoryPageResponse>> {
    let sort_by = match query.sort_by.as_deref() {
        None => None,
        Some(wire) => Some(
            category_sort_column(wire)
                .ok_or_else(|| {
                    ApiError::validation(format!(
                        "sortBy must be one of name, createdAt, updatedAt; got '{wire}'"
                    ))
                })?
                .to_string(),
        ),
    };

    let options = PageOptions {
        limit: query.limit.unwrap_or(DEFAULT_PAGE_LIMIT),
        page: query.page.unwrap_or(1),
        sort_by,
        sort_order: parse_sort_type(query.sort_type.as_deref())?,
    };
    let filter = CategoryFilter { name: query.name };

    let page = db.categories().list(filter, options).await?;
    Ok(Json(page.into()))
}
