//! Product routes: create, list, partial update, and the sale batch.

use axum::extract::{Extension, Path, Query};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use stockpos_core::validation::{
    validate_name, validate_price_cents, validate_sale_batch, validate_sku, validate_stock_level,
};
use stockpos_core::{
    GenderType, NewProduct, Page, PageOptions, Product, ProductChanges, ProductFilter,
    ProductListing, SaleLine, SortOrder, DEFAULT_PAGE_LIMIT,
};
use stockpos_db::Database;

use crate::error::{ApiError, ApiResult};

// =============================================================================
// Wire DTOs
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    /// Business product code; maps to the domain sku.
    pub product_id: i64,
    pub product_name: String,
    pub category_id: String,
    #[serde(default)]
    pub gender_type: GenderType,
    /// List price in cents.
    pub price: i64,
    pub quantity: i64,
    /// Purchase cost in cents.
    pub actual_price: i64,
    /// Discounted price in cents.
    pub sale_price: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    pub id: String,
    pub product_id: i64,
    pub product_name: String,
    pub category_id: String,
    pub gender_type: GenderType,
    pub price: i64,
    pub quantity: i64,
    pub actual_price: i64,
    pub sale_price: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Product> for ProductResponse {
    fn from(p: Product) -> Self {
        ProductResponse {
            id: p.id,
            product_id: p.sku,
            product_name: p.product_name,
            category_id: p.category_id,
            gender_type: p.gender_type,
            price: p.price_cents,
            quantity: p.quantity,
            actual_price: p.actual_price_cents,
            sale_price: p.sale_price_cents,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListedProductResponse {
    #[serde(flatten)]
    pub product: ProductResponse,
    pub category: CategoryRefResponse,
    pub sales_count: i64,
}

#[derive(Debug, Serialize)]
pub struct CategoryRefResponse {
    pub id: String,
    pub name: String,
}

impl From<ProductListing> for ListedProductResponse {
    fn from(listing: ProductListing) -> Self {
        ListedProductResponse {
            product: listing.product.into(),
            category: CategoryRefResponse {
                id: listing.category.id,
                name: listing.category.name,
            },
            sales_count: listing.sales_count,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPageResponse {
    pub products: Vec<ListedProductResponse>,
    pub total_pages: i64,
    pub current_page: i64,
    pub next_page: Option<i64>,
    pub total_items: i64,
}

impl From<Page<ProductListing>> for ProductPageResponse {
    fn from(page: Page<ProductListing>) -> Self {
        ProductPageResponse {
            products: page.items.into_iter().map(Into::into).collect(),
            total_pages: page.total_pages,
            current_page: page.current_page,
            next_page: page.next_page,
            total_items: page.total_items,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListProductsQuery {
    pub limit: Option<i64>,
    pub page: Option<i64>,
    pub sort_by: Option<String>,
    pub sort_type: Option<String>,
    pub product_name: Option<String>,
    pub gender_type: Option<GenderType>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    pub product_name: Option<String>,
    pub gender_type: Option<GenderType>,
    pub price: Option<i64>,
    pub quantity: Option<i64>,
    pub actual_price: Option<i64>,
    pub sale_price: Option<i64>,
}

/// One line of the sale batch; the request body is a JSON array of these.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleLineRequest {
    pub product_id: i64,
    pub quantity: i64,
    /// Amount charged for the whole line, in cents.
    pub total_price: i64,
}

// =============================================================================
// Query Parsing Helpers
// =============================================================================

/// Wire sort keys for products, mapped to storage columns.
fn product_sort_column(wire: &str) -> Option<&'static str> {
    match wire {
        "productId" => Some("sku"),
        "productName" => Some("product_name"),
        "price" => Some("price_cents"),
        "quantity" => Some("quantity"),
        "createdAt" => Some("created_at"),
        "updatedAt" => Some("updated_at"),
        _ => None,
    }
}

pub(crate) fn parse_sort_type(sort_type: Option<&str>) -> ApiResult<SortOrder> {
    match sort_type {
        None => Ok(SortOrder::Desc),
        Some("asc") => Ok(SortOrder::Asc),
        Some("desc") => Ok(SortOrder::Desc),
        Some(other) => Err(ApiError::validation(format!(
            "sortType must be 'asc' or 'desc', got '{other}'"
        ))),
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// POST /products
pub async fn create_product(
    Extension(db): Extension<Database>,
    Json(body): Json<CreateProductRequest>,
) -> ApiResult<(StatusCode, Json<ProductResponse>)> {
    validate_sku(body.product_id)?;
    validate_name("productName", &body.product_name)?;
    validate_price_cents("price", body.price)?;
    validate_price_cents("actualPrice", body.actual_price)?;
    validate_price_cents("salePrice", body.sale_price)?;
    validate_stock_level(body.quantity)?;

    let product = db
        .products()
        .create(NewProduct {
            sku: body.product_id,
            product_name: body.product_name.trim().to_string(),
            category_id: body.category_id,
            gender_type: body.gender_type,
            price_cents: body.price,
            quantity: body.quantity,
            actual_price_cents: body.actual_price,
            sale_price_cents: body.sale_price,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(product.into())))
}

/// GET /products
pub async fn list_products(
    Extension(db): Extension<Database>,
    Query(query): Query<ListProductsQuery>,
) -> ApiResult<Json<ProductPageResponse>> {
    let sort_by = match query.sort_by.as_deref() {
        None => None,
        Some(wire) => Some(
            product_sort_column(wire)
                .ok_or_else(|| {
                    ApiError::validation(format!(
                        "sortBy must be one of productId, productName, price, quantity, \
                         createdAt, updatedAt; got '{wire}'"
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
    let filter = ProductFilter {
        product_name: query.product_name,
        gender_type: query.gender_type,
    };

    let page = db.products().list(filter, options).await?;
    Ok(Json(page.into()))
}

/// PATCH /products/update/:productId
pub async fn update_product(
    Extension(db): Extension<Database>,
    Path(product_id): Path<i64>,
    Json(body): Json<UpdateProductRequest>,
) -> ApiResult<Json<ProductResponse>> {
    validate_sku(product_id)?;

    if let Some(ref name) = body.product_name {
        validate_name("productName", name)?;
    }
    if let Some(price) = body.price {
        validate_price_cents("price", price)?;
    }
    if let Some(actual) = body.actual_price {
        validate_price_cents("actualPrice", actual)?;
    }
    if let Some(sale) = body.sale_price {
        validate_price_cents("salePrice", sale)?;
    }
    if let Some(quantity) = body.quantity {
        validate_stock_level(quantity)?;
    }

    let changes = ProductChanges {
        product_name: body.product_name.map(|n| n.trim().to_string()),
        gender_type: body.gender_type,
        price_cents: body.price,
        quantity: body.quantity,
        actual_price_cents: body.actual_price,
        sale_price_cents: body.sale_price,
    };

    if changes.is_empty() {
        return Err(ApiError::validation("at least one field must be provided"));
    }

    let product = db.products().update(product_id, changes).await?;
    Ok(Json(product.into()))
}

/// POST /products/sell-products
///
/// Body is a JSON array of sale lines. The whole batch succeeds or fails;
/// only the first failing line is reported.
pub async fn sell_products(
    Extension(db): Extension<Database>,
    Json(body): Json<Vec<SaleLineRequest>>,
) -> ApiResult<(StatusCode, Json<serde_json::Value>)> {
    let lines: Vec<SaleLine> = body
        .into_iter()
        .map(|line| SaleLine {
            sku: line.product_id,
            quantity: line.quantity,
            total_price_cents: line.total_price,
        })
        .collect();

    validate_sale_batch(&lines)?;

    debug!(lines = lines.len(), "Sale batch received");
    let sold = db.sales().sell_batch(&lines).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": format!("Sold {} product line(s)", sold.len()),
        })),
    ))
}
