use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::catalog_service::CatalogService;
use crate::application::Pagination;
use crate::domain::catalog::{ProductChanges, ProductInput, ProductView};
use crate::domain::errors::DomainError;
use crate::domain::money::{format_money, parse_amount};
use crate::errors::AppError;

use super::product_images::ProductImageResponse;
use super::{run_blocking, PageParams};

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct ProductRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Decimal price as a string to avoid floating-point issues, e.g. "9.99"
    pub unit_price: String,
    pub inventory: i32,
    pub collection_id: Uuid,
}

impl ProductRequest {
    fn into_input(self) -> Result<ProductInput, DomainError> {
        Ok(ProductInput {
            unit_price: parse_amount("unit_price", &self.unit_price)?,
            title: self.title,
            description: self.description,
            inventory: self.inventory,
            collection_id: self.collection_id,
        })
    }
}

/// PATCH body; absent fields are left unchanged.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ProductPatchRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub unit_price: Option<String>,
    pub inventory: Option<i32>,
    pub collection_id: Option<Uuid>,
}

impl ProductPatchRequest {
    fn into_changes(self) -> Result<ProductChanges, DomainError> {
        Ok(ProductChanges {
            unit_price: self
                .unit_price
                .map(|raw| parse_amount("unit_price", &raw))
                .transpose()?,
            title: self.title,
            description: self.description,
            inventory: self.inventory,
            collection_id: self.collection_id,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductResponse {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub unit_price: String,
    pub inventory: i32,
    pub collection_id: Uuid,
    /// Title of the owning collection.
    pub collection: String,
    pub images: Vec<ProductImageResponse>,
    pub created_at: DateTime<Utc>,
}

impl From<ProductView> for ProductResponse {
    fn from(view: ProductView) -> Self {
        ProductResponse {
            id: view.id,
            title: view.title,
            description: view.description,
            unit_price: format_money(&view.unit_price),
            inventory: view.inventory,
            collection_id: view.collection_id,
            collection: view.collection_title,
            images: view.images.into_iter().map(Into::into).collect(),
            created_at: view.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ListProductsResponse {
    pub items: Vec<ProductResponse>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /products
///
/// Newest first. Use `page` (1-based) and `limit` to control pagination.
#[utoipa::path(
    get,
    path = "/products",
    params(PageParams),
    responses(
        (status = 200, description = "Paginated list of products", body = ListProductsResponse),
    ),
    tag = "catalog"
)]
pub async fn list_products(
    svc: web::Data<CatalogService>,
    query: web::Query<PageParams>,
) -> Result<HttpResponse, AppError> {
    let pagination = Pagination::from(query.into_inner());
    let page = run_blocking(move || svc.list_products(pagination)).await?;
    Ok(HttpResponse::Ok().json(ListProductsResponse {
        items: page.items.into_iter().map(Into::into).collect(),
        total: page.total,
        page: pagination.page,
        limit: pagination.limit,
    }))
}

/// POST /products
#[utoipa::path(
    post,
    path = "/products",
    request_body = ProductRequest,
    responses(
        (status = 201, description = "Product created", body = ProductResponse),
        (status = 400, description = "Validation failed or unknown collection"),
    ),
    tag = "catalog"
)]
pub async fn create_product(
    svc: web::Data<CatalogService>,
    body: web::Json<ProductRequest>,
) -> Result<HttpResponse, AppError> {
    let input = body.into_inner().into_input()?;
    let product = run_blocking(move || svc.create_product(input)).await?;
    Ok(HttpResponse::Created().json(ProductResponse::from(product)))
}

/// GET /products/{id}
#[utoipa::path(
    get,
    path = "/products/{id}",
    params(("id" = Uuid, Path, description = "Product UUID")),
    responses(
        (status = 200, description = "Product found", body = ProductResponse),
        (status = 404, description = "Product not found"),
    ),
    tag = "catalog"
)]
pub async fn get_product(
    svc: web::Data<CatalogService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let product = run_blocking(move || svc.get_product(id)).await?;
    Ok(HttpResponse::Ok().json(ProductResponse::from(product)))
}

/// PUT /products/{id}
#[utoipa::path(
    put,
    path = "/products/{id}",
    params(("id" = Uuid, Path, description = "Product UUID")),
    request_body = ProductRequest,
    responses(
        (status = 200, description = "Product replaced", body = ProductResponse),
        (status = 400, description = "Validation failed"),
        (status = 404, description = "Product not found"),
    ),
    tag = "catalog"
)]
pub async fn replace_product(
    svc: web::Data<CatalogService>,
    path: web::Path<Uuid>,
    body: web::Json<ProductRequest>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let input = body.into_inner().into_input()?;
    let product = run_blocking(move || svc.replace_product(id, input)).await?;
    Ok(HttpResponse::Ok().json(ProductResponse::from(product)))
}

/// PATCH /products/{id}
#[utoipa::path(
    patch,
    path = "/products/{id}",
    params(("id" = Uuid, Path, description = "Product UUID")),
    request_body = ProductPatchRequest,
    responses(
        (status = 200, description = "Product updated", body = ProductResponse),
        (status = 400, description = "Validation failed"),
        (status = 404, description = "Product not found"),
    ),
    tag = "catalog"
)]
pub async fn patch_product(
    svc: web::Data<CatalogService>,
    path: web::Path<Uuid>,
    body: web::Json<ProductPatchRequest>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let changes = body.into_inner().into_changes()?;
    let product = run_blocking(move || svc.patch_product(id, changes)).await?;
    Ok(HttpResponse::Ok().json(ProductResponse::from(product)))
}

/// DELETE /products/{id}
///
/// Products that appear on any order cannot be deleted.
#[utoipa::path(
    delete,
    path = "/products/{id}",
    params(("id" = Uuid, Path, description = "Product UUID")),
    responses(
        (status = 204, description = "Product deleted"),
        (status = 404, description = "Product not found"),
        (status = 409, description = "Product is referenced by an order"),
    ),
    tag = "catalog"
)]
pub async fn delete_product(
    svc: web::Data<CatalogService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    run_blocking(move || svc.delete_product(id)).await?;
    Ok(HttpResponse::NoContent().finish())
}
