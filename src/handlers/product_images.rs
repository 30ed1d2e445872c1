use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::catalog_service::CatalogService;
use crate::domain::catalog::ProductImageView;
use crate::errors::AppError;

use super::run_blocking;

#[derive(Debug, Deserialize, ToSchema)]
pub struct ProductImageRequest {
    /// Path or URL of the stored image.
    pub image: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductImageResponse {
    pub id: Uuid,
    pub image: String,
}

impl From<ProductImageView> for ProductImageResponse {
    fn from(view: ProductImageView) -> Self {
        ProductImageResponse {
            id: view.id,
            image: view.image,
        }
    }
}

#[utoipa::path(
    get,
    path = "/products/{product_id}/images",
    params(("product_id" = Uuid, Path, description = "Product UUID")),
    responses(
        (status = 200, description = "Images of the product", body = [ProductImageResponse]),
        (status = 404, description = "Product not found"),
    ),
    tag = "catalog"
)]
pub async fn list_images(
    svc: web::Data<CatalogService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let product_id = path.into_inner();
    let images = run_blocking(move || svc.list_images(product_id)).await?;
    let body: Vec<ProductImageResponse> = images.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(body))
}

#[utoipa::path(
    post,
    path = "/products/{product_id}/images",
    params(("product_id" = Uuid, Path, description = "Product UUID")),
    request_body = ProductImageRequest,
    responses(
        (status = 201, description = "Image attached", body = ProductImageResponse),
        (status = 400, description = "Empty image path"),
        (status = 404, description = "Product not found"),
    ),
    tag = "catalog"
)]
pub async fn add_image(
    svc: web::Data<CatalogService>,
    path: web::Path<Uuid>,
    body: web::Json<ProductImageRequest>,
) -> Result<HttpResponse, AppError> {
    let product_id = path.into_inner();
    let body = body.into_inner();
    let image = run_blocking(move || svc.add_image(product_id, &body.image)).await?;
    Ok(HttpResponse::Created().json(ProductImageResponse::from(image)))
}

#[utoipa::path(
    get,
    path = "/products/{product_id}/images/{id}",
    params(
        ("product_id" = Uuid, Path, description = "Product UUID"),
        ("id" = Uuid, Path, description = "Image UUID"),
    ),
    responses(
        (status = 200, description = "Image found", body = ProductImageResponse),
        (status = 404, description = "Product or image not found"),
    ),
    tag = "catalog"
)]
pub async fn get_image(
    svc: web::Data<CatalogService>,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<HttpResponse, AppError> {
    let (product_id, image_id) = path.into_inner();
    let image = run_blocking(move || svc.get_image(product_id, image_id)).await?;
    Ok(HttpResponse::Ok().json(ProductImageResponse::from(image)))
}

#[utoipa::path(
    put,
    path = "/products/{product_id}/images/{id}",
    params(
        ("product_id" = Uuid, Path, description = "Product UUID"),
        ("id" = Uuid, Path, description = "Image UUID"),
    ),
    request_body = ProductImageRequest,
    responses(
        (status = 200, description = "Image updated", body = ProductImageResponse),
        (status = 404, description = "Product or image not found"),
    ),
    tag = "catalog"
)]
pub async fn update_image(
    svc: web::Data<CatalogService>,
    path: web::Path<(Uuid, Uuid)>,
    body: web::Json<ProductImageRequest>,
) -> Result<HttpResponse, AppError> {
    let (product_id, image_id) = path.into_inner();
    let body = body.into_inner();
    let image = run_blocking(move || svc.update_image(product_id, image_id, &body.image)).await?;
    Ok(HttpResponse::Ok().json(ProductImageResponse::from(image)))
}

#[utoipa::path(
    delete,
    path = "/products/{product_id}/images/{id}",
    params(
        ("product_id" = Uuid, Path, description = "Product UUID"),
        ("id" = Uuid, Path, description = "Image UUID"),
    ),
    responses(
        (status = 204, description = "Image removed"),
        (status = 404, description = "Product or image not found"),
    ),
    tag = "catalog"
)]
pub async fn delete_image(
    svc: web::Data<CatalogService>,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<HttpResponse, AppError> {
    let (product_id, image_id) = path.into_inner();
    run_blocking(move || svc.delete_image(product_id, image_id)).await?;
    Ok(HttpResponse::NoContent().finish())
}
