use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::catalog_service::CatalogService;
use crate::domain::catalog::CollectionView;
use crate::errors::AppError;

use super::run_blocking;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct CollectionRequest {
    pub title: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CollectionResponse {
    pub id: Uuid,
    pub title: String,
    pub products_count: i64,
}

impl From<CollectionView> for CollectionResponse {
    fn from(view: CollectionView) -> Self {
        CollectionResponse {
            id: view.id,
            title: view.title,
            products_count: view.products_count,
        }
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /collections
#[utoipa::path(
    get,
    path = "/collections",
    responses(
        (status = 200, description = "All collections with their product counts", body = [CollectionResponse]),
    ),
    tag = "catalog"
)]
pub async fn list_collections(svc: web::Data<CatalogService>) -> Result<HttpResponse, AppError> {
    let collections = run_blocking(move || svc.list_collections()).await?;
    let body: Vec<CollectionResponse> = collections.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// POST /collections
#[utoipa::path(
    post,
    path = "/collections",
    request_body = CollectionRequest,
    responses(
        (status = 201, description = "Collection created", body = CollectionResponse),
        (status = 400, description = "Invalid title"),
    ),
    tag = "catalog"
)]
pub async fn create_collection(
    svc: web::Data<CatalogService>,
    body: web::Json<CollectionRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let collection = run_blocking(move || svc.create_collection(&body.title)).await?;
    Ok(HttpResponse::Created().json(CollectionResponse::from(collection)))
}

/// GET /collections/{id}
#[utoipa::path(
    get,
    path = "/collections/{id}",
    params(("id" = Uuid, Path, description = "Collection UUID")),
    responses(
        (status = 200, description = "Collection found", body = CollectionResponse),
        (status = 404, description = "Collection not found"),
    ),
    tag = "catalog"
)]
pub async fn get_collection(
    svc: web::Data<CatalogService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let collection = run_blocking(move || svc.get_collection(id)).await?;
    Ok(HttpResponse::Ok().json(CollectionResponse::from(collection)))
}

/// PUT /collections/{id}
#[utoipa::path(
    put,
    path = "/collections/{id}",
    params(("id" = Uuid, Path, description = "Collection UUID")),
    request_body = CollectionRequest,
    responses(
        (status = 200, description = "Collection renamed", body = CollectionResponse),
        (status = 400, description = "Invalid title"),
        (status = 404, description = "Collection not found"),
    ),
    tag = "catalog"
)]
pub async fn update_collection(
    svc: web::Data<CatalogService>,
    path: web::Path<Uuid>,
    body: web::Json<CollectionRequest>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let body = body.into_inner();
    let collection = run_blocking(move || svc.rename_collection(id, &body.title)).await?;
    Ok(HttpResponse::Ok().json(CollectionResponse::from(collection)))
}

/// DELETE /collections/{id}
///
/// Deletes the collection and its products. Rejected while any of those
/// products appears on an order.
#[utoipa::path(
    delete,
    path = "/collections/{id}",
    params(("id" = Uuid, Path, description = "Collection UUID")),
    responses(
        (status = 204, description = "Collection deleted"),
        (status = 404, description = "Collection not found"),
        (status = 409, description = "A product in the collection is referenced by an order"),
    ),
    tag = "catalog"
)]
pub async fn delete_collection(
    svc: web::Data<CatalogService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    run_blocking(move || svc.delete_collection(id)).await?;
    Ok(HttpResponse::NoContent().finish())
}
