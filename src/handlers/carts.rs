use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::cart_service::CartService;
use crate::domain::cart::{CartItemView, CartView};
use crate::domain::catalog::ProductSummary;
use crate::domain::money::format_money;
use crate::errors::AppError;

use super::run_blocking;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddCartItemRequest {
    pub product_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateCartItemRequest {
    pub quantity: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductSummaryResponse {
    pub id: Uuid,
    pub title: String,
    pub unit_price: String,
}

impl From<ProductSummary> for ProductSummaryResponse {
    fn from(product: ProductSummary) -> Self {
        ProductSummaryResponse {
            id: product.id,
            title: product.title,
            unit_price: format_money(&product.unit_price),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartItemResponse {
    pub id: Uuid,
    pub product: ProductSummaryResponse,
    pub quantity: i32,
    /// quantity × unit_price
    pub total_price: String,
}

impl From<CartItemView> for CartItemResponse {
    fn from(item: CartItemView) -> Self {
        CartItemResponse {
            id: item.id,
            total_price: format_money(&item.total_price()),
            quantity: item.quantity,
            product: item.product.into(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartResponse {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub items: Vec<CartItemResponse>,
    pub total_price: String,
}

impl From<CartView> for CartResponse {
    fn from(cart: CartView) -> Self {
        CartResponse {
            id: cart.id,
            created_at: cart.created_at,
            total_price: format_money(&cart.total_price()),
            items: cart.items.into_iter().map(Into::into).collect(),
        }
    }
}

// ── Carts ────────────────────────────────────────────────────────────────────

/// POST /carts
///
/// Carts are anonymous; the returned id is the only handle on them.
#[utoipa::path(
    post,
    path = "/carts",
    responses((status = 201, description = "Empty cart created", body = CartResponse)),
    tag = "carts"
)]
pub async fn create_cart(svc: web::Data<CartService>) -> Result<HttpResponse, AppError> {
    let cart = run_blocking(move || svc.create_cart()).await?;
    Ok(HttpResponse::Created().json(CartResponse::from(cart)))
}

/// GET /carts/{id}
#[utoipa::path(
    get,
    path = "/carts/{id}",
    params(("id" = Uuid, Path, description = "Cart UUID")),
    responses(
        (status = 200, description = "Cart with items and totals", body = CartResponse),
        (status = 404, description = "Cart not found"),
    ),
    tag = "carts"
)]
pub async fn get_cart(
    svc: web::Data<CartService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let cart = run_blocking(move || svc.get_cart(id)).await?;
    Ok(HttpResponse::Ok().json(CartResponse::from(cart)))
}

/// DELETE /carts/{id}
#[utoipa::path(
    delete,
    path = "/carts/{id}",
    params(("id" = Uuid, Path, description = "Cart UUID")),
    responses(
        (status = 204, description = "Cart deleted"),
        (status = 404, description = "Cart not found"),
    ),
    tag = "carts"
)]
pub async fn delete_cart(
    svc: web::Data<CartService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    run_blocking(move || svc.delete_cart(id)).await?;
    Ok(HttpResponse::NoContent().finish())
}

// ── Cart items ───────────────────────────────────────────────────────────────

#[utoipa::path(
    get,
    path = "/carts/{cart_id}/items",
    params(("cart_id" = Uuid, Path, description = "Cart UUID")),
    responses(
        (status = 200, description = "Items in the cart", body = [CartItemResponse]),
        (status = 404, description = "Cart not found"),
    ),
    tag = "carts"
)]
pub async fn list_items(
    svc: web::Data<CartService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let cart_id = path.into_inner();
    let items = run_blocking(move || svc.list_items(cart_id)).await?;
    let body: Vec<CartItemResponse> = items.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// POST /carts/{cart_id}/items
///
/// Adding a product already in the cart increases that line's quantity.
#[utoipa::path(
    post,
    path = "/carts/{cart_id}/items",
    params(("cart_id" = Uuid, Path, description = "Cart UUID")),
    request_body = AddCartItemRequest,
    responses(
        (status = 201, description = "Item added or merged", body = CartItemResponse),
        (status = 400, description = "Unknown product, non-positive quantity or merged quantity out of range"),
        (status = 404, description = "Cart not found"),
    ),
    tag = "carts"
)]
pub async fn add_item(
    svc: web::Data<CartService>,
    path: web::Path<Uuid>,
    body: web::Json<AddCartItemRequest>,
) -> Result<HttpResponse, AppError> {
    let cart_id = path.into_inner();
    let body = body.into_inner();
    let item = run_blocking(move || svc.add_item(cart_id, body.product_id, body.quantity)).await?;
    Ok(HttpResponse::Created().json(CartItemResponse::from(item)))
}

#[utoipa::path(
    get,
    path = "/carts/{cart_id}/items/{id}",
    params(
        ("cart_id" = Uuid, Path, description = "Cart UUID"),
        ("id" = Uuid, Path, description = "Cart item UUID"),
    ),
    responses(
        (status = 200, description = "Cart item", body = CartItemResponse),
        (status = 404, description = "Cart or item not found"),
    ),
    tag = "carts"
)]
pub async fn get_item(
    svc: web::Data<CartService>,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<HttpResponse, AppError> {
    let (cart_id, item_id) = path.into_inner();
    let item = run_blocking(move || svc.get_item(cart_id, item_id)).await?;
    Ok(HttpResponse::Ok().json(CartItemResponse::from(item)))
}

#[utoipa::path(
    patch,
    path = "/carts/{cart_id}/items/{id}",
    params(
        ("cart_id" = Uuid, Path, description = "Cart UUID"),
        ("id" = Uuid, Path, description = "Cart item UUID"),
    ),
    request_body = UpdateCartItemRequest,
    responses(
        (status = 200, description = "Quantity updated", body = CartItemResponse),
        (status = 400, description = "Non-positive quantity"),
        (status = 404, description = "Cart or item not found"),
    ),
    tag = "carts"
)]
pub async fn update_item(
    svc: web::Data<CartService>,
    path: web::Path<(Uuid, Uuid)>,
    body: web::Json<UpdateCartItemRequest>,
) -> Result<HttpResponse, AppError> {
    let (cart_id, item_id) = path.into_inner();
    let quantity = body.into_inner().quantity;
    let item = run_blocking(move || svc.update_quantity(cart_id, item_id, quantity)).await?;
    Ok(HttpResponse::Ok().json(CartItemResponse::from(item)))
}

#[utoipa::path(
    delete,
    path = "/carts/{cart_id}/items/{id}",
    params(
        ("cart_id" = Uuid, Path, description = "Cart UUID"),
        ("id" = Uuid, Path, description = "Cart item UUID"),
    ),
    responses(
        (status = 204, description = "Item removed"),
        (status = 404, description = "Cart or item not found"),
    ),
    tag = "carts"
)]
pub async fn remove_item(
    svc: web::Data<CartService>,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<HttpResponse, AppError> {
    let (cart_id, item_id) = path.into_inner();
    run_blocking(move || svc.remove_item(cart_id, item_id)).await?;
    Ok(HttpResponse::NoContent().finish())
}
