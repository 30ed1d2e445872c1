use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::order_service::OrderService;
use crate::application::Pagination;
use crate::domain::caller::Caller;
use crate::domain::money::format_money;
use crate::domain::order::{OrderItemView, OrderView, PaymentStatus};
use crate::errors::AppError;

use super::carts::ProductSummaryResponse;
use super::{run_blocking, PageParams};

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    pub cart_id: Uuid,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOrderRequest {
    /// `PENDING`, `COMPLETE` or `FAILED`.
    pub payment_status: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderItemResponse {
    pub id: Uuid,
    pub product: ProductSummaryResponse,
    /// Price at the time the order was placed.
    pub unit_price: String,
    pub quantity: i32,
}

impl From<OrderItemView> for OrderItemResponse {
    fn from(item: OrderItemView) -> Self {
        OrderItemResponse {
            id: item.id,
            unit_price: format_money(&item.unit_price),
            quantity: item.quantity,
            product: item.product.into(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderResponse {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub placed_at: DateTime<Utc>,
    pub payment_status: String,
    pub items: Vec<OrderItemResponse>,
    pub total: String,
}

impl From<OrderView> for OrderResponse {
    fn from(order: OrderView) -> Self {
        OrderResponse {
            id: order.id,
            customer_id: order.customer_id,
            placed_at: order.placed_at,
            payment_status: order.payment_status.to_string(),
            total: format_money(&order.total()),
            items: order.items.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ListOrdersResponse {
    pub items: Vec<OrderResponse>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /orders
///
/// Checks out a cart. Stock is decremented, prices are snapshotted onto the
/// order items and the cart is deleted, all in one database transaction.
#[utoipa::path(
    post,
    path = "/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order placed", body = OrderResponse),
        (status = 401, description = "Missing caller identity"),
        (status = 404, description = "Cart not found"),
        (status = 409, description = "Insufficient inventory for a cart line"),
    ),
    tag = "orders"
)]
pub async fn create_order(
    svc: web::Data<OrderService>,
    caller: Caller,
    body: web::Json<CreateOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let cart_id = body.into_inner().cart_id;
    let order = run_blocking(move || svc.place_order(&caller, cart_id)).await?;
    Ok(HttpResponse::Created().json(OrderResponse::from(order)))
}

/// GET /orders
///
/// Staff see every order; everyone else sees only their own. Items are not
/// included in the listing.
#[utoipa::path(
    get,
    path = "/orders",
    params(PageParams),
    responses(
        (status = 200, description = "Paginated list of orders", body = ListOrdersResponse),
        (status = 401, description = "Missing caller identity"),
    ),
    tag = "orders"
)]
pub async fn list_orders(
    svc: web::Data<OrderService>,
    caller: Caller,
    query: web::Query<PageParams>,
) -> Result<HttpResponse, AppError> {
    let pagination = Pagination::from(query.into_inner());
    let result = run_blocking(move || svc.list_orders(&caller, pagination)).await?;
    Ok(HttpResponse::Ok().json(ListOrdersResponse {
        items: result.items.into_iter().map(Into::into).collect(),
        total: result.total,
        page: pagination.page,
        limit: pagination.limit,
    }))
}

/// GET /orders/{id}
#[utoipa::path(
    get,
    path = "/orders/{id}",
    params(("id" = Uuid, Path, description = "Order UUID")),
    responses(
        (status = 200, description = "Order found", body = OrderResponse),
        (status = 401, description = "Missing caller identity"),
        (status = 404, description = "Order not found or not visible to the caller"),
    ),
    tag = "orders"
)]
pub async fn get_order(
    svc: web::Data<OrderService>,
    caller: Caller,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let order = run_blocking(move || svc.get_order(&caller, id)).await?;
    Ok(HttpResponse::Ok().json(OrderResponse::from(order)))
}

/// PATCH /orders/{id}
#[utoipa::path(
    patch,
    path = "/orders/{id}",
    params(("id" = Uuid, Path, description = "Order UUID")),
    request_body = UpdateOrderRequest,
    responses(
        (status = 200, description = "Payment status updated", body = OrderResponse),
        (status = 400, description = "Unknown payment status"),
        (status = 403, description = "Caller is not staff"),
        (status = 404, description = "Order not found"),
    ),
    tag = "orders"
)]
pub async fn update_order(
    svc: web::Data<OrderService>,
    caller: Caller,
    path: web::Path<Uuid>,
    body: web::Json<UpdateOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let status = body.into_inner().payment_status.parse::<PaymentStatus>()?;
    let order = run_blocking(move || svc.update_payment_status(&caller, id, status)).await?;
    Ok(HttpResponse::Ok().json(OrderResponse::from(order)))
}

/// DELETE /orders/{id}
#[utoipa::path(
    delete,
    path = "/orders/{id}",
    params(("id" = Uuid, Path, description = "Order UUID")),
    responses(
        (status = 204, description = "Order deleted"),
        (status = 403, description = "Caller is not staff"),
        (status = 404, description = "Order not found"),
    ),
    tag = "orders"
)]
pub async fn delete_order(
    svc: web::Data<OrderService>,
    caller: Caller,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    run_blocking(move || svc.delete_order(&caller, id)).await?;
    Ok(HttpResponse::NoContent().finish())
}
