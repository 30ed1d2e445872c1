pub mod auth;
pub mod carts;
pub mod collections;
pub mod customers;
pub mod orders;
pub mod payments;
pub mod product_images;
pub mod products;
pub mod wallets;

use actix_web::web;
use serde::Deserialize;
use utoipa::IntoParams;

use crate::application::{Pagination, DEFAULT_PAGE_SIZE};
use crate::domain::errors::DomainError;
use crate::errors::AppError;

// ── Shared helpers ───────────────────────────────────────────────────────────

/// Runs blocking service work (Diesel calls) on actix's blocking pool.
pub(crate) async fn run_blocking<T, F>(f: F) -> Result<T, AppError>
where
    F: FnOnce() -> Result<T, DomainError> + Send + 'static,
    T: Send + 'static,
{
    Ok(web::block(f)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??)
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageParams {
    /// Page number (1-based). Defaults to 1.
    #[serde(default = "default_page")]
    pub page: i64,
    /// Number of items per page. Defaults to 20, maximum 100.
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_page() -> i64 {
    1
}

fn default_limit() -> i64 {
    DEFAULT_PAGE_SIZE
}

impl From<PageParams> for Pagination {
    fn from(params: PageParams) -> Self {
        Pagination::new(params.page, params.limit)
    }
}

// ── Routes ───────────────────────────────────────────────────────────────────

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/collections")
            .route("", web::get().to(collections::list_collections))
            .route("", web::post().to(collections::create_collection))
            .route("/{id}", web::get().to(collections::get_collection))
            .route("/{id}", web::put().to(collections::update_collection))
            .route("/{id}", web::delete().to(collections::delete_collection)),
    )
    .service(
        web::scope("/products")
            .route("", web::get().to(products::list_products))
            .route("", web::post().to(products::create_product))
            .route(
                "/{product_id}/images",
                web::get().to(product_images::list_images),
            )
            .route(
                "/{product_id}/images",
                web::post().to(product_images::add_image),
            )
            .route(
                "/{product_id}/images/{id}",
                web::get().to(product_images::get_image),
            )
            .route(
                "/{product_id}/images/{id}",
                web::put().to(product_images::update_image),
            )
            .route(
                "/{product_id}/images/{id}",
                web::delete().to(product_images::delete_image),
            )
            .route("/{id}", web::get().to(products::get_product))
            .route("/{id}", web::put().to(products::replace_product))
            .route("/{id}", web::patch().to(products::patch_product))
            .route("/{id}", web::delete().to(products::delete_product)),
    )
    .service(
        web::scope("/carts")
            .route("", web::post().to(carts::create_cart))
            .route("/{cart_id}/items", web::get().to(carts::list_items))
            .route("/{cart_id}/items", web::post().to(carts::add_item))
            .route("/{cart_id}/items/{id}", web::get().to(carts::get_item))
            .route("/{cart_id}/items/{id}", web::patch().to(carts::update_item))
            .route("/{cart_id}/items/{id}", web::delete().to(carts::remove_item))
            .route("/{id}", web::get().to(carts::get_cart))
            .route("/{id}", web::delete().to(carts::delete_cart)),
    )
    .service(
        // `/me` must be matched before `/{id}`.
        web::scope("/customers")
            .route("", web::post().to(customers::create_customer))
            .route("/me", web::get().to(customers::get_me))
            .route("/me", web::put().to(customers::update_me))
            .route("/{id}", web::get().to(customers::get_customer))
            .route("/{id}", web::put().to(customers::update_customer)),
    )
    .service(
        web::scope("/orders")
            .route("", web::get().to(orders::list_orders))
            .route("", web::post().to(orders::create_order))
            .route("/{id}", web::get().to(orders::get_order))
            .route("/{id}", web::patch().to(orders::update_order))
            .route("/{id}", web::delete().to(orders::delete_order)),
    )
    .service(
        web::scope("/wallet")
            .route("", web::get().to(wallets::get_wallet))
            .route("", web::post().to(wallets::create_wallet))
            .route("/balance", web::get().to(wallets::get_balance))
            .route("/audit", web::get().to(wallets::audit_wallet))
            .route("/transactions", web::get().to(wallets::list_transactions))
            .route("/transactions/{id}", web::get().to(wallets::get_transaction)),
    )
    .service(
        web::scope("/payments")
            .route("", web::get().to(payments::list_payment_logs))
            .route("/{id}", web::get().to(payments::get_payment_log)),
    )
    .service(
        web::scope("/paystack")
            .route("/initialize", web::post().to(payments::initialize_payment))
            .route("/verify", web::post().to(payments::verify_payment))
            .route("/history", web::get().to(payments::payment_history)),
    );
}
