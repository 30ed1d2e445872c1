pub mod application;
pub mod config;
pub mod db;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;
pub mod openapi;
pub mod schema;

#[cfg(test)]
mod testing;

use std::sync::Arc;

use actix_web::{middleware::Logger, web, App, HttpServer};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

use application::cart_service::CartService;
use application::catalog_service::CatalogService;
use application::customer_service::CustomerService;
use application::order_service::OrderService;
use application::payment_service::PaymentService;
use application::wallet_service::WalletService;
use domain::ports::PaymentGateway;
use infrastructure::cart_repo::DieselCartRepository;
use infrastructure::catalog_repo::DieselCatalogRepository;
use infrastructure::customer_repo::DieselCustomerRepository;
use infrastructure::order_repo::DieselOrderRepository;
use infrastructure::payment_repo::DieselPaymentRepository;
use infrastructure::wallet_repo::DieselWalletRepository;

pub use db::{create_pool, DbPool};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Run any pending Diesel migrations against the pool's database.
pub fn run_migrations(pool: &DbPool) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut conn = pool.get()?;
    conn.run_pending_migrations(MIGRATIONS)?;
    Ok(())
}

/// Every application service, ready to be registered as actix app data.
#[derive(Clone)]
pub struct AppServices {
    pub catalog: web::Data<CatalogService>,
    pub carts: web::Data<CartService>,
    pub customers: web::Data<CustomerService>,
    pub orders: web::Data<OrderService>,
    pub wallets: web::Data<WalletService>,
    pub payments: web::Data<PaymentService>,
}

impl AppServices {
    /// Wires the Diesel repositories and the given payment gateway.
    pub fn new(pool: DbPool, gateway: Arc<dyn PaymentGateway>, wallet_currency: &str) -> Self {
        AppServices {
            catalog: web::Data::new(CatalogService::new(Arc::new(
                DieselCatalogRepository::new(pool.clone()),
            ))),
            carts: web::Data::new(CartService::new(Arc::new(DieselCartRepository::new(
                pool.clone(),
            )))),
            customers: web::Data::new(CustomerService::new(Arc::new(
                DieselCustomerRepository::new(pool.clone()),
            ))),
            orders: web::Data::new(OrderService::new(Arc::new(DieselOrderRepository::new(
                pool.clone(),
            )))),
            wallets: web::Data::new(WalletService::new(
                Arc::new(DieselWalletRepository::new(pool.clone())),
                wallet_currency,
            )),
            payments: web::Data::new(PaymentService::new(
                Arc::new(DieselPaymentRepository::new(pool)),
                gateway,
                wallet_currency,
            )),
        }
    }

    /// Registers the services and every route on an app or scope.
    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(self.catalog.clone())
            .app_data(self.carts.clone())
            .app_data(self.customers.clone())
            .app_data(self.orders.clone())
            .app_data(self.wallets.clone())
            .app_data(self.payments.clone());
        handlers::configure(cfg);
    }
}

/// Build and return an actix-web `Server` bound to `host:port`.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server.
pub fn build_server(
    services: AppServices,
    host: &str,
    port: u16,
) -> std::io::Result<actix_web::dev::Server> {
    Ok(HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .service(openapi::swagger_ui())
            .configure(|cfg| services.configure(cfg))
    })
    .bind((host.to_string(), port))?
    .run())
}
