use std::io;
use std::sync::Arc;

use dotenvy::dotenv;
use storefront::config::AppConfig;
use storefront::infrastructure::paystack::PaystackClient;
use storefront::{build_server, create_pool, run_migrations, AppServices};

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = AppConfig::from_env().map_err(io::Error::other)?;
    log::debug!("Loaded configuration: {config:?}");

    let pool = create_pool(&config.database_url).map_err(io::Error::other)?;
    run_migrations(&pool).map_err(io::Error::other)?;

    let paystack = PaystackClient::new(&config.paystack).map_err(io::Error::other)?;
    let services = AppServices::new(pool, Arc::new(paystack), &config.wallet_currency);

    log::info!("Starting server at http://{}:{}", config.host, config.port);

    build_server(services, &config.host, config.port)?.await
}
