use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::handlers::{
    carts, collections, customers, orders, payments, product_images, products, wallets,
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Storefront API",
        version = "0.1.0",
        description = r#"
Catalog, carts, checkout and a Paystack-funded wallet.

Authenticated routes expect the upstream gateway to set `X-User-Id` (integer)
and, for staff, `X-User-Staff: true`. Catalog and cart routes are anonymous.

Errors are returned as `{"error": "<message>"}`. Money is always a decimal
string with two places.
"#
    ),
    tags(
        (name = "catalog", description = "Collections, products and product images"),
        (name = "carts", description = "Anonymous shopping carts"),
        (name = "customers", description = "Customer profiles"),
        (name = "orders", description = "Checkout and order management"),
        (name = "wallet", description = "Wallet balance and ledger"),
        (name = "payments", description = "Paystack charges and payment logs"),
    ),
    paths(
        collections::list_collections,
        collections::create_collection,
        collections::get_collection,
        collections::update_collection,
        collections::delete_collection,
        products::list_products,
        products::create_product,
        products::get_product,
        products::replace_product,
        products::patch_product,
        products::delete_product,
        product_images::list_images,
        product_images::add_image,
        product_images::get_image,
        product_images::update_image,
        product_images::delete_image,
        carts::create_cart,
        carts::get_cart,
        carts::delete_cart,
        carts::list_items,
        carts::add_item,
        carts::get_item,
        carts::update_item,
        carts::remove_item,
        customers::create_customer,
        customers::get_me,
        customers::update_me,
        customers::get_customer,
        customers::update_customer,
        orders::create_order,
        orders::list_orders,
        orders::get_order,
        orders::update_order,
        orders::delete_order,
        wallets::get_wallet,
        wallets::create_wallet,
        wallets::get_balance,
        wallets::audit_wallet,
        wallets::list_transactions,
        wallets::get_transaction,
        payments::initialize_payment,
        payments::verify_payment,
        payments::payment_history,
        payments::list_payment_logs,
        payments::get_payment_log,
    ),
    components(schemas(
        collections::CollectionRequest,
        collections::CollectionResponse,
        products::ProductRequest,
        products::ProductPatchRequest,
        products::ProductResponse,
        products::ListProductsResponse,
        product_images::ProductImageRequest,
        product_images::ProductImageResponse,
        carts::AddCartItemRequest,
        carts::UpdateCartItemRequest,
        carts::ProductSummaryResponse,
        carts::CartItemResponse,
        carts::CartResponse,
        customers::CustomerRequest,
        customers::CustomerResponse,
        orders::CreateOrderRequest,
        orders::UpdateOrderRequest,
        orders::OrderItemResponse,
        orders::OrderResponse,
        orders::ListOrdersResponse,
        wallets::CreateWalletRequest,
        wallets::WalletResponse,
        wallets::BalanceResponse,
        wallets::WalletAuditResponse,
        wallets::WalletTransactionResponse,
        payments::InitializePaymentRequest,
        payments::InitializePaymentResponse,
        payments::VerifyPaymentRequest,
        payments::VerifyPaymentResponse,
        payments::PaymentLogResponse,
    ))
)]
pub struct ApiDoc;

pub const OPENAPI_JSON: &str = "/api-docs/openapi.json";

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui/{_:.*}").url(OPENAPI_JSON, ApiDoc::openapi())
}
