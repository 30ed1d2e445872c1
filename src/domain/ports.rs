use async_trait::async_trait;
use bigdecimal::BigDecimal;
use uuid::Uuid;

use super::cart::{CartItemView, CartView};
use super::catalog::{
    CollectionView, ProductChanges, ProductImageView, ProductInput, ProductPage, ProductView,
};
use super::customer::{CustomerProfile, CustomerView};
use super::errors::DomainError;
use super::order::{ListResult, OrderScope, OrderView, PaymentStatus};
use super::payment::{
    ChargeRequest, ChargeVerification, InitializedCharge, NewPaymentLog, PaymentLogView,
};
use super::wallet::{Settlement, WalletTransactionView, WalletView};

pub trait CatalogRepository: Send + Sync + 'static {
    fn list_collections(&self) -> Result<Vec<CollectionView>, DomainError>;
    fn find_collection(&self, id: Uuid) -> Result<Option<CollectionView>, DomainError>;
    fn create_collection(&self, title: &str) -> Result<CollectionView, DomainError>;
    fn rename_collection(&self, id: Uuid, title: &str)
        -> Result<Option<CollectionView>, DomainError>;
    fn delete_collection(&self, id: Uuid) -> Result<bool, DomainError>;

    fn list_products(&self, page: i64, limit: i64) -> Result<ProductPage, DomainError>;
    fn find_product(&self, id: Uuid) -> Result<Option<ProductView>, DomainError>;
    fn create_product(&self, input: ProductInput) -> Result<ProductView, DomainError>;
    fn update_product(
        &self,
        id: Uuid,
        changes: ProductChanges,
    ) -> Result<Option<ProductView>, DomainError>;
    /// Fails with `Conflict` while any order item references the product.
    fn delete_product(&self, id: Uuid) -> Result<bool, DomainError>;

    fn list_images(&self, product_id: Uuid) -> Result<Vec<ProductImageView>, DomainError>;
    fn find_image(
        &self,
        product_id: Uuid,
        image_id: Uuid,
    ) -> Result<Option<ProductImageView>, DomainError>;
    fn add_image(&self, product_id: Uuid, image: &str) -> Result<ProductImageView, DomainError>;
    fn update_image(
        &self,
        product_id: Uuid,
        image_id: Uuid,
        image: &str,
    ) -> Result<Option<ProductImageView>, DomainError>;
    fn delete_image(&self, product_id: Uuid, image_id: Uuid) -> Result<bool, DomainError>;
}

pub trait CartRepository: Send + Sync + 'static {
    fn create(&self) -> Result<CartView, DomainError>;
    fn find(&self, id: Uuid) -> Result<Option<CartView>, DomainError>;
    fn delete(&self, id: Uuid) -> Result<bool, DomainError>;
    /// Adds `quantity` of a product, merging into an existing line for it.
    fn add_item(
        &self,
        cart_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<CartItemView, DomainError>;
    fn set_quantity(
        &self,
        cart_id: Uuid,
        item_id: Uuid,
        quantity: i32,
    ) -> Result<Option<CartItemView>, DomainError>;
    fn remove_item(&self, cart_id: Uuid, item_id: Uuid) -> Result<bool, DomainError>;
}

pub trait CustomerRepository: Send + Sync + 'static {
    fn get_or_create(&self, user_id: i64) -> Result<CustomerView, DomainError>;
    fn find(&self, id: Uuid) -> Result<Option<CustomerView>, DomainError>;
    fn create(&self, user_id: i64, profile: CustomerProfile) -> Result<CustomerView, DomainError>;
    fn update(
        &self,
        id: Uuid,
        profile: CustomerProfile,
    ) -> Result<Option<CustomerView>, DomainError>;
}

pub trait OrderRepository: Send + Sync + 'static {
    /// Converts a cart into an order in one transaction and deletes the cart.
    fn place(&self, cart_id: Uuid, user_id: i64) -> Result<OrderView, DomainError>;
    fn find_by_id(&self, id: Uuid, scope: OrderScope) -> Result<Option<OrderView>, DomainError>;
    fn list(&self, scope: OrderScope, page: i64, limit: i64) -> Result<ListResult, DomainError>;
    fn set_payment_status(
        &self,
        id: Uuid,
        status: PaymentStatus,
    ) -> Result<Option<OrderView>, DomainError>;
    fn delete(&self, id: Uuid) -> Result<bool, DomainError>;
}

pub trait WalletRepository: Send + Sync + 'static {
    fn find_by_user(&self, user_id: i64) -> Result<Option<WalletView>, DomainError>;
    fn create(&self, user_id: i64, currency: &str) -> Result<WalletView, DomainError>;
    fn transactions(&self, user_id: i64) -> Result<Vec<WalletTransactionView>, DomainError>;
    fn find_transaction(
        &self,
        user_id: i64,
        id: Uuid,
    ) -> Result<Option<WalletTransactionView>, DomainError>;
    /// Σ of signed ledger amounts, independent of the stored balance.
    fn ledger_balance(&self, wallet_id: Uuid) -> Result<BigDecimal, DomainError>;
}

pub trait PaymentRepository: Send + Sync + 'static {
    fn record(&self, log: NewPaymentLog) -> Result<PaymentLogView, DomainError>;
    fn find_by_reference(&self, reference: &str) -> Result<Option<PaymentLogView>, DomainError>;
    fn list_for_user(&self, user_id: i64) -> Result<Vec<PaymentLogView>, DomainError>;
    fn find_for_user(&self, user_id: i64, id: Uuid)
        -> Result<Option<PaymentLogView>, DomainError>;
    /// Marks a pending log failed. Never downgrades a successful one.
    fn mark_failed(&self, reference: &str) -> Result<bool, DomainError>;
    /// Marks the log successful and credits its owner's wallet exactly once.
    fn settle(
        &self,
        reference: &str,
        amount: &BigDecimal,
        currency: &str,
        description: &str,
    ) -> Result<Settlement, DomainError>;
}

#[async_trait]
pub trait PaymentGateway: Send + Sync + 'static {
    fn name(&self) -> &'static str;
    async fn initialize(&self, request: ChargeRequest) -> Result<InitializedCharge, DomainError>;
    async fn verify(&self, reference: &str) -> Result<ChargeVerification, DomainError>;
}
