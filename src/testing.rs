//! In-memory stand-ins for the Postgres repositories and the Paystack client,
//! used by service and handler tests.

use std::str::FromStr;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde_json::json;
use uuid::Uuid;

use crate::domain::cart::{merge_quantity, CartItemView, CartView};
use crate::domain::catalog::{
    CollectionView, ProductChanges, ProductImageView, ProductInput, ProductPage, ProductSummary,
    ProductView,
};
use crate::domain::customer::{CustomerProfile, CustomerView};
use crate::domain::errors::DomainError;
use crate::domain::order::{
    insufficient_inventory, ListResult, OrderItemView, OrderScope, OrderView, PaymentStatus,
};
use crate::domain::payment::{
    ChargeRequest, ChargeVerification, InitializedCharge, NewPaymentLog, PaymentLogStatus,
    PaymentLogView,
};
use crate::domain::ports::{
    CartRepository, CatalogRepository, CustomerRepository, OrderRepository, PaymentGateway,
    PaymentRepository, WalletRepository,
};
use crate::domain::wallet::{
    ledger_sum, Settlement, TransactionType, WalletTransactionView, WalletView,
};

#[derive(Clone)]
struct ProductRecord {
    id: Uuid,
    title: String,
    description: String,
    unit_price: BigDecimal,
    inventory: i32,
    collection_id: Uuid,
    created_at: DateTime<Utc>,
}

#[derive(Clone)]
struct CartItemRecord {
    id: Uuid,
    cart_id: Uuid,
    product_id: Uuid,
    quantity: i32,
}

#[derive(Clone)]
struct OrderRecord {
    id: Uuid,
    customer_id: Uuid,
    payment_status: PaymentStatus,
    placed_at: DateTime<Utc>,
}

#[derive(Clone)]
struct OrderItemRecord {
    id: Uuid,
    order_id: Uuid,
    product_id: Uuid,
    quantity: i32,
    unit_price: BigDecimal,
}

#[derive(Default, Clone)]
struct State {
    collections: Vec<(Uuid, String)>,
    products: Vec<ProductRecord>,
    images: Vec<ProductImageView>,
    carts: Vec<(Uuid, DateTime<Utc>)>,
    cart_items: Vec<CartItemRecord>,
    customers: Vec<CustomerView>,
    orders: Vec<OrderRecord>,
    order_items: Vec<OrderItemRecord>,
    wallets: Vec<WalletView>,
    wallet_transactions: Vec<WalletTransactionView>,
    payment_logs: Vec<PaymentLogView>,
}

impl State {
    fn summary(&self, product_id: Uuid) -> Result<ProductSummary, DomainError> {
        self.products
            .iter()
            .find(|p| p.id == product_id)
            .map(|p| ProductSummary {
                id: p.id,
                title: p.title.clone(),
                unit_price: p.unit_price.clone(),
            })
            .ok_or_else(|| DomainError::not_found("Product"))
    }

    fn collection_view(&self, id: Uuid, title: &str) -> CollectionView {
        CollectionView {
            id,
            title: title.to_string(),
            products_count: self
                .products
                .iter()
                .filter(|p| p.collection_id == id)
                .count() as i64,
        }
    }

    fn product_view(&self, record: &ProductRecord) -> ProductView {
        let collection_title = self
            .collections
            .iter()
            .find(|(id, _)| *id == record.collection_id)
            .map(|(_, title)| title.clone())
            .unwrap_or_default();
        ProductView {
            id: record.id,
            title: record.title.clone(),
            description: record.description.clone(),
            unit_price: record.unit_price.clone(),
            inventory: record.inventory,
            collection_id: record.collection_id,
            collection_title,
            images: self
                .images
                .iter()
                .filter(|i| i.product_id == record.id)
                .cloned()
                .collect(),
            created_at: record.created_at,
        }
    }

    fn cart_item_view(&self, item: &CartItemRecord) -> Result<CartItemView, DomainError> {
        Ok(CartItemView {
            id: item.id,
            cart_id: item.cart_id,
            product: self.summary(item.product_id)?,
            quantity: item.quantity,
        })
    }

    fn order_view(&self, order: &OrderRecord) -> Result<OrderView, DomainError> {
        let items = self
            .order_items
            .iter()
            .filter(|i| i.order_id == order.id)
            .map(|i| {
                Ok(OrderItemView {
                    id: i.id,
                    product: self.summary(i.product_id)?,
                    quantity: i.quantity,
                    unit_price: i.unit_price.clone(),
                })
            })
            .collect::<Result<Vec<_>, DomainError>>()?;
        Ok(OrderView {
            id: order.id,
            customer_id: order.customer_id,
            payment_status: order.payment_status,
            placed_at: order.placed_at,
            items,
        })
    }

    fn visible(&self, order: &OrderRecord, scope: OrderScope) -> bool {
        match scope {
            OrderScope::All => true,
            OrderScope::User(user_id) => self
                .customers
                .iter()
                .any(|c| c.id == order.customer_id && c.user_id == user_id),
        }
    }

    fn customer_for(&mut self, user_id: i64) -> CustomerView {
        if let Some(existing) = self.customers.iter().find(|c| c.user_id == user_id) {
            return existing.clone();
        }
        let customer = CustomerView {
            id: Uuid::new_v4(),
            user_id,
            phone: String::new(),
            birth_date: None,
            membership: Default::default(),
        };
        self.customers.push(customer.clone());
        customer
    }
}

/// A single in-memory database implementing every repository port.
#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
}

impl InMemoryStore {
    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    /// Runs `f` against a copy of the state and commits it only on success.
    fn transaction<T>(
        &self,
        f: impl FnOnce(&mut State) -> Result<T, DomainError>,
    ) -> Result<T, DomainError> {
        let mut guard = self.state();
        let mut draft = guard.clone();
        let value = f(&mut draft)?;
        *guard = draft;
        Ok(value)
    }

    pub fn seed_product(&self, title: &str, price: &str, inventory: i32) -> Uuid {
        let mut state = self.state();
        let existing = state.collections.first().map(|(id, _)| *id);
        let collection_id = match existing {
            Some(id) => id,
            None => {
                let id = Uuid::new_v4();
                state.collections.push((id, "General".to_string()));
                id
            }
        };
        let id = Uuid::new_v4();
        state.products.push(ProductRecord {
            id,
            title: title.to_string(),
            description: String::new(),
            unit_price: BigDecimal::from_str(price).unwrap(),
            inventory,
            collection_id,
            created_at: Utc::now(),
        });
        id
    }

    pub fn set_price(&self, product_id: Uuid, price: &str) {
        let mut state = self.state();
        if let Some(p) = state.products.iter_mut().find(|p| p.id == product_id) {
            p.unit_price = BigDecimal::from_str(price).unwrap();
        }
    }

    pub fn inventory_of(&self, product_id: Uuid) -> i32 {
        self.state()
            .products
            .iter()
            .find(|p| p.id == product_id)
            .map(|p| p.inventory)
            .unwrap()
    }

    pub fn seed_payment_log(&self, user_id: i64, reference: &str, amount: &str) {
        self.record(NewPaymentLog {
            user_id,
            gateway: "fake".to_string(),
            reference: reference.to_string(),
            amount: BigDecimal::from_str(amount).unwrap(),
        })
        .unwrap();
    }
}

impl CatalogRepository for InMemoryStore {
    fn list_collections(&self) -> Result<Vec<CollectionView>, DomainError> {
        let state = self.state();
        Ok(state
            .collections
            .iter()
            .map(|(id, title)| state.collection_view(*id, title))
            .collect())
    }

    fn find_collection(&self, id: Uuid) -> Result<Option<CollectionView>, DomainError> {
        let state = self.state();
        Ok(state
            .collections
            .iter()
            .find(|(cid, _)| *cid == id)
            .map(|(cid, title)| state.collection_view(*cid, title)))
    }

    fn create_collection(&self, title: &str) -> Result<CollectionView, DomainError> {
        let mut state = self.state();
        let id = Uuid::new_v4();
        state.collections.push((id, title.to_string()));
        Ok(state.collection_view(id, title))
    }

    fn rename_collection(
        &self,
        id: Uuid,
        title: &str,
    ) -> Result<Option<CollectionView>, DomainError> {
        let mut state = self.state();
        let Some(entry) = state.collections.iter_mut().find(|(cid, _)| *cid == id) else {
            return Ok(None);
        };
        entry.1 = title.to_string();
        Ok(Some(state.collection_view(id, title)))
    }

    fn delete_collection(&self, id: Uuid) -> Result<bool, DomainError> {
        self.transaction(|state| {
            let product_ids: Vec<Uuid> = state
                .products
                .iter()
                .filter(|p| p.collection_id == id)
                .map(|p| p.id)
                .collect();
            if state
                .order_items
                .iter()
                .any(|i| product_ids.contains(&i.product_id))
            {
                return Err(DomainError::Conflict(
                    "collection has products referenced by orders".to_string(),
                ));
            }
            let before = state.collections.len();
            state.collections.retain(|(cid, _)| *cid != id);
            state.products.retain(|p| p.collection_id != id);
            state.images.retain(|i| !product_ids.contains(&i.product_id));
            state
                .cart_items
                .retain(|i| !product_ids.contains(&i.product_id));
            Ok(state.collections.len() != before)
        })
    }

    fn list_products(&self, page: i64, limit: i64) -> Result<ProductPage, DomainError> {
        let state = self.state();
        let mut records = state.products.clone();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let items = records
            .iter()
            .skip(((page - 1) * limit) as usize)
            .take(limit as usize)
            .map(|p| state.product_view(p))
            .collect();
        Ok(ProductPage {
            items,
            total: state.products.len() as i64,
        })
    }

    fn find_product(&self, id: Uuid) -> Result<Option<ProductView>, DomainError> {
        let state = self.state();
        Ok(state
            .products
            .iter()
            .find(|p| p.id == id)
            .map(|p| state.product_view(p)))
    }

    fn create_product(&self, input: ProductInput) -> Result<ProductView, DomainError> {
        let mut state = self.state();
        let record = ProductRecord {
            id: Uuid::new_v4(),
            title: input.title,
            description: input.description,
            unit_price: input.unit_price,
            inventory: input.inventory,
            collection_id: input.collection_id,
            created_at: Utc::now(),
        };
        state.products.push(record.clone());
        Ok(state.product_view(&record))
    }

    fn update_product(
        &self,
        id: Uuid,
        changes: ProductChanges,
    ) -> Result<Option<ProductView>, DomainError> {
        let mut state = self.state();
        let Some(record) = state.products.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        if let Some(title) = changes.title {
            record.title = title;
        }
        if let Some(description) = changes.description {
            record.description = description;
        }
        if let Some(unit_price) = changes.unit_price {
            record.unit_price = unit_price;
        }
        if let Some(inventory) = changes.inventory {
            record.inventory = inventory;
        }
        if let Some(collection_id) = changes.collection_id {
            record.collection_id = collection_id;
        }
        let record = record.clone();
        Ok(Some(state.product_view(&record)))
    }

    fn delete_product(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut state = self.state();
        if state.order_items.iter().any(|i| i.product_id == id) {
            return Err(DomainError::Conflict(
                "product is referenced by existing orders".to_string(),
            ));
        }
        let before = state.products.len();
        state.products.retain(|p| p.id != id);
        state.images.retain(|i| i.product_id != id);
        state.cart_items.retain(|i| i.product_id != id);
        Ok(state.products.len() != before)
    }

    fn list_images(&self, product_id: Uuid) -> Result<Vec<ProductImageView>, DomainError> {
        Ok(self
            .state()
            .images
            .iter()
            .filter(|i| i.product_id == product_id)
            .cloned()
            .collect())
    }

    fn find_image(
        &self,
        product_id: Uuid,
        image_id: Uuid,
    ) -> Result<Option<ProductImageView>, DomainError> {
        Ok(self
            .state()
            .images
            .iter()
            .find(|i| i.product_id == product_id && i.id == image_id)
            .cloned())
    }

    fn add_image(&self, product_id: Uuid, image: &str) -> Result<ProductImageView, DomainError> {
        let view = ProductImageView {
            id: Uuid::new_v4(),
            product_id,
            image: image.to_string(),
        };
        self.state().images.push(view.clone());
        Ok(view)
    }

    fn update_image(
        &self,
        product_id: Uuid,
        image_id: Uuid,
        image: &str,
    ) -> Result<Option<ProductImageView>, DomainError> {
        let mut state = self.state();
        let Some(view) = state
            .images
            .iter_mut()
            .find(|i| i.product_id == product_id && i.id == image_id)
        else {
            return Ok(None);
        };
        view.image = image.to_string();
        Ok(Some(view.clone()))
    }

    fn delete_image(&self, product_id: Uuid, image_id: Uuid) -> Result<bool, DomainError> {
        let mut state = self.state();
        let before = state.images.len();
        state
            .images
            .retain(|i| !(i.product_id == product_id && i.id == image_id));
        Ok(state.images.len() != before)
    }
}

impl CartRepository for InMemoryStore {
    fn create(&self) -> Result<CartView, DomainError> {
        let id = Uuid::new_v4();
        let created_at = Utc::now();
        self.state().carts.push((id, created_at));
        Ok(CartView {
            id,
            created_at,
            items: vec![],
        })
    }

    fn find(&self, id: Uuid) -> Result<Option<CartView>, DomainError> {
        let state = self.state();
        let Some((_, created_at)) = state.carts.iter().find(|(cid, _)| *cid == id) else {
            return Ok(None);
        };
        let items = state
            .cart_items
            .iter()
            .filter(|i| i.cart_id == id)
            .map(|i| state.cart_item_view(i))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Some(CartView {
            id,
            created_at: *created_at,
            items,
        }))
    }

    fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut state = self.state();
        let before = state.carts.len();
        state.carts.retain(|(cid, _)| *cid != id);
        state.cart_items.retain(|i| i.cart_id != id);
        Ok(state.carts.len() != before)
    }

    fn add_item(
        &self,
        cart_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<CartItemView, DomainError> {
        self.transaction(|state| {
            if !state.carts.iter().any(|(id, _)| *id == cart_id) {
                return Err(DomainError::not_found("Cart"));
            }
            if !state.products.iter().any(|p| p.id == product_id) {
                return Err(DomainError::invalid(
                    "No product with the given ID was found.",
                ));
            }
            let existing = state
                .cart_items
                .iter()
                .position(|i| i.cart_id == cart_id && i.product_id == product_id);
            let record = match existing {
                Some(index) => {
                    let merged = merge_quantity(state.cart_items[index].quantity, quantity)?;
                    state.cart_items[index].quantity = merged;
                    state.cart_items[index].clone()
                }
                None => {
                    let item = CartItemRecord {
                        id: Uuid::new_v4(),
                        cart_id,
                        product_id,
                        quantity,
                    };
                    state.cart_items.push(item.clone());
                    item
                }
            };
            state.cart_item_view(&record)
        })
    }

    fn set_quantity(
        &self,
        cart_id: Uuid,
        item_id: Uuid,
        quantity: i32,
    ) -> Result<Option<CartItemView>, DomainError> {
        let mut state = self.state();
        let Some(item) = state
            .cart_items
            .iter_mut()
            .find(|i| i.cart_id == cart_id && i.id == item_id)
        else {
            return Ok(None);
        };
        item.quantity = quantity;
        let item = item.clone();
        state.cart_item_view(&item).map(Some)
    }

    fn remove_item(&self, cart_id: Uuid, item_id: Uuid) -> Result<bool, DomainError> {
        let mut state = self.state();
        let before = state.cart_items.len();
        state
            .cart_items
            .retain(|i| !(i.cart_id == cart_id && i.id == item_id));
        Ok(state.cart_items.len() != before)
    }
}

impl CustomerRepository for InMemoryStore {
    fn get_or_create(&self, user_id: i64) -> Result<CustomerView, DomainError> {
        Ok(self.state().customer_for(user_id))
    }

    fn find(&self, id: Uuid) -> Result<Option<CustomerView>, DomainError> {
        Ok(self.state().customers.iter().find(|c| c.id == id).cloned())
    }

    fn create(&self, user_id: i64, profile: CustomerProfile) -> Result<CustomerView, DomainError> {
        let mut state = self.state();
        if state.customers.iter().any(|c| c.user_id == user_id) {
            return Err(DomainError::Conflict(
                "a customer profile already exists for this user".to_string(),
            ));
        }
        let customer = CustomerView {
            id: Uuid::new_v4(),
            user_id,
            phone: profile.phone,
            birth_date: profile.birth_date,
            membership: profile.membership,
        };
        state.customers.push(customer.clone());
        Ok(customer)
    }

    fn update(
        &self,
        id: Uuid,
        profile: CustomerProfile,
    ) -> Result<Option<CustomerView>, DomainError> {
        let mut state = self.state();
        let Some(customer) = state.customers.iter_mut().find(|c| c.id == id) else {
            return Ok(None);
        };
        customer.phone = profile.phone;
        customer.birth_date = profile.birth_date;
        customer.membership = profile.membership;
        Ok(Some(customer.clone()))
    }
}

impl OrderRepository for InMemoryStore {
    fn place(&self, cart_id: Uuid, user_id: i64) -> Result<OrderView, DomainError> {
        self.transaction(|state| {
            if !state.carts.iter().any(|(id, _)| *id == cart_id) {
                return Err(DomainError::not_found("Cart"));
            }
            let customer = state.customer_for(user_id);
            let order = OrderRecord {
                id: Uuid::new_v4(),
                customer_id: customer.id,
                payment_status: PaymentStatus::Pending,
                placed_at: Utc::now(),
            };
            let lines: Vec<CartItemRecord> = state
                .cart_items
                .iter()
                .filter(|i| i.cart_id == cart_id)
                .cloned()
                .collect();
            for line in lines {
                let product = state
                    .products
                    .iter_mut()
                    .find(|p| p.id == line.product_id)
                    .ok_or_else(|| DomainError::not_found("Product"))?;
                if product.inventory < line.quantity {
                    return Err(insufficient_inventory(&product.title));
                }
                product.inventory -= line.quantity;
                let unit_price = product.unit_price.clone();
                state.order_items.push(OrderItemRecord {
                    id: Uuid::new_v4(),
                    order_id: order.id,
                    product_id: line.product_id,
                    quantity: line.quantity,
                    unit_price,
                });
            }
            state.orders.push(order.clone());
            state.carts.retain(|(id, _)| *id != cart_id);
            state.cart_items.retain(|i| i.cart_id != cart_id);
            state.order_view(&order)
        })
    }

    fn find_by_id(&self, id: Uuid, scope: OrderScope) -> Result<Option<OrderView>, DomainError> {
        let state = self.state();
        state
            .orders
            .iter()
            .find(|o| o.id == id && state.visible(o, scope))
            .map(|o| state.order_view(o))
            .transpose()
    }

    fn list(&self, scope: OrderScope, page: i64, limit: i64) -> Result<ListResult, DomainError> {
        let state = self.state();
        let mut visible: Vec<&OrderRecord> = state
            .orders
            .iter()
            .filter(|o| state.visible(o, scope))
            .collect();
        visible.sort_by(|a, b| b.placed_at.cmp(&a.placed_at));
        let total = visible.len() as i64;
        let items = visible
            .into_iter()
            .skip(((page - 1) * limit) as usize)
            .take(limit as usize)
            .map(|o| {
                state.order_view(o).map(|mut view| {
                    view.items.clear();
                    view
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ListResult { items, total })
    }

    fn set_payment_status(
        &self,
        id: Uuid,
        status: PaymentStatus,
    ) -> Result<Option<OrderView>, DomainError> {
        let mut state = self.state();
        let Some(order) = state.orders.iter_mut().find(|o| o.id == id) else {
            return Ok(None);
        };
        order.payment_status = status;
        let order = order.clone();
        state.order_view(&order).map(Some)
    }

    fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut state = self.state();
        let before = state.orders.len();
        state.orders.retain(|o| o.id != id);
        state.order_items.retain(|i| i.order_id != id);
        Ok(state.orders.len() != before)
    }
}

impl WalletRepository for InMemoryStore {
    fn find_by_user(&self, user_id: i64) -> Result<Option<WalletView>, DomainError> {
        Ok(self
            .state()
            .wallets
            .iter()
            .find(|w| w.user_id == user_id)
            .cloned())
    }

    fn create(&self, user_id: i64, currency: &str) -> Result<WalletView, DomainError> {
        let mut state = self.state();
        if state.wallets.iter().any(|w| w.user_id == user_id) {
            return Err(DomainError::Conflict(
                "a wallet already exists for this user".to_string(),
            ));
        }
        let wallet = WalletView {
            id: Uuid::new_v4(),
            user_id,
            balance: BigDecimal::from(0),
            currency: currency.to_string(),
            created_at: Utc::now(),
        };
        state.wallets.push(wallet.clone());
        Ok(wallet)
    }

    fn transactions(&self, user_id: i64) -> Result<Vec<WalletTransactionView>, DomainError> {
        let state = self.state();
        let Some(wallet) = state.wallets.iter().find(|w| w.user_id == user_id) else {
            return Ok(vec![]);
        };
        let mut entries: Vec<WalletTransactionView> = state
            .wallet_transactions
            .iter()
            .filter(|t| t.wallet_id == wallet.id)
            .cloned()
            .collect();
        entries.reverse();
        Ok(entries)
    }

    fn find_transaction(
        &self,
        user_id: i64,
        id: Uuid,
    ) -> Result<Option<WalletTransactionView>, DomainError> {
        Ok(self
            .transactions(user_id)?
            .into_iter()
            .find(|t| t.id == id))
    }

    fn ledger_balance(&self, wallet_id: Uuid) -> Result<BigDecimal, DomainError> {
        let state = self.state();
        Ok(ledger_sum(
            state
                .wallet_transactions
                .iter()
                .filter(|t| t.wallet_id == wallet_id)
                .map(|t| (t.transaction_type, &t.amount)),
        ))
    }
}

impl PaymentRepository for InMemoryStore {
    fn record(&self, log: NewPaymentLog) -> Result<PaymentLogView, DomainError> {
        let mut state = self.state();
        if state
            .payment_logs
            .iter()
            .any(|l| l.reference == log.reference)
        {
            return Err(DomainError::Conflict(format!(
                "payment reference {} already recorded",
                log.reference
            )));
        }
        let view = PaymentLogView {
            id: Uuid::new_v4(),
            user_id: log.user_id,
            gateway: log.gateway,
            reference: log.reference,
            amount: log.amount,
            status: PaymentLogStatus::Pending,
            created_at: Utc::now(),
        };
        state.payment_logs.push(view.clone());
        Ok(view)
    }

    fn find_by_reference(&self, reference: &str) -> Result<Option<PaymentLogView>, DomainError> {
        Ok(self
            .state()
            .payment_logs
            .iter()
            .find(|l| l.reference == reference)
            .cloned())
    }

    fn list_for_user(&self, user_id: i64) -> Result<Vec<PaymentLogView>, DomainError> {
        let mut logs: Vec<PaymentLogView> = self
            .state()
            .payment_logs
            .iter()
            .filter(|l| l.user_id == user_id)
            .cloned()
            .collect();
        logs.reverse();
        Ok(logs)
    }

    fn find_for_user(
        &self,
        user_id: i64,
        id: Uuid,
    ) -> Result<Option<PaymentLogView>, DomainError> {
        Ok(self
            .state()
            .payment_logs
            .iter()
            .find(|l| l.user_id == user_id && l.id == id)
            .cloned())
    }

    fn mark_failed(&self, reference: &str) -> Result<bool, DomainError> {
        let mut state = self.state();
        let Some(log) = state
            .payment_logs
            .iter_mut()
            .find(|l| l.reference == reference && l.status != PaymentLogStatus::Success)
        else {
            return Ok(false);
        };
        log.status = PaymentLogStatus::Failed;
        Ok(true)
    }

    fn settle(
        &self,
        reference: &str,
        amount: &BigDecimal,
        currency: &str,
        description: &str,
    ) -> Result<Settlement, DomainError> {
        self.transaction(|state| {
            let log_index = state
                .payment_logs
                .iter()
                .position(|l| l.reference == reference)
                .ok_or_else(|| DomainError::NotFound("Payment reference not found".to_string()))?;
            let user_id = state.payment_logs[log_index].user_id;

            if let Some(existing) = state
                .wallet_transactions
                .iter()
                .find(|t| t.reference == reference)
            {
                let wallet_id = existing.wallet_id;
                let wallet = state
                    .wallets
                    .iter()
                    .find(|w| w.id == wallet_id)
                    .cloned()
                    .ok_or_else(|| DomainError::not_found("Wallet"))?;
                return Ok(Settlement::AlreadySettled(wallet));
            }

            let log = &mut state.payment_logs[log_index];
            log.status = PaymentLogStatus::Success;
            log.amount = amount.clone();

            if !state.wallets.iter().any(|w| w.user_id == user_id) {
                state.wallets.push(WalletView {
                    id: Uuid::new_v4(),
                    user_id,
                    balance: BigDecimal::from(0),
                    currency: currency.to_string(),
                    created_at: Utc::now(),
                });
            }
            let wallet = state
                .wallets
                .iter_mut()
                .find(|w| w.user_id == user_id)
                .ok_or_else(|| DomainError::not_found("Wallet"))?;
            wallet.balance = wallet.balance.clone() + amount.clone();
            let wallet = wallet.clone();

            state.wallet_transactions.push(WalletTransactionView {
                id: Uuid::new_v4(),
                wallet_id: wallet.id,
                transaction_type: TransactionType::Credit,
                amount: amount.clone(),
                reference: reference.to_string(),
                description: description.to_string(),
                created_at: Utc::now(),
            });
            Ok(Settlement::Credited(wallet))
        })
    }
}

#[derive(Default)]
struct GatewayScript {
    next_reference: Option<String>,
    failing: bool,
    initialized: Vec<i64>,
    outcomes: Vec<(String, bool, String, i64)>,
    verify_calls: usize,
}

/// Scriptable payment gateway.
#[derive(Default)]
pub struct FakeGateway {
    script: Mutex<GatewayScript>,
}

impl FakeGateway {
    pub fn next_reference(&self, reference: &str) {
        self.script.lock().unwrap().next_reference = Some(reference.to_string());
    }

    pub fn fail_requests(&self) {
        self.script.lock().unwrap().failing = true;
    }

    pub fn confirm(&self, reference: &str, amount_minor: i64) {
        self.script.lock().unwrap().outcomes.push((
            reference.to_string(),
            true,
            "success".to_string(),
            amount_minor,
        ));
    }

    pub fn decline(&self, reference: &str, status: &str) {
        self.script.lock().unwrap().outcomes.push((
            reference.to_string(),
            false,
            status.to_string(),
            0,
        ));
    }

    pub fn initialized_amounts(&self) -> Vec<i64> {
        self.script.lock().unwrap().initialized.clone()
    }

    pub fn verify_calls(&self) -> usize {
        self.script.lock().unwrap().verify_calls
    }
}

#[async_trait]
impl PaymentGateway for FakeGateway {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn initialize(&self, request: ChargeRequest) -> Result<InitializedCharge, DomainError> {
        let mut script = self.script.lock().unwrap();
        if script.failing {
            return Err(DomainError::Gateway("connection refused".to_string()));
        }
        script.initialized.push(request.amount_minor);
        let reference = script
            .next_reference
            .take()
            .unwrap_or_else(|| Uuid::new_v4().simple().to_string());
        Ok(InitializedCharge {
            authorization_url: format!("https://checkout.example/{reference}"),
            access_code: "access".to_string(),
            payload: json!({ "reference": reference }),
            reference,
        })
    }

    async fn verify(&self, reference: &str) -> Result<ChargeVerification, DomainError> {
        let mut script = self.script.lock().unwrap();
        if script.failing {
            return Err(DomainError::Gateway("connection refused".to_string()));
        }
        script.verify_calls += 1;
        let (successful, status, amount_minor) = script
            .outcomes
            .iter()
            .find(|(r, ..)| r == reference)
            .map(|(_, ok, status, amount)| (*ok, status.clone(), *amount))
            .unwrap_or((false, "abandoned".to_string(), 0));
        Ok(ChargeVerification {
            reference: reference.to_string(),
            successful,
            gateway_status: status,
            amount_minor,
        })
    }
}
