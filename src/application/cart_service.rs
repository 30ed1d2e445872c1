use std::sync::Arc;

use uuid::Uuid;

use crate::domain::cart::{validate_quantity, CartItemView, CartView};
use crate::domain::errors::DomainError;
use crate::domain::ports::CartRepository;

pub struct CartService {
    repo: Arc<dyn CartRepository>,
}

impl CartService {
    pub fn new(repo: Arc<dyn CartRepository>) -> Self {
        Self { repo }
    }

    pub fn create_cart(&self) -> Result<CartView, DomainError> {
        let cart = self.repo.create()?;
        log::debug!("Created cart {}", cart.id);
        Ok(cart)
    }

    pub fn get_cart(&self, id: Uuid) -> Result<CartView, DomainError> {
        self.repo
            .find(id)?
            .ok_or_else(|| DomainError::not_found("Cart"))
    }

    pub fn delete_cart(&self, id: Uuid) -> Result<(), DomainError> {
        if !self.repo.delete(id)? {
            return Err(DomainError::not_found("Cart"));
        }
        Ok(())
    }

    pub fn list_items(&self, cart_id: Uuid) -> Result<Vec<CartItemView>, DomainError> {
        Ok(self.get_cart(cart_id)?.items)
    }

    pub fn get_item(&self, cart_id: Uuid, item_id: Uuid) -> Result<CartItemView, DomainError> {
        self.list_items(cart_id)?
            .into_iter()
            .find(|item| item.id == item_id)
            .ok_or_else(|| DomainError::not_found("Cart item"))
    }

    pub fn add_item(
        &self,
        cart_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<CartItemView, DomainError> {
        validate_quantity(quantity)?;
        self.repo.add_item(cart_id, product_id, quantity)
    }

    pub fn update_quantity(
        &self,
        cart_id: Uuid,
        item_id: Uuid,
        quantity: i32,
    ) -> Result<CartItemView, DomainError> {
        validate_quantity(quantity)?;
        self.repo
            .set_quantity(cart_id, item_id, quantity)?
            .ok_or_else(|| DomainError::not_found("Cart item"))
    }

    pub fn remove_item(&self, cart_id: Uuid, item_id: Uuid) -> Result<(), DomainError> {
        if !self.repo.remove_item(cart_id, item_id)? {
            return Err(DomainError::not_found("Cart item"));
        }
        Ok(())
    }
}
