use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::catalog::ProductSummary;
use super::errors::DomainError;

#[derive(Debug, Clone)]
pub struct CartItemView {
    pub id: Uuid,
    pub cart_id: Uuid,
    pub product: ProductSummary,
    pub quantity: i32,
}

impl CartItemView {
    pub fn total_price(&self) -> BigDecimal {
        self.product.unit_price.clone() * BigDecimal::from(self.quantity)
    }
}

#[derive(Debug, Clone)]
pub struct CartView {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub items: Vec<CartItemView>,
}

impl CartView {
    pub fn total_price(&self) -> BigDecimal {
        self.items
            .iter()
            .fold(BigDecimal::from(0), |acc, item| acc + item.total_price())
    }
}

pub fn validate_quantity(quantity: i32) -> Result<(), DomainError> {
    if quantity <= 0 {
        return Err(DomainError::invalid("quantity must be a positive integer"));
    }
    Ok(())
}

/// Quantity of a cart line after adding `added` units to `existing`.
pub fn merge_quantity(existing: i32, added: i32) -> Result<i32, DomainError> {
    existing
        .checked_add(added)
        .ok_or_else(|| DomainError::invalid("quantity is too large"))
}
