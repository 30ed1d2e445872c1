use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::errors::DomainError;
use super::money::validate_amount;

pub const MAX_TITLE_LEN: usize = 255;

#[derive(Debug, Clone)]
pub struct CollectionView {
    pub id: Uuid,
    pub title: String,
    pub products_count: i64,
}

#[derive(Debug, Clone)]
pub struct ProductImageView {
    pub id: Uuid,
    pub product_id: Uuid,
    pub image: String,
}

#[derive(Debug, Clone)]
pub struct ProductView {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub unit_price: BigDecimal,
    pub inventory: i32,
    pub collection_id: Uuid,
    pub collection_title: String,
    pub images: Vec<ProductImageView>,
    pub created_at: DateTime<Utc>,
}

/// The slice of a product shown inside cart and order lines.
#[derive(Debug, Clone)]
pub struct ProductSummary {
    pub id: Uuid,
    pub title: String,
    pub unit_price: BigDecimal,
}

#[derive(Debug, Clone)]
pub struct ProductInput {
    pub title: String,
    pub description: String,
    pub unit_price: BigDecimal,
    pub inventory: i32,
    pub collection_id: Uuid,
}

/// Partial product update; `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct ProductChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub unit_price: Option<BigDecimal>,
    pub inventory: Option<i32>,
    pub collection_id: Option<Uuid>,
}

impl ProductChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.unit_price.is_none()
            && self.inventory.is_none()
            && self.collection_id.is_none()
    }
}

impl From<ProductInput> for ProductChanges {
    fn from(input: ProductInput) -> Self {
        ProductChanges {
            title: Some(input.title),
            description: Some(input.description),
            unit_price: Some(input.unit_price),
            inventory: Some(input.inventory),
            collection_id: Some(input.collection_id),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProductPage {
    pub items: Vec<ProductView>,
    pub total: i64,
}

pub fn validate_title(title: &str) -> Result<(), DomainError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(DomainError::invalid("title must not be empty"));
    }
    if trimmed.chars().count() > MAX_TITLE_LEN {
        return Err(DomainError::invalid(format!(
            "title must be at most {MAX_TITLE_LEN} characters"
        )));
    }
    Ok(())
}

pub fn validate_inventory(inventory: i32) -> Result<(), DomainError> {
    if inventory < 0 {
        return Err(DomainError::invalid("inventory must not be negative"));
    }
    Ok(())
}

pub fn validate_image(image: &str) -> Result<(), DomainError> {
    if image.trim().is_empty() {
        return Err(DomainError::invalid("image must not be empty"));
    }
    if image.len() > MAX_TITLE_LEN {
        return Err(DomainError::invalid("image path is too long"));
    }
    Ok(())
}

impl ProductChanges {
    pub fn validate(&self) -> Result<(), DomainError> {
        if let Some(title) = &self.title {
            validate_title(title)?;
        }
        if let Some(price) = &self.unit_price {
            validate_amount("unit_price", price)?;
        }
        if let Some(inventory) = self.inventory {
            validate_inventory(inventory)?;
        }
        Ok(())
    }
}
