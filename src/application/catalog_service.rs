use std::sync::Arc;

use uuid::Uuid;

use crate::domain::catalog::{
    validate_image, validate_title, CollectionView, ProductChanges, ProductImageView,
    ProductInput, ProductPage, ProductView,
};
use crate::domain::errors::DomainError;
use crate::domain::ports::CatalogRepository;

use super::Pagination;

pub struct CatalogService {
    repo: Arc<dyn CatalogRepository>,
}

impl CatalogService {
    pub fn new(repo: Arc<dyn CatalogRepository>) -> Self {
        Self { repo }
    }

    pub fn list_collections(&self) -> Result<Vec<CollectionView>, DomainError> {
        self.repo.list_collections()
    }

    pub fn get_collection(&self, id: Uuid) -> Result<CollectionView, DomainError> {
        self.repo
            .find_collection(id)?
            .ok_or_else(|| DomainError::not_found("Collection"))
    }

    pub fn create_collection(&self, title: &str) -> Result<CollectionView, DomainError> {
        validate_title(title)?;
        let collection = self.repo.create_collection(title.trim())?;
        log::info!("Created collection {} ({})", collection.id, collection.title);
        Ok(collection)
    }

    pub fn rename_collection(&self, id: Uuid, title: &str) -> Result<CollectionView, DomainError> {
        validate_title(title)?;
        self.repo
            .rename_collection(id, title.trim())?
            .ok_or_else(|| DomainError::not_found("Collection"))
    }

    pub fn delete_collection(&self, id: Uuid) -> Result<(), DomainError> {
        if !self.repo.delete_collection(id)? {
            return Err(DomainError::not_found("Collection"));
        }
        log::info!("Deleted collection {id}");
        Ok(())
    }

    pub fn list_products(&self, pagination: Pagination) -> Result<ProductPage, DomainError> {
        self.repo.list_products(pagination.page, pagination.limit)
    }

    pub fn get_product(&self, id: Uuid) -> Result<ProductView, DomainError> {
        self.repo
            .find_product(id)?
            .ok_or_else(|| DomainError::not_found("Product"))
    }

    pub fn create_product(&self, input: ProductInput) -> Result<ProductView, DomainError> {
        let changes = ProductChanges::from(input.clone());
        changes.validate()?;
        self.ensure_collection(input.collection_id)?;
        let product = self.repo.create_product(input)?;
        log::info!("Created product {} ({})", product.id, product.title);
        Ok(product)
    }

    pub fn replace_product(&self, id: Uuid, input: ProductInput) -> Result<ProductView, DomainError> {
        self.patch_product(id, ProductChanges::from(input))
    }

    pub fn patch_product(&self, id: Uuid, changes: ProductChanges) -> Result<ProductView, DomainError> {
        changes.validate()?;
        if changes.is_empty() {
            return self.get_product(id);
        }
        if let Some(collection_id) = changes.collection_id {
            self.ensure_collection(collection_id)?;
        }
        self.repo
            .update_product(id, changes)?
            .ok_or_else(|| DomainError::not_found("Product"))
    }

    pub fn delete_product(&self, id: Uuid) -> Result<(), DomainError> {
        if !self.repo.delete_product(id)? {
            return Err(DomainError::not_found("Product"));
        }
        log::info!("Deleted product {id}");
        Ok(())
    }

    pub fn list_images(&self, product_id: Uuid) -> Result<Vec<ProductImageView>, DomainError> {
        self.ensure_product(product_id)?;
        self.repo.list_images(product_id)
    }

    pub fn get_image(&self, product_id: Uuid, image_id: Uuid) -> Result<ProductImageView, DomainError> {
        self.ensure_product(product_id)?;
        self.repo
            .find_image(product_id, image_id)?
            .ok_or_else(|| DomainError::not_found("Product image"))
    }

    pub fn add_image(&self, product_id: Uuid, image: &str) -> Result<ProductImageView, DomainError> {
        validate_image(image)?;
        self.ensure_product(product_id)?;
        self.repo.add_image(product_id, image.trim())
    }

    pub fn update_image(
        &self,
        product_id: Uuid,
        image_id: Uuid,
        image: &str,
    ) -> Result<ProductImageView, DomainError> {
        validate_image(image)?;
        self.ensure_product(product_id)?;
        self.repo
            .update_image(product_id, image_id, image.trim())?
            .ok_or_else(|| DomainError::not_found("Product image"))
    }

    pub fn delete_image(&self, product_id: Uuid, image_id: Uuid) -> Result<(), DomainError> {
        self.ensure_product(product_id)?;
        if !self.repo.delete_image(product_id, image_id)? {
            return Err(DomainError::not_found("Product image"));
        }
        Ok(())
    }

    fn ensure_product(&self, id: Uuid) -> Result<(), DomainError> {
        self.get_product(id).map(|_| ())
    }

    fn ensure_collection(&self, id: Uuid) -> Result<(), DomainError> {
        match self.repo.find_collection(id)? {
            Some(_) => Ok(()),
            None => Err(DomainError::invalid(format!("collection {id} does not exist"))),
        }
    }
}
