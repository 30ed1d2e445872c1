use std::sync::Arc;

use uuid::Uuid;

use crate::domain::caller::Caller;
use crate::domain::customer::{CustomerProfile, CustomerView};
use crate::domain::errors::DomainError;
use crate::domain::ports::CustomerRepository;

pub struct CustomerService {
    repo: Arc<dyn CustomerRepository>,
}

impl CustomerService {
    pub fn new(repo: Arc<dyn CustomerRepository>) -> Self {
        Self { repo }
    }

    /// The caller's own profile, created on first access.
    pub fn me(&self, caller: &Caller) -> Result<CustomerView, DomainError> {
        self.repo.get_or_create(caller.user_id)
    }

    pub fn update_me(
        &self,
        caller: &Caller,
        profile: CustomerProfile,
    ) -> Result<CustomerView, DomainError> {
        profile.validate()?;
        let customer = self.repo.get_or_create(caller.user_id)?;
        self.repo
            .update(customer.id, profile)?
            .ok_or_else(|| DomainError::not_found("Customer"))
    }

    pub fn create(
        &self,
        caller: &Caller,
        profile: CustomerProfile,
    ) -> Result<CustomerView, DomainError> {
        profile.validate()?;
        let customer = self.repo.create(caller.user_id, profile)?;
        log::info!("Created customer {} for user {}", customer.id, caller.user_id);
        Ok(customer)
    }

    pub fn get(&self, caller: &Caller, id: Uuid) -> Result<CustomerView, DomainError> {
        let customer = self
            .repo
            .find(id)?
            .ok_or_else(|| DomainError::not_found("Customer"))?;
        if !caller.is_staff && customer.user_id != caller.user_id {
            return Err(DomainError::not_found("Customer"));
        }
        Ok(customer)
    }

    pub fn update(
        &self,
        caller: &Caller,
        id: Uuid,
        profile: CustomerProfile,
    ) -> Result<CustomerView, DomainError> {
        profile.validate()?;
        self.get(caller, id)?;
        self.repo
            .update(id, profile)?
            .ok_or_else(|| DomainError::not_found("Customer"))
    }
}
