use std::sync::Arc;

use uuid::Uuid;

use crate::domain::caller::Caller;
use crate::domain::errors::DomainError;
use crate::domain::order::{ListResult, OrderScope, OrderView, PaymentStatus};
use crate::domain::ports::OrderRepository;

use super::Pagination;

pub struct OrderService {
    repo: Arc<dyn OrderRepository>,
}

fn scope_for(caller: &Caller) -> OrderScope {
    if caller.is_staff {
        OrderScope::All
    } else {
        OrderScope::User(caller.user_id)
    }
}

impl OrderService {
    pub fn new(repo: Arc<dyn OrderRepository>) -> Self {
        Self { repo }
    }

    pub fn place_order(&self, caller: &Caller, cart_id: Uuid) -> Result<OrderView, DomainError> {
        let order = self.repo.place(cart_id, caller.user_id)?;
        log::info!(
            "Placed order {} from cart {} for user {} ({} items, total {})",
            order.id,
            cart_id,
            caller.user_id,
            order.items.len(),
            order.total()
        );
        Ok(order)
    }

    pub fn get_order(&self, caller: &Caller, id: Uuid) -> Result<OrderView, DomainError> {
        self.repo
            .find_by_id(id, scope_for(caller))?
            .ok_or_else(|| DomainError::not_found("Order"))
    }

    pub fn list_orders(
        &self,
        caller: &Caller,
        pagination: Pagination,
    ) -> Result<ListResult, DomainError> {
        self.repo
            .list(scope_for(caller), pagination.page, pagination.limit)
    }

    pub fn update_payment_status(
        &self,
        caller: &Caller,
        id: Uuid,
        status: PaymentStatus,
    ) -> Result<OrderView, DomainError> {
        require_staff(caller, "update orders")?;
        let order = self
            .repo
            .set_payment_status(id, status)?
            .ok_or_else(|| DomainError::not_found("Order"))?;
        log::info!("Order {id} payment status set to {status}");
        Ok(order)
    }

    pub fn delete_order(&self, caller: &Caller, id: Uuid) -> Result<(), DomainError> {
        require_staff(caller, "delete orders")?;
        if !self.repo.delete(id)? {
            return Err(DomainError::not_found("Order"));
        }
        log::info!("Deleted order {id}");
        Ok(())
    }
}

fn require_staff(caller: &Caller, action: &str) -> Result<(), DomainError> {
    if caller.is_staff {
        Ok(())
    } else {
        Err(DomainError::Forbidden(format!("only staff may {action}")))
    }
}
