use std::fmt;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::catalog::ProductSummary;
use super::errors::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentStatus {
    Pending,
    Complete,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PaymentStatus::Pending => "PENDING",
            PaymentStatus::Complete => "COMPLETE",
            PaymentStatus::Failed => "FAILED",
        }
    }
}

impl FromStr for PaymentStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "PENDING" | "P" => Ok(PaymentStatus::Pending),
            "COMPLETE" | "C" => Ok(PaymentStatus::Complete),
            "FAILED" | "F" => Ok(PaymentStatus::Failed),
            _ => Err(DomainError::invalid(format!(
                "payment_status must be PENDING, COMPLETE or FAILED; got '{s}'"
            ))),
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A cart line as read at checkout time, with the product's current state.
#[derive(Debug, Clone)]
pub struct CheckoutLine {
    pub product_id: Uuid,
    pub product_title: String,
    pub quantity: i32,
    pub unit_price: BigDecimal,
    pub inventory: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderItemInput {
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price: BigDecimal,
}

/// Turns the cart lines into order items, snapshotting each product's price.
///
/// Fails with a conflict when any line asks for more than the product's stock;
/// the caller then aborts the whole checkout.
pub fn snapshot_items(lines: &[CheckoutLine]) -> Result<Vec<OrderItemInput>, DomainError> {
    lines
        .iter()
        .map(|line| {
            if line.quantity > line.inventory {
                return Err(insufficient_inventory(&line.product_title));
            }
            Ok(OrderItemInput {
                product_id: line.product_id,
                quantity: line.quantity,
                unit_price: line.unit_price.clone(),
            })
        })
        .collect()
}

pub fn insufficient_inventory(product_title: &str) -> DomainError {
    DomainError::Conflict(format!("insufficient inventory for '{product_title}'"))
}

#[derive(Debug, Clone)]
pub struct OrderItemView {
    pub id: Uuid,
    pub product: ProductSummary,
    pub quantity: i32,
    pub unit_price: BigDecimal,
}

impl OrderItemView {
    pub fn line_total(&self) -> BigDecimal {
        self.unit_price.clone() * BigDecimal::from(self.quantity)
    }
}

#[derive(Debug, Clone)]
pub struct OrderView {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub payment_status: PaymentStatus,
    pub placed_at: DateTime<Utc>,
    pub items: Vec<OrderItemView>,
}

impl OrderView {
    pub fn total(&self) -> BigDecimal {
        self.items
            .iter()
            .fold(BigDecimal::from(0), |acc, item| acc + item.line_total())
    }
}

/// Which orders a caller may see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderScope {
    All,
    User(i64),
}

#[derive(Debug, Clone)]
pub struct ListResult {
    pub items: Vec<OrderView>,
    pub total: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(title: &str, quantity: i32, price: i64, inventory: i32) -> CheckoutLine {
        CheckoutLine {
            product_id: Uuid::new_v4(),
            product_title: title.to_string(),
            quantity,
            unit_price: BigDecimal::from(price),
            inventory,
        }
    }

    #[test]
    fn snapshot_copies_quantity_and_current_price() {
        let lines = vec![line("A", 2, 10, 5), line("B", 1, 5, 1)];
        let items = snapshot_items(&lines).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].quantity, 2);
        assert_eq!(items[0].unit_price, BigDecimal::from(10));
        assert_eq!(items[1].product_id, lines[1].product_id);
    }

    #[test]
    fn snapshot_rejects_lines_exceeding_stock() {
        let err = snapshot_items(&[line("Kettle", 3, 10, 2)]).unwrap_err();
        assert!(matches!(err, DomainError::Conflict(msg) if msg.contains("Kettle")));
    }

    #[test]
    fn payment_status_round_trips_through_storage_codes() {
        for status in [
            PaymentStatus::Pending,
            PaymentStatus::Complete,
            PaymentStatus::Failed,
        ] {
            assert_eq!(status.as_str().parse::<PaymentStatus>().unwrap(), status);
        }
        assert_eq!("c".parse::<PaymentStatus>().unwrap(), PaymentStatus::Complete);
        assert!("shipped".parse::<PaymentStatus>().is_err());
    }

    #[test]
    fn order_total_is_sum_of_line_totals() {
        let product = ProductSummary {
            id: Uuid::new_v4(),
            title: "A".to_string(),
            unit_price: BigDecimal::from(10),
        };
        let order = OrderView {
            id: Uuid::new_v4(),
            customer_id: Uuid::new_v4(),
            payment_status: PaymentStatus::Pending,
            placed_at: Utc::now(),
            items: vec![
                OrderItemView {
                    id: Uuid::new_v4(),
                    product: product.clone(),
                    quantity: 2,
                    unit_price: BigDecimal::from(10),
                },
                OrderItemView {
                    id: Uuid::new_v4(),
                    product,
                    quantity: 1,
                    unit_price: BigDecimal::from(5),
                },
            ],
        };
        assert_eq!(order.total(), BigDecimal::from(25));
    }
}
