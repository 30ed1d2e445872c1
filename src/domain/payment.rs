use std::fmt;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

use super::errors::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentLogStatus {
    Pending,
    Success,
    Failed,
}

impl PaymentLogStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PaymentLogStatus::Pending => "pending",
            PaymentLogStatus::Success => "success",
            PaymentLogStatus::Failed => "failed",
        }
    }
}

impl FromStr for PaymentLogStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(PaymentLogStatus::Pending),
            "success" => Ok(PaymentLogStatus::Success),
            "failed" => Ok(PaymentLogStatus::Failed),
            other => Err(DomainError::Internal(format!(
                "unknown payment status '{other}'"
            ))),
        }
    }
}

impl fmt::Display for PaymentLogStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct PaymentLogView {
    pub id: Uuid,
    pub user_id: i64,
    pub gateway: String,
    pub reference: String,
    pub amount: BigDecimal,
    pub status: PaymentLogStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewPaymentLog {
    pub user_id: i64,
    pub gateway: String,
    pub reference: String,
    pub amount: BigDecimal,
}

/// What the payment gateway is asked to charge. Amounts are in minor units.
#[derive(Debug, Clone)]
pub struct ChargeRequest {
    pub email: String,
    pub amount_minor: i64,
    pub user_id: i64,
}

#[derive(Debug, Clone)]
pub struct InitializedCharge {
    pub reference: String,
    pub authorization_url: String,
    pub access_code: String,
    /// The gateway's `data` object, passed through to the caller.
    pub payload: Value,
}

#[derive(Debug, Clone)]
pub struct ChargeVerification {
    pub reference: String,
    pub successful: bool,
    pub gateway_status: String,
    pub amount_minor: i64,
}

#[derive(Debug, Clone)]
pub enum VerificationOutcome {
    Settled {
        reference: String,
        amount: BigDecimal,
        balance: BigDecimal,
        currency: String,
        already_settled: bool,
    },
    Failed {
        reference: String,
        gateway_status: String,
    },
}

pub fn validate_email(email: &str) -> Result<(), DomainError> {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(DomainError::invalid("email must be a valid address")),
    }
}

pub fn validate_reference(reference: &str) -> Result<(), DomainError> {
    if reference.trim().is_empty() {
        return Err(DomainError::invalid("reference is required"));
    }
    if reference.len() > 100 {
        return Err(DomainError::invalid("reference is too long"));
    }
    Ok(())
}
