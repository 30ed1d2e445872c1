use std::fmt;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::errors::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionType {
    Credit,
    Debit,
}

impl TransactionType {
    pub fn as_str(self) -> &'static str {
        match self {
            TransactionType::Credit => "CREDIT",
            TransactionType::Debit => "DEBIT",
        }
    }

    /// Applies the ledger sign: credits add to the balance, debits subtract.
    pub fn signed(self, amount: &BigDecimal) -> BigDecimal {
        match self {
            TransactionType::Credit => amount.clone(),
            TransactionType::Debit => -amount.clone(),
        }
    }
}

impl FromStr for TransactionType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CREDIT" => Ok(TransactionType::Credit),
            "DEBIT" => Ok(TransactionType::Debit),
            other => Err(DomainError::Internal(format!(
                "unknown transaction type '{other}'"
            ))),
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct WalletView {
    pub id: Uuid,
    pub user_id: i64,
    pub balance: BigDecimal,
    pub currency: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct WalletTransactionView {
    pub id: Uuid,
    pub wallet_id: Uuid,
    pub transaction_type: TransactionType,
    pub amount: BigDecimal,
    pub reference: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

/// Outcome of crediting a wallet for a gateway reference.
#[derive(Debug, Clone)]
pub enum Settlement {
    Credited(WalletView),
    /// A ledger entry already exists for the reference; nothing was written.
    AlreadySettled(WalletView),
}

impl Settlement {
    pub fn wallet(&self) -> &WalletView {
        match self {
            Settlement::Credited(wallet) | Settlement::AlreadySettled(wallet) => wallet,
        }
    }
}

#[derive(Debug, Clone)]
pub struct WalletAudit {
    pub wallet_id: Uuid,
    pub balance: BigDecimal,
    pub ledger_balance: BigDecimal,
}

impl WalletAudit {
    pub fn is_consistent(&self) -> bool {
        self.balance == self.ledger_balance
    }
}

/// Recomputes a balance from ledger entries.
pub fn ledger_sum<'a>(
    entries: impl IntoIterator<Item = (TransactionType, &'a BigDecimal)>,
) -> BigDecimal {
    entries
        .into_iter()
        .fold(BigDecimal::from(0), |acc, (kind, amount)| acc + kind.signed(amount))
}

pub fn validate_currency(currency: &str) -> Result<(), DomainError> {
    if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_uppercase()) {
        return Err(DomainError::invalid(format!(
            "currency must be a three-letter ISO code, got '{currency}'"
        )));
    }
    Ok(())
}
