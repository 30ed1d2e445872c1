use std::sync::Arc;

use uuid::Uuid;

use crate::domain::caller::Caller;
use crate::domain::errors::DomainError;
use crate::domain::ports::WalletRepository;
use crate::domain::wallet::{validate_currency, WalletAudit, WalletTransactionView, WalletView};

pub struct WalletService {
    repo: Arc<dyn WalletRepository>,
    default_currency: String,
}

impl WalletService {
    pub fn new(repo: Arc<dyn WalletRepository>, default_currency: impl Into<String>) -> Self {
        Self {
            repo,
            default_currency: default_currency.into(),
        }
    }

    pub fn get_wallet(&self, caller: &Caller) -> Result<WalletView, DomainError> {
        self.repo
            .find_by_user(caller.user_id)?
            .ok_or_else(|| DomainError::not_found("Wallet"))
    }

    pub fn create_wallet(
        &self,
        caller: &Caller,
        currency: Option<&str>,
    ) -> Result<WalletView, DomainError> {
        let currency = currency.unwrap_or(&self.default_currency);
        validate_currency(currency)?;
        let wallet = self.repo.create(caller.user_id, currency)?;
        log::info!("Opened {} wallet {} for user {}", currency, wallet.id, caller.user_id);
        Ok(wallet)
    }

    pub fn transactions(&self, caller: &Caller) -> Result<Vec<WalletTransactionView>, DomainError> {
        self.repo.transactions(caller.user_id)
    }

    pub fn transaction(
        &self,
        caller: &Caller,
        id: Uuid,
    ) -> Result<WalletTransactionView, DomainError> {
        self.repo
            .find_transaction(caller.user_id, id)?
            .ok_or_else(|| DomainError::not_found("Wallet transaction"))
    }

    /// Recomputes the balance from the ledger and reports any drift.
    pub fn audit(&self, caller: &Caller) -> Result<WalletAudit, DomainError> {
        let wallet = self.get_wallet(caller)?;
        let ledger_balance = self.repo.ledger_balance(wallet.id)?;
        let audit = WalletAudit {
            wallet_id: wallet.id,
            balance: wallet.balance,
            ledger_balance,
        };
        if !audit.is_consistent() {
            log::error!(
                "Wallet {} balance {} disagrees with ledger {}",
                audit.wallet_id,
                audit.balance,
                audit.ledger_balance
            );
        }
        Ok(audit)
    }
}
