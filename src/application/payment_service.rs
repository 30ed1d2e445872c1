use std::sync::Arc;

use bigdecimal::BigDecimal;
use uuid::Uuid;

use crate::domain::caller::Caller;
use crate::domain::errors::DomainError;
use crate::domain::money::{
    format_money, from_minor_units, parse_amount, to_minor_units, validate_amount,
};
use crate::domain::payment::{
    validate_email, validate_reference, ChargeRequest, InitializedCharge, NewPaymentLog,
    PaymentLogStatus, PaymentLogView, VerificationOutcome,
};
use crate::domain::ports::{PaymentGateway, PaymentRepository};
use crate::domain::wallet::Settlement;

/// Drives a payment attempt from initialization through verification and,
/// on success, the wallet credit.
pub struct PaymentService {
    repo: Arc<dyn PaymentRepository>,
    gateway: Arc<dyn PaymentGateway>,
    currency: String,
}

impl PaymentService {
    pub fn new(
        repo: Arc<dyn PaymentRepository>,
        gateway: Arc<dyn PaymentGateway>,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            repo,
            gateway,
            currency: currency.into(),
        }
    }

    /// Starts a charge with the gateway and records it as pending.
    pub async fn initialize(
        &self,
        caller: &Caller,
        amount: &str,
        email: &str,
    ) -> Result<InitializedCharge, DomainError> {
        let amount = parse_amount("amount", amount)?;
        validate_email(email)?;

        let charge = self
            .gateway
            .initialize(ChargeRequest {
                email: email.trim().to_string(),
                amount_minor: to_minor_units(&amount)?,
                user_id: caller.user_id,
            })
            .await?;

        let entry = NewPaymentLog {
            user_id: caller.user_id,
            gateway: self.gateway.name().to_string(),
            reference: charge.reference.clone(),
            amount: amount.clone(),
        };
        self.blocking(move |repo| repo.record(entry)).await?;

        log::info!(
            "Initialized {} payment {} of {} for user {}",
            self.gateway.name(),
            charge.reference,
            format_money(&amount),
            caller.user_id
        );
        Ok(charge)
    }

    /// Confirms a charge with the gateway and settles it into the wallet.
    ///
    /// Unknown references never reach the gateway. References that were
    /// already settled are reported as such without crediting again.
    pub async fn verify(
        &self,
        caller: &Caller,
        reference: &str,
    ) -> Result<VerificationOutcome, DomainError> {
        validate_reference(reference)?;
        let reference = reference.trim().to_string();

        let lookup = reference.clone();
        let payment = self
            .blocking(move |repo| repo.find_by_reference(&lookup))
            .await?
            .filter(|payment| payment.user_id == caller.user_id)
            .ok_or_else(|| DomainError::NotFound("Payment reference not found".to_string()))?;

        if payment.status == PaymentLogStatus::Success {
            log::debug!("Payment {reference} already verified");
            return self.settle(reference, payment.amount).await;
        }

        let verification = self.gateway.verify(&reference).await?;
        if !verification.successful {
            log::warn!(
                "Payment {} was not successful (gateway status '{}')",
                reference,
                verification.gateway_status
            );
            let failed = reference.clone();
            self.blocking(move |repo| repo.mark_failed(&failed)).await?;
            return Ok(VerificationOutcome::Failed {
                reference,
                gateway_status: verification.gateway_status,
            });
        }

        let amount = from_minor_units(verification.amount_minor);
        if let Err(e) = validate_amount("amount", &amount) {
            log::warn!(
                "Gateway confirmed payment {} with an unusable amount {}: {}",
                reference,
                format_money(&amount),
                e
            );
            return Err(DomainError::Gateway(format!(
                "gateway confirmed an invalid amount for {reference}"
            )));
        }
        self.settle(reference, amount).await
    }

    pub async fn history(&self, caller: &Caller) -> Result<Vec<PaymentLogView>, DomainError> {
        let user_id = caller.user_id;
        self.blocking(move |repo| repo.list_for_user(user_id)).await
    }

    pub async fn get_log(&self, caller: &Caller, id: Uuid) -> Result<PaymentLogView, DomainError> {
        let user_id = caller.user_id;
        self.blocking(move |repo| repo.find_for_user(user_id, id))
            .await?
            .ok_or_else(|| DomainError::not_found("Payment log"))
    }

    async fn settle(
        &self,
        reference: String,
        amount: BigDecimal,
    ) -> Result<VerificationOutcome, DomainError> {
        let currency = self.currency.clone();
        let description = format!("Payment via {}", self.gateway.name());
        let settle_ref = reference.clone();
        let settle_amount = amount.clone();
        let settlement = self
            .blocking(move |repo| {
                repo.settle(&settle_ref, &settle_amount, &currency, &description)
            })
            .await?;

        let already_settled = matches!(settlement, Settlement::AlreadySettled(_));
        let wallet = settlement.wallet();
        if !already_settled {
            log::info!(
                "Credited wallet {} with {} for payment {}",
                wallet.id,
                format_money(&amount),
                reference
            );
        }
        Ok(VerificationOutcome::Settled {
            reference,
            amount,
            balance: wallet.balance.clone(),
            currency: wallet.currency.clone(),
            already_settled,
        })
    }

    async fn blocking<T, F>(&self, f: F) -> Result<T, DomainError>
    where
        F: FnOnce(&dyn PaymentRepository) -> Result<T, DomainError> + Send + 'static,
        T: Send + 'static,
    {
        let repo = Arc::clone(&self.repo);
        tokio::task::spawn_blocking(move || f(repo.as_ref()))
            .await
            .map_err(|e| DomainError::Internal(e.to_string()))?
    }
}
