use bigdecimal::BigDecimal;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::payment::{NewPaymentLog, PaymentLogStatus, PaymentLogView};
use crate::domain::ports::PaymentRepository;
use crate::domain::wallet::Settlement;
use crate::schema::{payment_logs, wallet_transactions, wallets};

use super::models::{NewPaymentLogRow, PaymentLogRow, WalletRow};
use super::wallet_repo::{credit, lock_or_create_wallet};

impl TryFrom<PaymentLogRow> for PaymentLogView {
    type Error = DomainError;

    fn try_from(row: PaymentLogRow) -> Result<Self, Self::Error> {
        Ok(PaymentLogView {
            id: row.id,
            user_id: row.user_id,
            gateway: row.gateway,
            reference: row.reference,
            amount: row.amount,
            status: row.status.parse()?,
            created_at: row.created_at,
        })
    }
}

/// The wallet already credited for `reference`, if any.
fn settled_wallet(conn: &mut PgConnection, reference: &str) -> Result<Option<WalletRow>, DomainError> {
    Ok(wallet_transactions::table
        .inner_join(wallets::table)
        .filter(wallet_transactions::reference.eq(reference))
        .select(WalletRow::as_select())
        .first(conn)
        .optional()?)
}

pub struct DieselPaymentRepository {
    pool: DbPool,
}

impl DieselPaymentRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl PaymentRepository for DieselPaymentRepository {
    fn record(&self, log: NewPaymentLog) -> Result<PaymentLogView, DomainError> {
        let mut conn = self.pool.get()?;

        diesel::insert_into(payment_logs::table)
            .values(&NewPaymentLogRow {
                id: Uuid::new_v4(),
                user_id: log.user_id,
                gateway: log.gateway,
                reference: log.reference,
                amount: log.amount,
                status: PaymentLogStatus::Pending.as_str().to_string(),
            })
            .returning(PaymentLogRow::as_returning())
            .get_result(&mut conn)?
            .try_into()
    }

    fn find_by_reference(&self, reference: &str) -> Result<Option<PaymentLogView>, DomainError> {
        let mut conn = self.pool.get()?;

        payment_logs::table
            .filter(payment_logs::reference.eq(reference))
            .select(PaymentLogRow::as_select())
            .first(&mut conn)
            .optional()?
            .map(PaymentLogView::try_from)
            .transpose()
    }

    fn list_for_user(&self, user_id: i64) -> Result<Vec<PaymentLogView>, DomainError> {
        let mut conn = self.pool.get()?;

        payment_logs::table
            .filter(payment_logs::user_id.eq(user_id))
            .order(payment_logs::created_at.desc())
            .select(PaymentLogRow::as_select())
            .load(&mut conn)?
            .into_iter()
            .map(PaymentLogView::try_from)
            .collect()
    }

    fn find_for_user(
        &self,
        user_id: i64,
        id: Uuid,
    ) -> Result<Option<PaymentLogView>, DomainError> {
        let mut conn = self.pool.get()?;

        payment_logs::table
            .filter(payment_logs::user_id.eq(user_id))
            .filter(payment_logs::id.eq(id))
            .select(PaymentLogRow::as_select())
            .first(&mut conn)
            .optional()?
            .map(PaymentLogView::try_from)
            .transpose()
    }

    fn mark_failed(&self, reference: &str) -> Result<bool, DomainError> {
        let mut conn = self.pool.get()?;

        let updated = diesel::update(
            payment_logs::table
                .filter(payment_logs::reference.eq(reference))
                .filter(payment_logs::status.ne(PaymentLogStatus::Success.as_str())),
        )
        .set(payment_logs::status.eq(PaymentLogStatus::Failed.as_str()))
        .execute(&mut conn)?;
        Ok(updated > 0)
    }

    fn settle(
        &self,
        reference: &str,
        amount: &BigDecimal,
        currency: &str,
        description: &str,
    ) -> Result<Settlement, DomainError> {
        let mut conn = self.pool.get()?;

        let result = conn.transaction::<_, DomainError, _>(|conn| {
            // Concurrent verifications of one reference queue on this lock.
            let log = payment_logs::table
                .filter(payment_logs::reference.eq(reference))
                .select(PaymentLogRow::as_select())
                .for_update()
                .first(conn)
                .optional()?
                .ok_or_else(|| DomainError::NotFound("Payment reference not found".to_string()))?;

            if let Some(wallet) = settled_wallet(conn, reference)? {
                return Ok(Settlement::AlreadySettled(wallet.into()));
            }

            diesel::update(payment_logs::table.find(log.id))
                .set((
                    payment_logs::status.eq(PaymentLogStatus::Success.as_str()),
                    payment_logs::amount.eq(amount),
                ))
                .execute(conn)?;

            let wallet = lock_or_create_wallet(conn, log.user_id, currency)?;
            let wallet = credit(conn, wallet.id, amount, reference, description)?;
            Ok(Settlement::Credited(wallet.into()))
        });

        match result {
            // The unique ledger reference lost a race with another writer;
            // that writer's credit stands.
            Err(DomainError::Conflict(_)) => settled_wallet(&mut conn, reference)?
                .map(|wallet| Settlement::AlreadySettled(wallet.into()))
                .ok_or_else(|| {
                    DomainError::Internal(format!("settlement of {reference} conflicted"))
                }),
            other => other,
        }
    }
}
