use bigdecimal::BigDecimal;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::ports::WalletRepository;
use crate::domain::wallet::{ledger_sum, TransactionType, WalletTransactionView, WalletView};
use crate::schema::{wallet_transactions, wallets};

use super::models::{NewWalletRow, NewWalletTransactionRow, WalletRow, WalletTransactionRow};

impl From<WalletRow> for WalletView {
    fn from(row: WalletRow) -> Self {
        WalletView {
            id: row.id,
            user_id: row.user_id,
            balance: row.balance,
            currency: row.currency,
            created_at: row.created_at,
        }
    }
}

impl TryFrom<WalletTransactionRow> for WalletTransactionView {
    type Error = DomainError;

    fn try_from(row: WalletTransactionRow) -> Result<Self, Self::Error> {
        Ok(WalletTransactionView {
            id: row.id,
            wallet_id: row.wallet_id,
            transaction_type: row.transaction_type.parse()?,
            amount: row.amount,
            reference: row.reference,
            description: row.description,
            created_at: row.created_at,
        })
    }
}

/// Locks the user's wallet row for the rest of the transaction, creating a
/// zero-balance wallet first if the user has none.
pub(crate) fn lock_or_create_wallet(
    conn: &mut PgConnection,
    user_id: i64,
    currency: &str,
) -> Result<WalletRow, DomainError> {
    diesel::insert_into(wallets::table)
        .values(&NewWalletRow {
            id: Uuid::new_v4(),
            user_id,
            balance: BigDecimal::from(0),
            currency,
        })
        .on_conflict(wallets::user_id)
        .do_nothing()
        .execute(conn)?;

    Ok(wallets::table
        .filter(wallets::user_id.eq(user_id))
        .select(WalletRow::as_select())
        .for_update()
        .first(conn)?)
}

/// Adds `amount` to a locked wallet and writes the matching CREDIT entry.
///
/// Fails with `Conflict` if a ledger entry already carries `reference`.
pub(crate) fn credit(
    conn: &mut PgConnection,
    wallet_id: Uuid,
    amount: &BigDecimal,
    reference: &str,
    description: &str,
) -> Result<WalletRow, DomainError> {
    diesel::insert_into(wallet_transactions::table)
        .values(&NewWalletTransactionRow {
            id: Uuid::new_v4(),
            wallet_id,
            transaction_type: TransactionType::Credit.as_str(),
            amount: amount.clone(),
            reference,
            description,
        })
        .execute(conn)?;

    Ok(diesel::update(wallets::table.find(wallet_id))
        .set(wallets::balance.eq(wallets::balance + amount.clone()))
        .returning(WalletRow::as_returning())
        .get_result(conn)?)
}

fn find_wallet(conn: &mut PgConnection, user_id: i64) -> Result<Option<WalletRow>, DomainError> {
    Ok(wallets::table
        .filter(wallets::user_id.eq(user_id))
        .select(WalletRow::as_select())
        .first(conn)
        .optional()?)
}

pub struct DieselWalletRepository {
    pool: DbPool,
}

impl DieselWalletRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl WalletRepository for DieselWalletRepository {
    fn find_by_user(&self, user_id: i64) -> Result<Option<WalletView>, DomainError> {
        let mut conn = self.pool.get()?;
        Ok(find_wallet(&mut conn, user_id)?.map(Into::into))
    }

    fn create(&self, user_id: i64, currency: &str) -> Result<WalletView, DomainError> {
        let mut conn = self.pool.get()?;

        let row = diesel::insert_into(wallets::table)
            .values(&NewWalletRow {
                id: Uuid::new_v4(),
                user_id,
                balance: BigDecimal::from(0),
                currency,
            })
            .returning(WalletRow::as_returning())
            .get_result(&mut conn)
            .map_err(|e| match DomainError::from(e) {
                DomainError::Conflict(_) => {
                    DomainError::Conflict("wallet already exists for this user".to_string())
                }
                other => other,
            })?;
        Ok(row.into())
    }

    fn transactions(&self, user_id: i64) -> Result<Vec<WalletTransactionView>, DomainError> {
        let mut conn = self.pool.get()?;

        wallet_transactions::table
            .inner_join(wallets::table)
            .filter(wallets::user_id.eq(user_id))
            .order(wallet_transactions::created_at.desc())
            .select(WalletTransactionRow::as_select())
            .load(&mut conn)?
            .into_iter()
            .map(WalletTransactionView::try_from)
            .collect()
    }

    fn find_transaction(
        &self,
        user_id: i64,
        id: Uuid,
    ) -> Result<Option<WalletTransactionView>, DomainError> {
        let mut conn = self.pool.get()?;

        wallet_transactions::table
            .inner_join(wallets::table)
            .filter(wallets::user_id.eq(user_id))
            .filter(wallet_transactions::id.eq(id))
            .select(WalletTransactionRow::as_select())
            .first(&mut conn)
            .optional()?
            .map(WalletTransactionView::try_from)
            .transpose()
    }

    fn ledger_balance(&self, wallet_id: Uuid) -> Result<BigDecimal, DomainError> {
        let mut conn = self.pool.get()?;

        let entries = wallet_transactions::table
            .filter(wallet_transactions::wallet_id.eq(wallet_id))
            .select((
                wallet_transactions::transaction_type,
                wallet_transactions::amount,
            ))
            .load::<(String, BigDecimal)>(&mut conn)?
            .into_iter()
            .map(|(kind, amount)| Ok((kind.parse::<TransactionType>()?, amount)))
            .collect::<Result<Vec<_>, DomainError>>()?;

        Ok(ledger_sum(entries.iter().map(|(kind, amount)| (*kind, amount))))
    }
}
