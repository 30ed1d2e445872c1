use diesel::pg::PgConnection;
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::customer::{CustomerProfile, CustomerView, Membership};
use crate::domain::errors::DomainError;
use crate::domain::ports::CustomerRepository;
use crate::schema::customers;

use super::models::{CustomerChangeset, CustomerRow, NewCustomerRow};

impl TryFrom<CustomerRow> for CustomerView {
    type Error = DomainError;

    fn try_from(row: CustomerRow) -> Result<Self, Self::Error> {
        Ok(CustomerView {
            id: row.id,
            user_id: row.user_id,
            phone: row.phone,
            birth_date: row.birth_date,
            membership: row.membership.parse()?,
        })
    }
}

fn new_row(user_id: i64, profile: CustomerProfile) -> NewCustomerRow {
    NewCustomerRow {
        id: Uuid::new_v4(),
        user_id,
        phone: profile.phone,
        birth_date: profile.birth_date,
        membership: profile.membership.code().to_string(),
    }
}

/// Returns the caller's customer row, creating an empty Bronze one the first
/// time. Safe under concurrent first requests for the same user.
pub(crate) fn get_or_create_customer(
    conn: &mut PgConnection,
    user_id: i64,
) -> Result<CustomerRow, DomainError> {
    diesel::insert_into(customers::table)
        .values(&new_row(user_id, CustomerProfile::default()))
        .on_conflict(customers::user_id)
        .do_nothing()
        .execute(conn)?;

    Ok(customers::table
        .filter(customers::user_id.eq(user_id))
        .select(CustomerRow::as_select())
        .first(conn)?)
}

pub struct DieselCustomerRepository {
    pool: DbPool,
}

impl DieselCustomerRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl CustomerRepository for DieselCustomerRepository {
    fn get_or_create(&self, user_id: i64) -> Result<CustomerView, DomainError> {
        let mut conn = self.pool.get()?;
        get_or_create_customer(&mut conn, user_id)?.try_into()
    }

    fn find(&self, id: Uuid) -> Result<Option<CustomerView>, DomainError> {
        let mut conn = self.pool.get()?;

        customers::table
            .find(id)
            .select(CustomerRow::as_select())
            .first(&mut conn)
            .optional()?
            .map(CustomerView::try_from)
            .transpose()
    }

    fn create(&self, user_id: i64, profile: CustomerProfile) -> Result<CustomerView, DomainError> {
        let mut conn = self.pool.get()?;

        let row = diesel::insert_into(customers::table)
            .values(&new_row(user_id, profile))
            .returning(CustomerRow::as_returning())
            .get_result(&mut conn)
            .map_err(|e| match DomainError::from(e) {
                DomainError::Conflict(_) => DomainError::Conflict(
                    "a customer profile already exists for this user".to_string(),
                ),
                other => other,
            })?;
        row.try_into()
    }

    fn update(
        &self,
        id: Uuid,
        profile: CustomerProfile,
    ) -> Result<Option<CustomerView>, DomainError> {
        let mut conn = self.pool.get()?;

        diesel::update(customers::table.find(id))
            .set(&CustomerChangeset {
                phone: profile.phone,
                birth_date: profile.birth_date,
                membership: profile.membership.code().to_string(),
            })
            .returning(CustomerRow::as_returning())
            .get_result(&mut conn)
            .optional()?
            .map(CustomerView::try_from)
            .transpose()
    }
}
