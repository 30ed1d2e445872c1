use bigdecimal::BigDecimal;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::catalog::ProductSummary;
use crate::domain::errors::DomainError;
use crate::domain::order::{
    insufficient_inventory, ListResult, OrderItemView, OrderScope, OrderView, PaymentStatus,
};
use crate::domain::ports::OrderRepository;
use crate::schema::{cart_items, carts, customers, order_items, orders, products};

use super::customer_repo::get_or_create_customer;
use super::models::{NewOrderItemRow, NewOrderRow, OrderItemRow, OrderRow};

fn order_view(row: OrderRow, items: Vec<OrderItemView>) -> Result<OrderView, DomainError> {
    Ok(OrderView {
        id: row.id,
        customer_id: row.customer_id,
        payment_status: row.payment_status.parse()?,
        placed_at: row.placed_at,
        items,
    })
}

fn load_items(conn: &mut PgConnection, order_id: Uuid) -> Result<Vec<OrderItemView>, DomainError> {
    let rows = order_items::table
        .inner_join(products::table)
        .filter(order_items::order_id.eq(order_id))
        .order(products::title.asc())
        .select((
            OrderItemRow::as_select(),
            (products::id, products::title, products::unit_price),
        ))
        .load::<(OrderItemRow, (Uuid, String, BigDecimal))>(conn)?;

    Ok(rows
        .into_iter()
        .map(|(item, (id, title, unit_price))| OrderItemView {
            id: item.id,
            product: ProductSummary {
                id,
                title,
                unit_price,
            },
            quantity: item.quantity,
            unit_price: item.unit_price,
        })
        .collect())
}

fn load_order(
    conn: &mut PgConnection,
    id: Uuid,
    scope: OrderScope,
) -> Result<Option<OrderView>, DomainError> {
    let mut query = orders::table
        .inner_join(customers::table)
        .filter(orders::id.eq(id))
        .select(OrderRow::as_select())
        .into_boxed();
    if let OrderScope::User(user_id) = scope {
        query = query.filter(customers::user_id.eq(user_id));
    }

    let Some(row) = query.first(conn).optional()? else {
        return Ok(None);
    };
    let items = load_items(conn, row.id)?;
    order_view(row, items).map(Some)
}

// ── Repository ────────────────────────────────────────────────────────────────

pub struct DieselOrderRepository {
    pool: DbPool,
}

impl DieselOrderRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl OrderRepository for DieselOrderRepository {
    fn place(&self, cart_id: Uuid, user_id: i64) -> Result<OrderView, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            // 1. Lock the cart so concurrent checkouts of it serialize here.
            carts::table
                .find(cart_id)
                .select(carts::id)
                .for_update()
                .first::<Uuid>(conn)
                .optional()?
                .ok_or_else(|| DomainError::not_found("Cart"))?;

            let customer = get_or_create_customer(conn, user_id)?;

            // 2. Read the lines with each product's current price.
            let lines = cart_items::table
                .inner_join(products::table)
                .filter(cart_items::cart_id.eq(cart_id))
                .select((
                    cart_items::product_id,
                    cart_items::quantity,
                    products::title,
                    products::unit_price,
                ))
                .load::<(Uuid, i32, String, BigDecimal)>(conn)?;

            // 3. Take the stock. The conditional update fails the whole
            //    checkout if any product ran short in the meantime.
            for (product_id, quantity, title, _) in &lines {
                let (product_id, quantity) = (*product_id, *quantity);
                let taken = diesel::update(
                    products::table
                        .filter(products::id.eq(product_id))
                        .filter(products::inventory.ge(quantity)),
                )
                .set(products::inventory.eq(products::inventory - quantity))
                .execute(conn)?;
                if taken == 0 {
                    return Err(insufficient_inventory(title));
                }
            }

            // 4. Insert the order and snapshot the prices into its items.
            let order = diesel::insert_into(orders::table)
                .values(&NewOrderRow {
                    id: Uuid::new_v4(),
                    customer_id: customer.id,
                    payment_status: PaymentStatus::Pending.as_str().to_string(),
                })
                .returning(OrderRow::as_returning())
                .get_result(conn)?;

            let new_items: Vec<NewOrderItemRow> = lines
                .into_iter()
                .map(|(product_id, quantity, _, unit_price)| NewOrderItemRow {
                    id: Uuid::new_v4(),
                    order_id: order.id,
                    product_id,
                    quantity,
                    unit_price,
                })
                .collect();
            if !new_items.is_empty() {
                diesel::insert_into(order_items::table)
                    .values(&new_items)
                    .execute(conn)?;
            }

            // 5. The cart is consumed by the checkout.
            diesel::delete(carts::table.find(cart_id)).execute(conn)?;

            let items = load_items(conn, order.id)?;
            order_view(order, items)
        })
    }

    fn find_by_id(&self, id: Uuid, scope: OrderScope) -> Result<Option<OrderView>, DomainError> {
        let mut conn = self.pool.get()?;
        load_order(&mut conn, id, scope)
    }

    fn list(&self, scope: OrderScope, page: i64, limit: i64) -> Result<ListResult, DomainError> {
        let mut conn = self.pool.get()?;

        let offset = (page - 1) * limit;
        conn.transaction::<_, DomainError, _>(|conn| {
            let mut count = orders::table
                .inner_join(customers::table)
                .count()
                .into_boxed();
            let mut rows = orders::table
                .inner_join(customers::table)
                .select(OrderRow::as_select())
                .order(orders::placed_at.desc())
                .limit(limit)
                .offset(offset)
                .into_boxed();
            if let OrderScope::User(user_id) = scope {
                count = count.filter(customers::user_id.eq(user_id));
                rows = rows.filter(customers::user_id.eq(user_id));
            }

            let total: i64 = count.get_result(conn)?;
            let items = rows
                .load(conn)?
                .into_iter()
                .map(|row| order_view(row, vec![]))
                .collect::<Result<Vec<_>, _>>()?;

            Ok(ListResult { items, total })
        })
    }

    fn set_payment_status(
        &self,
        id: Uuid,
        status: PaymentStatus,
    ) -> Result<Option<OrderView>, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let updated = diesel::update(orders::table.find(id))
                .set(orders::payment_status.eq(status.as_str()))
                .execute(conn)?;
            if updated == 0 {
                return Ok(None);
            }
            load_order(conn, id, OrderScope::All)
        })
    }

    fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut conn = self.pool.get()?;

        let deleted = diesel::delete(orders::table.find(id)).execute(&mut conn)?;
        Ok(deleted > 0)
    }
}
