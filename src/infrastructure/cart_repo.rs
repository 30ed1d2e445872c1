use chrono::Utc;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::cart::{merge_quantity, CartItemView, CartView};
use crate::domain::catalog::ProductSummary;
use crate::domain::errors::DomainError;
use crate::domain::ports::CartRepository;
use crate::schema::{cart_items, carts, products};

use super::models::{CartItemRow, CartRow};

type ItemWithProduct = (CartItemRow, (Uuid, String, bigdecimal::BigDecimal));

fn item_view((item, (id, title, unit_price)): ItemWithProduct) -> CartItemView {
    CartItemView {
        id: item.id,
        cart_id: item.cart_id,
        product: ProductSummary {
            id,
            title,
            unit_price,
        },
        quantity: item.quantity,
    }
}

fn load_item(conn: &mut PgConnection, item_id: Uuid) -> Result<CartItemView, DomainError> {
    let row = cart_items::table
        .inner_join(products::table)
        .filter(cart_items::id.eq(item_id))
        .select((
            CartItemRow::as_select(),
            (products::id, products::title, products::unit_price),
        ))
        .first::<ItemWithProduct>(conn)?;
    Ok(item_view(row))
}

pub struct DieselCartRepository {
    pool: DbPool,
}

impl DieselCartRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl CartRepository for DieselCartRepository {
    fn create(&self) -> Result<CartView, DomainError> {
        let mut conn = self.pool.get()?;

        let row = diesel::insert_into(carts::table)
            .values(&CartRow {
                id: Uuid::new_v4(),
                created_at: Utc::now(),
            })
            .returning(CartRow::as_returning())
            .get_result(&mut conn)?;
        Ok(CartView {
            id: row.id,
            created_at: row.created_at,
            items: vec![],
        })
    }

    fn find(&self, id: Uuid) -> Result<Option<CartView>, DomainError> {
        let mut conn = self.pool.get()?;

        let cart = carts::table
            .find(id)
            .select(CartRow::as_select())
            .first(&mut conn)
            .optional()?;
        let Some(cart) = cart else {
            return Ok(None);
        };

        let items = cart_items::table
            .inner_join(products::table)
            .filter(cart_items::cart_id.eq(cart.id))
            .order(products::title.asc())
            .select((
                CartItemRow::as_select(),
                (products::id, products::title, products::unit_price),
            ))
            .load::<ItemWithProduct>(&mut conn)?;

        Ok(Some(CartView {
            id: cart.id,
            created_at: cart.created_at,
            items: items.into_iter().map(item_view).collect(),
        }))
    }

    fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut conn = self.pool.get()?;

        // cart_items go with the cart (ON DELETE CASCADE).
        let deleted = diesel::delete(carts::table.find(id)).execute(&mut conn)?;
        Ok(deleted > 0)
    }

    fn add_item(
        &self,
        cart_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<CartItemView, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let cart_exists = carts::table
                .find(cart_id)
                .select(carts::id)
                .for_update()
                .first::<Uuid>(conn)
                .optional()?
                .is_some();
            if !cart_exists {
                return Err(DomainError::not_found("Cart"));
            }

            let product_exists = products::table
                .find(product_id)
                .select(products::id)
                .first::<Uuid>(conn)
                .optional()?
                .is_some();
            if !product_exists {
                return Err(DomainError::invalid(
                    "No product with the given ID was found.",
                ));
            }

            // One line per product: merge into the existing line when present.
            // The cart row lock above serialises concurrent adds.
            let existing = cart_items::table
                .filter(cart_items::cart_id.eq(cart_id))
                .filter(cart_items::product_id.eq(product_id))
                .select(cart_items::quantity)
                .first::<i32>(conn)
                .optional()?;
            let merged = match existing {
                Some(current) => merge_quantity(current, quantity)?,
                None => quantity,
            };

            let item_id = diesel::insert_into(cart_items::table)
                .values(&CartItemRow {
                    id: Uuid::new_v4(),
                    cart_id,
                    product_id,
                    quantity,
                })
                .on_conflict((cart_items::cart_id, cart_items::product_id))
                .do_update()
                .set(cart_items::quantity.eq(merged))
                .returning(cart_items::id)
                .get_result::<Uuid>(conn)?;

            load_item(conn, item_id)
        })
    }

    fn set_quantity(
        &self,
        cart_id: Uuid,
        item_id: Uuid,
        quantity: i32,
    ) -> Result<Option<CartItemView>, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let updated = diesel::update(
                cart_items::table
                    .filter(cart_items::cart_id.eq(cart_id))
                    .filter(cart_items::id.eq(item_id)),
            )
            .set(cart_items::quantity.eq(quantity))
            .execute(conn)?;
            if updated == 0 {
                return Ok(None);
            }
            load_item(conn, item_id).map(Some)
        })
    }

    fn remove_item(&self, cart_id: Uuid, item_id: Uuid) -> Result<bool, DomainError> {
        let mut conn = self.pool.get()?;

        let deleted = diesel::delete(
            cart_items::table
                .filter(cart_items::cart_id.eq(cart_id))
                .filter(cart_items::id.eq(item_id)),
        )
        .execute(&mut conn)?;
        Ok(deleted > 0)
    }
}
