use std::collections::HashMap;

use chrono::Utc;
use diesel::dsl::count_star;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::catalog::{
    CollectionView, ProductChanges, ProductImageView, ProductInput, ProductPage, ProductView,
};
use crate::domain::errors::DomainError;
use crate::domain::ports::CatalogRepository;
use crate::schema::{collections, order_items, product_images, products};

use super::models::{
    CollectionRow, NewCollectionRow, NewProductImageRow, NewProductRow, ProductChangeset,
    ProductImageRow, ProductRow,
};

impl From<ProductImageRow> for ProductImageView {
    fn from(row: ProductImageRow) -> Self {
        ProductImageView {
            id: row.id,
            product_id: row.product_id,
            image: row.image,
        }
    }
}

fn collection_view(row: CollectionRow, products_count: i64) -> CollectionView {
    CollectionView {
        id: row.id,
        title: row.title,
        products_count,
    }
}

/// Assembles full product views (collection title and images) for `rows`.
fn product_views(
    conn: &mut PgConnection,
    rows: Vec<(ProductRow, String)>,
) -> Result<Vec<ProductView>, DomainError> {
    let ids: Vec<Uuid> = rows.iter().map(|(p, _)| p.id).collect();
    let mut images: HashMap<Uuid, Vec<ProductImageView>> = HashMap::new();
    for image in product_images::table
        .filter(product_images::product_id.eq_any(&ids))
        .order(product_images::created_at.asc())
        .select(ProductImageRow::as_select())
        .load(conn)?
    {
        images
            .entry(image.product_id)
            .or_default()
            .push(image.into());
    }

    Ok(rows
        .into_iter()
        .map(|(p, collection_title)| ProductView {
            images: images.remove(&p.id).unwrap_or_default(),
            id: p.id,
            title: p.title,
            description: p.description,
            unit_price: p.unit_price,
            inventory: p.inventory,
            collection_id: p.collection_id,
            collection_title,
            created_at: p.created_at,
        })
        .collect())
}

fn load_product(conn: &mut PgConnection, id: Uuid) -> Result<Option<ProductView>, DomainError> {
    let row = products::table
        .inner_join(collections::table)
        .filter(products::id.eq(id))
        .select((ProductRow::as_select(), collections::title))
        .first::<(ProductRow, String)>(conn)
        .optional()?;
    match row {
        Some(row) => Ok(product_views(conn, vec![row])?.pop()),
        None => Ok(None),
    }
}

fn count_products(conn: &mut PgConnection, collection_id: Uuid) -> Result<i64, DomainError> {
    Ok(products::table
        .filter(products::collection_id.eq(collection_id))
        .count()
        .get_result(conn)?)
}

pub struct DieselCatalogRepository {
    pool: DbPool,
}

impl DieselCatalogRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl CatalogRepository for DieselCatalogRepository {
    fn list_collections(&self) -> Result<Vec<CollectionView>, DomainError> {
        let mut conn = self.pool.get()?;

        let rows = collections::table
            .order(collections::title.asc())
            .select(CollectionRow::as_select())
            .load(&mut conn)?;
        let counts: HashMap<Uuid, i64> = products::table
            .group_by(products::collection_id)
            .select((products::collection_id, count_star()))
            .load::<(Uuid, i64)>(&mut conn)?
            .into_iter()
            .collect();

        Ok(rows
            .into_iter()
            .map(|row| {
                let count = counts.get(&row.id).copied().unwrap_or(0);
                collection_view(row, count)
            })
            .collect())
    }

    fn find_collection(&self, id: Uuid) -> Result<Option<CollectionView>, DomainError> {
        let mut conn = self.pool.get()?;

        let row = collections::table
            .find(id)
            .select(CollectionRow::as_select())
            .first(&mut conn)
            .optional()?;
        let Some(row) = row else {
            return Ok(None);
        };
        let count = count_products(&mut conn, row.id)?;
        Ok(Some(collection_view(row, count)))
    }

    fn create_collection(&self, title: &str) -> Result<CollectionView, DomainError> {
        let mut conn = self.pool.get()?;

        let row = diesel::insert_into(collections::table)
            .values(&NewCollectionRow {
                id: Uuid::new_v4(),
                title,
            })
            .returning(CollectionRow::as_returning())
            .get_result(&mut conn)?;
        Ok(collection_view(row, 0))
    }

    fn rename_collection(
        &self,
        id: Uuid,
        title: &str,
    ) -> Result<Option<CollectionView>, DomainError> {
        let mut conn = self.pool.get()?;

        let row = diesel::update(collections::table.find(id))
            .set(collections::title.eq(title))
            .returning(CollectionRow::as_returning())
            .get_result(&mut conn)
            .optional()?;
        let Some(row) = row else {
            return Ok(None);
        };
        let count = count_products(&mut conn, row.id)?;
        Ok(Some(collection_view(row, count)))
    }

    fn delete_collection(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut conn = self.pool.get()?;

        let deleted = diesel::delete(collections::table.find(id))
            .execute(&mut conn)
            .map_err(|e| referenced_by_orders(e, "collection has products referenced by orders"))?;
        Ok(deleted > 0)
    }

    fn list_products(&self, page: i64, limit: i64) -> Result<ProductPage, DomainError> {
        let mut conn = self.pool.get()?;

        let offset = (page - 1) * limit;
        conn.transaction::<_, DomainError, _>(|conn| {
            let total: i64 = products::table.count().get_result(conn)?;

            let rows = products::table
                .inner_join(collections::table)
                .select((ProductRow::as_select(), collections::title))
                .order(products::created_at.desc())
                .limit(limit)
                .offset(offset)
                .load::<(ProductRow, String)>(conn)?;

            Ok(ProductPage {
                items: product_views(conn, rows)?,
                total,
            })
        })
    }

    fn find_product(&self, id: Uuid) -> Result<Option<ProductView>, DomainError> {
        let mut conn = self.pool.get()?;
        load_product(&mut conn, id)
    }

    fn create_product(&self, input: ProductInput) -> Result<ProductView, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let id = Uuid::new_v4();
            diesel::insert_into(products::table)
                .values(&NewProductRow {
                    id,
                    title: input.title,
                    description: input.description,
                    unit_price: input.unit_price,
                    inventory: input.inventory,
                    collection_id: input.collection_id,
                })
                .execute(conn)?;
            load_product(conn, id)?.ok_or_else(|| DomainError::not_found("Product"))
        })
    }

    fn update_product(
        &self,
        id: Uuid,
        changes: ProductChanges,
    ) -> Result<Option<ProductView>, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let updated = diesel::update(products::table.find(id))
                .set(&ProductChangeset {
                    title: changes.title,
                    description: changes.description,
                    unit_price: changes.unit_price,
                    inventory: changes.inventory,
                    collection_id: changes.collection_id,
                    updated_at: Utc::now(),
                })
                .execute(conn)?;
            if updated == 0 {
                return Ok(None);
            }
            load_product(conn, id)
        })
    }

    fn delete_product(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let referenced: i64 = order_items::table
                .filter(order_items::product_id.eq(id))
                .count()
                .get_result(conn)?;
            if referenced > 0 {
                return Err(DomainError::Conflict(
                    "product is referenced by existing orders".to_string(),
                ));
            }
            let deleted = diesel::delete(products::table.find(id))
                .execute(conn)
                .map_err(|e| referenced_by_orders(e, "product is referenced by existing orders"))?;
            Ok(deleted > 0)
        })
    }

    fn list_images(&self, product_id: Uuid) -> Result<Vec<ProductImageView>, DomainError> {
        let mut conn = self.pool.get()?;

        Ok(product_images::table
            .filter(product_images::product_id.eq(product_id))
            .order(product_images::created_at.asc())
            .select(ProductImageRow::as_select())
            .load(&mut conn)?
            .into_iter()
            .map(Into::into)
            .collect())
    }

    fn find_image(
        &self,
        product_id: Uuid,
        image_id: Uuid,
    ) -> Result<Option<ProductImageView>, DomainError> {
        let mut conn = self.pool.get()?;

        Ok(product_images::table
            .filter(product_images::product_id.eq(product_id))
            .filter(product_images::id.eq(image_id))
            .select(ProductImageRow::as_select())
            .first(&mut conn)
            .optional()?
            .map(Into::into))
    }

    fn add_image(&self, product_id: Uuid, image: &str) -> Result<ProductImageView, DomainError> {
        let mut conn = self.pool.get()?;

        let row = diesel::insert_into(product_images::table)
            .values(&NewProductImageRow {
                id: Uuid::new_v4(),
                product_id,
                image,
            })
            .returning(ProductImageRow::as_returning())
            .get_result(&mut conn)?;
        Ok(row.into())
    }

    fn update_image(
        &self,
        product_id: Uuid,
        image_id: Uuid,
        image: &str,
    ) -> Result<Option<ProductImageView>, DomainError> {
        let mut conn = self.pool.get()?;

        Ok(diesel::update(
            product_images::table
                .filter(product_images::product_id.eq(product_id))
                .filter(product_images::id.eq(image_id)),
        )
        .set(product_images::image.eq(image))
        .returning(ProductImageRow::as_returning())
        .get_result(&mut conn)
        .optional()?
        .map(Into::into))
    }

    fn delete_image(&self, product_id: Uuid, image_id: Uuid) -> Result<bool, DomainError> {
        let mut conn = self.pool.get()?;

        let deleted = diesel::delete(
            product_images::table
                .filter(product_images::product_id.eq(product_id))
                .filter(product_images::id.eq(image_id)),
        )
        .execute(&mut conn)?;
        Ok(deleted > 0)
    }
}

/// Order items protect their products (`ON DELETE RESTRICT`); surface the
/// violation with a readable message.
fn referenced_by_orders(e: diesel::result::Error, message: &str) -> DomainError {
    match DomainError::from(e) {
        DomainError::Conflict(_) => DomainError::Conflict(message.to_string()),
        other => other,
    }
}
