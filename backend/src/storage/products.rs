use chrono::Utc;
use diesel::prelude::*;

use crate::models::{NewProduct, Product, ProductCategory, ProductPatch};
use crate::schema::{product_categories, products};
use crate::storage::LIST_LIMIT;

#[derive(Debug, Clone, Default)]
pub struct ProductFilters {
    pub category: Option<String>,
    pub farmer_id: Option<String>,
    pub search: Option<String>,
}

pub fn get_products(conn: &mut PgConnection, filters: &ProductFilters) -> QueryResult<Vec<Product>> {
    let mut query = products::table.into_boxed();
    if let Some(category) = &filters.category {
        query = query.filter(products::category_id.eq(category));
    }
    if let Some(farmer_id) = &filters.farmer_id {
        query = query.filter(products::farmer_id.eq(farmer_id));
    }
    if let Some(search) = &filters.search {
        let pattern = format!("%{}%", search);
        query = query.filter(
            products::name
                .ilike(pattern.clone())
                .or(products::description.ilike(pattern)),
        );
    }
    query
        .order(products::created_at.desc())
        .limit(LIST_LIMIT)
        .load(conn)
}

pub fn get_product(conn: &mut PgConnection, id: &str) -> QueryResult<Option<Product>> {
    products::table.find(id).first(conn).optional()
}

pub fn create_product(conn: &mut PgConnection, product: &NewProduct) -> QueryResult<Product> {
    diesel::insert_into(products::table)
        .values(product)
        .get_result(conn)
}

pub fn update_product(
    conn: &mut PgConnection,
    id: &str,
    patch: &ProductPatch,
) -> QueryResult<Option<Product>> {
    if patch.is_empty() {
        return get_product(conn, id);
    }
    let now = Utc::now().naive_utc();
    diesel::update(products::table.find(id))
        .set((patch, products::updated_at.eq(now)))
        .get_result(conn)
        .optional()
}

/// Unconditional and idempotent; dependent order items go with the row.
pub fn delete_product(conn: &mut PgConnection, id: &str) -> QueryResult<usize> {
    diesel::delete(products::table.find(id)).execute(conn)
}

pub fn get_product_categories(conn: &mut PgConnection) -> QueryResult<Vec<ProductCategory>> {
    product_categories::table
        .order(product_categories::name.asc())
        .load(conn)
}
