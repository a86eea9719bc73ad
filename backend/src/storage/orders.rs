use chrono::Utc;
use diesel::prelude::*;

use crate::models::{NewOrder, NewOrderItem, Order, OrderItem};
use crate::schema::{order_items, orders, products};
use crate::storage::LIST_LIMIT;

#[derive(Debug, Clone, Default)]
pub struct OrderFilters {
    pub buyer_id: Option<String>,
    pub farmer_id: Option<String>,
    /// Matches orders where the given user is buyer or farmer.
    pub participant_id: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum CreateOrderError {
    #[error("unknown product: {0}")]
    UnknownProduct(String),
    #[error("product {0} is not sold by the selected farmer")]
    ForeignProduct(String),
    #[error("insufficient stock for product {0}")]
    InsufficientStock(String),
    #[error(transparent)]
    Database(#[from] diesel::result::Error),
}

pub fn get_orders(conn: &mut PgConnection, filters: &OrderFilters) -> QueryResult<Vec<Order>> {
    let mut query = orders::table.into_boxed();
    if let Some(buyer_id) = &filters.buyer_id {
        query = query.filter(orders::buyer_id.eq(buyer_id));
    }
    if let Some(farmer_id) = &filters.farmer_id {
        query = query.filter(orders::farmer_id.eq(farmer_id));
    }
    if let Some(participant_id) = &filters.participant_id {
        query = query.filter(
            orders::buyer_id
                .eq(participant_id)
                .or(orders::farmer_id.eq(participant_id)),
        );
    }
    if let Some(status) = &filters.status {
        query = query.filter(orders::status.eq(status));
    }
    query
        .order(orders::created_at.desc())
        .limit(LIST_LIMIT)
        .load(conn)
}

pub fn get_order(conn: &mut PgConnection, id: &str) -> QueryResult<Option<Order>> {
    orders::table.find(id).first(conn).optional()
}

pub fn get_order_items(conn: &mut PgConnection, order_id: &str) -> QueryResult<Vec<OrderItem>> {
    order_items::table
        .filter(order_items::order_id.eq(order_id))
        .order(order_items::created_at.asc())
        .load(conn)
}

/// Persists the order header and all line items as one transaction. Each
/// referenced product must exist, belong to the order's farmer, and have
/// enough stock; any failure rolls the whole unit back.
pub fn create_order(
    conn: &mut PgConnection,
    order: &NewOrder,
    items: &[NewOrderItem],
) -> Result<Order, CreateOrderError> {
    conn.transaction(|conn| {
        for item in items {
            let product: Option<crate::models::Product> = products::table
                .find(&item.product_id)
                .first(conn)
                .optional()?;
            let product = product
                .ok_or_else(|| CreateOrderError::UnknownProduct(item.product_id.clone()))?;
            if product.farmer_id != order.farmer_id {
                return Err(CreateOrderError::ForeignProduct(item.product_id.clone()));
            }
            if product.available_stock < item.quantity {
                return Err(CreateOrderError::InsufficientStock(item.product_id.clone()));
            }
        }

        let created: Order = diesel::insert_into(orders::table)
            .values(order)
            .get_result(conn)?;
        diesel::insert_into(order_items::table)
            .values(items)
            .execute(conn)?;
        Ok(created)
    })
}

pub fn update_order_status(
    conn: &mut PgConnection,
    id: &str,
    status: &str,
) -> QueryResult<Option<Order>> {
    let now = Utc::now().naive_utc();
    diesel::update(orders::table.find(id))
        .set((orders::status.eq(status), orders::updated_at.eq(now)))
        .get_result(conn)
        .optional()
}
