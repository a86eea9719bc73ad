use axum::extract::{Path, Query, State};
use axum::{Extension, Json};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::{self, AuthUser};
use crate::errors::{ApiError, FieldError};
use crate::models::{NewOrder, NewOrderItem, Order, OrderWithItems, ORDER_STATUSES};
use crate::storage::{self, orders::CreateOrderError, orders::OrderFilters};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct OrderQuery {
    pub role: Option<String>,
    pub status: Option<String>,
}

pub async fn list_orders(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Query(query): Query<OrderQuery>,
) -> Result<Json<Vec<Order>>, ApiError> {
    let mut filters = OrderFilters {
        status: query.status,
        ..OrderFilters::default()
    };
    match query.role.as_deref() {
        Some("buyer") => filters.buyer_id = Some(caller.id().to_string()),
        Some("farmer") => filters.farmer_id = Some(caller.id().to_string()),
        // Without a role the caller still only sees orders they take part in.
        _ => filters.participant_id = Some(caller.id().to_string()),
    }

    let mut conn = state.db.get()?;
    let orders = storage::orders::get_orders(&mut conn, &filters)?;
    Ok(Json(orders))
}

pub async fn get_order(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<OrderWithItems>, ApiError> {
    let mut conn = state.db.get()?;
    let order = storage::orders::get_order(&mut conn, &id)?
        .ok_or_else(|| ApiError::not_found("Order not found"))?;
    auth::require_order_participant(&order, caller.id())?;

    let items = storage::orders::get_order_items(&mut conn, &id)?;
    Ok(Json(OrderWithItems { order, items }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemRequest {
    pub product_id: String,
    pub quantity: i32,
    pub price_per_unit: Decimal,
    pub total_price: Decimal,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub farmer_id: String,
    pub total_amount: Decimal,
    pub delivery_fee: Option<Decimal>,
    pub delivery_address: Option<String>,
    pub notes: Option<String>,
    pub items: Vec<OrderItemRequest>,
}

impl CreateOrderRequest {
    fn validate(&self) -> Result<(), ApiError> {
        let mut errors = Vec::new();
        if self.farmer_id.trim().is_empty() {
            errors.push(FieldError::new("farmerId", "is required"));
        }
        if self.items.is_empty() {
            errors.push(FieldError::new(
                "items",
                "must contain at least one line item",
            ));
        }

        let mut expected_total = self.delivery_fee.unwrap_or(Decimal::ZERO);
        for (index, item) in self.items.iter().enumerate() {
            if item.product_id.trim().is_empty() {
                errors.push(FieldError::new(
                    format!("items[{}].productId", index),
                    "is required",
                ));
            }
            if item.quantity < 1 {
                errors.push(FieldError::new(
                    format!("items[{}].quantity", index),
                    "must be at least 1",
                ));
            }
            if item.price_per_unit < Decimal::ZERO {
                errors.push(FieldError::new(
                    format!("items[{}].pricePerUnit", index),
                    "must not be negative",
                ));
            }
            if item.total_price != item.price_per_unit * Decimal::from(item.quantity) {
                errors.push(FieldError::new(
                    format!("items[{}].totalPrice", index),
                    "must equal quantity times pricePerUnit",
                ));
            }
            expected_total += item.total_price;
        }
        if errors.is_empty() && self.total_amount != expected_total {
            errors.push(FieldError::new(
                "totalAmount",
                "must equal the sum of line totals plus the delivery fee",
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ApiError::invalid_fields("Invalid payload", errors))
        }
    }
}

pub async fn create_order(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Json(req): Json<CreateOrderRequest>,
) -> Result<Json<Order>, ApiError> {
    req.validate()?;

    let order_id = Uuid::new_v4().to_string();
    let order = NewOrder {
        id: order_id.clone(),
        buyer_id: caller.id().to_string(),
        farmer_id: req.farmer_id,
        status: None,
        total_amount: req.total_amount,
        delivery_fee: req.delivery_fee,
        delivery_address: req.delivery_address,
        notes: req.notes,
    };
    let items: Vec<NewOrderItem> = req
        .items
        .into_iter()
        .map(|item| NewOrderItem {
            id: Uuid::new_v4().to_string(),
            order_id: order_id.clone(),
            product_id: item.product_id,
            quantity: item.quantity,
            price_per_unit: item.price_per_unit,
            total_price: item.total_price,
        })
        .collect();

    let mut conn = state.db.get()?;
    let created = storage::orders::create_order(&mut conn, &order, &items).map_err(|err| {
        match err {
            CreateOrderError::UnknownProduct(_)
            | CreateOrderError::ForeignProduct(_)
            | CreateOrderError::InsufficientStock(_) => {
                ApiError::invalid_fields(
                    "Invalid payload",
                    vec![FieldError::new("items", err.to_string())],
                )
            }
            CreateOrderError::Database(db) => ApiError::Database(db),
        }
    })?;
    Ok(Json(created))
}

#[derive(Debug, Deserialize)]
pub struct UpdateOrderStatusRequest {
    pub status: String,
}

pub async fn update_order_status(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(req): Json<UpdateOrderStatusRequest>,
) -> Result<Json<Order>, ApiError> {
    // Any of the enumerated statuses may follow any other; only unknown
    // values are rejected.
    if !ORDER_STATUSES.contains(&req.status.as_str()) {
        return Err(ApiError::validation("Invalid status"));
    }

    let mut conn = state.db.get()?;
    let existing = storage::orders::get_order(&mut conn, &id)?
        .ok_or_else(|| ApiError::not_found("Order not found"))?;
    auth::require_order_farmer(&existing, caller.id())?;

    let updated = storage::orders::update_order_status(&mut conn, &id, &req.status)?
        .ok_or_else(|| ApiError::not_found("Order not found"))?;
    Ok(Json(updated))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_request() -> CreateOrderRequest {
        CreateOrderRequest {
            farmer_id: "farmer-1".to_string(),
            total_amount: Decimal::new(2500, 2),
            delivery_fee: Some(Decimal::new(500, 2)),
            delivery_address: Some("12 Market Rd".to_string()),
            notes: None,
            items: vec![OrderItemRequest {
                product_id: "p-1".to_string(),
                quantity: 4,
                price_per_unit: Decimal::new(500, 2),
                total_price: Decimal::new(2000, 2),
            }],
        }
    }

    #[test]
    fn a_consistent_order_passes_validation() {
        assert!(base_request().validate().is_ok());
    }

    #[test]
    fn an_order_without_items_is_rejected() {
        let mut req = base_request();
        req.items.clear();
        req.total_amount = req.delivery_fee.unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn a_line_total_mismatch_is_rejected() {
        let mut req = base_request();
        req.items[0].total_price = Decimal::new(1999, 2);
        assert!(req.validate().is_err());
    }

    #[test]
    fn an_order_total_mismatch_is_rejected() {
        let mut req = base_request();
        req.total_amount = Decimal::new(2000, 2);
        assert!(req.validate().is_err());
    }

    #[test]
    fn the_delivery_fee_defaults_to_zero_in_the_total() {
        let mut req = base_request();
        req.delivery_fee = None;
        req.total_amount = Decimal::new(2000, 2);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn a_zero_quantity_item_is_rejected() {
        let mut req = base_request();
        req.items[0].quantity = 0;
        assert!(req.validate().is_err());
    }
}
