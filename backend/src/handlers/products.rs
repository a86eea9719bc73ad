use axum::extract::{Path, Query, State};
use axum::{Extension, Json};
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::{self, AuthUser};
use crate::errors::{ApiError, FieldError};
use crate::models::{NewProduct, Product, ProductCategory, ProductPatch, PRODUCT_STATUSES};
use crate::storage::{self, products::ProductFilters};
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductQuery {
    pub category: Option<String>,
    pub farmer_id: Option<String>,
    pub search: Option<String>,
}

pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> Result<Json<Vec<Product>>, ApiError> {
    let mut conn = state.db.get()?;
    let products = storage::products::get_products(
        &mut conn,
        &ProductFilters {
            category: query.category,
            farmer_id: query.farmer_id,
            search: query.search,
        },
    )?;
    Ok(Json(products))
}

pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Product>, ApiError> {
    let mut conn = state.db.get()?;
    let product = storage::products::get_product(&mut conn, &id)?
        .ok_or_else(|| ApiError::not_found("Product not found"))?;
    Ok(Json(product))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    pub category_id: String,
    pub name: String,
    pub description: Option<String>,
    pub price_per_kg: Decimal,
    pub available_stock: i32,
    pub unit: Option<String>,
    pub is_organic: Option<bool>,
    pub allow_pre_order: Option<bool>,
    pub harvest_date: Option<NaiveDateTime>,
    pub expiry_date: Option<NaiveDateTime>,
    pub quality_grade: Option<String>,
    pub status: Option<String>,
    pub images: Option<Vec<String>>,
}

impl CreateProductRequest {
    fn validate(&self) -> Result<(), ApiError> {
        let mut errors = Vec::new();
        if self.name.trim().is_empty() {
            errors.push(FieldError::new("name", "is required"));
        }
        if self.category_id.trim().is_empty() {
            errors.push(FieldError::new("categoryId", "is required"));
        }
        if self.price_per_kg < Decimal::ZERO {
            errors.push(FieldError::new("pricePerKg", "must not be negative"));
        }
        if self.available_stock < 0 {
            errors.push(FieldError::new("availableStock", "must not be negative"));
        }
        if let Some(status) = &self.status {
            if !PRODUCT_STATUSES.contains(&status.as_str()) {
                errors.push(FieldError::new(
                    "status",
                    "must be one of active, sold_out, draft",
                ));
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ApiError::invalid_fields("Invalid payload", errors))
        }
    }
}

pub async fn create_product(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Json(req): Json<CreateProductRequest>,
) -> Result<Json<Product>, ApiError> {
    req.validate()?;
    let mut conn = state.db.get()?;
    let product = storage::products::create_product(
        &mut conn,
        &NewProduct {
            id: Uuid::new_v4().to_string(),
            farmer_id: caller.id().to_string(),
            category_id: req.category_id,
            name: req.name,
            description: req.description,
            price_per_kg: req.price_per_kg,
            available_stock: req.available_stock,
            unit: req.unit,
            is_organic: req.is_organic,
            allow_pre_order: req.allow_pre_order,
            harvest_date: req.harvest_date,
            expiry_date: req.expiry_date,
            quality_grade: req.quality_grade,
            status: req.status,
            images: req.images,
        },
    )?;
    Ok(Json(product))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    pub category_id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub price_per_kg: Option<Decimal>,
    pub available_stock: Option<i32>,
    pub unit: Option<String>,
    pub is_organic: Option<bool>,
    pub allow_pre_order: Option<bool>,
    pub harvest_date: Option<NaiveDateTime>,
    pub expiry_date: Option<NaiveDateTime>,
    pub quality_grade: Option<String>,
    pub status: Option<String>,
    pub images: Option<Vec<String>>,
}

impl UpdateProductRequest {
    fn validate(&self) -> Result<(), ApiError> {
        let mut errors = Vec::new();
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                errors.push(FieldError::new("name", "must not be empty"));
            }
        }
        if let Some(price) = &self.price_per_kg {
            if *price < Decimal::ZERO {
                errors.push(FieldError::new("pricePerKg", "must not be negative"));
            }
        }
        if let Some(stock) = self.available_stock {
            if stock < 0 {
                errors.push(FieldError::new("availableStock", "must not be negative"));
            }
        }
        if let Some(status) = &self.status {
            if !PRODUCT_STATUSES.contains(&status.as_str()) {
                errors.push(FieldError::new(
                    "status",
                    "must be one of active, sold_out, draft",
                ));
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ApiError::invalid_fields("Invalid payload", errors))
        }
    }

    fn into_patch(self) -> ProductPatch {
        ProductPatch {
            category_id: self.category_id,
            name: self.name,
            description: self.description,
            price_per_kg: self.price_per_kg,
            available_stock: self.available_stock,
            unit: self.unit,
            is_organic: self.is_organic,
            allow_pre_order: self.allow_pre_order,
            harvest_date: self.harvest_date,
            expiry_date: self.expiry_date,
            quality_grade: self.quality_grade,
            status: self.status,
            images: self.images,
        }
    }
}

pub async fn update_product(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(req): Json<UpdateProductRequest>,
) -> Result<Json<Product>, ApiError> {
    req.validate()?;
    let mut conn = state.db.get()?;
    let existing = storage::products::get_product(&mut conn, &id)?
        .ok_or_else(|| ApiError::not_found("Product not found"))?;
    auth::require_product_owner(&existing, caller.id())?;

    let updated = storage::products::update_product(&mut conn, &id, &req.into_patch())?
        .ok_or_else(|| ApiError::not_found("Product not found"))?;
    Ok(Json(updated))
}

pub async fn delete_product(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let mut conn = state.db.get()?;
    let existing = storage::products::get_product(&mut conn, &id)?
        .ok_or_else(|| ApiError::not_found("Product not found"))?;
    auth::require_product_owner(&existing, caller.id())?;

    storage::products::delete_product(&mut conn, &id)?;
    Ok(Json(json!({ "message": "Product deleted successfully" })))
}

pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<ProductCategory>>, ApiError> {
    let mut conn = state.db.get()?;
    let categories = storage::products::get_product_categories(&mut conn)?;
    Ok(Json(categories))
}
