use chrono::NaiveDateTime;
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::schema::{
    messages, order_items, orders, product_categories, products, user_profiles, users,
    verifications,
};

pub const USER_ROLES: [&str; 2] = ["farmer", "buyer"];
pub const PRODUCT_STATUSES: [&str; 3] = ["active", "sold_out", "draft"];
pub const ORDER_STATUSES: [&str; 7] = [
    "pending",
    "accepted",
    "rejected",
    "packed",
    "dispatched",
    "delivered",
    "cancelled",
];
pub const REVIEW_STATUSES: [&str; 2] = ["approved", "rejected"];

#[derive(Debug, Clone, Serialize, Deserialize, Queryable)]
#[diesel(table_name = users)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub profile_image_url: Option<String>,
    pub role: String,
    pub is_verified: bool,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Insert-or-update payload keyed by the identity-provider subject id.
/// Omitted fields fall back to column defaults on insert and are left
/// untouched on conflict.
#[derive(Debug, Clone, Default, Deserialize, Insertable, AsChangeset)]
#[diesel(table_name = users)]
#[serde(rename_all = "camelCase")]
pub struct UpsertUser {
    pub id: String,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub profile_image_url: Option<String>,
    pub role: Option<String>,
    pub is_verified: Option<bool>,
    pub phone: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Queryable)]
#[diesel(table_name = user_profiles)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub user_id: String,
    pub bio: Option<String>,
    pub farm_name: Option<String>,
    pub farm_size: Option<String>,
    pub farm_location: Option<String>,
    pub coordinates: Option<String>,
    pub specialization: Option<String>,
    pub years_experience: Option<i32>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = user_profiles)]
pub struct NewUserProfile {
    pub id: String,
    pub user_id: String,
    pub bio: Option<String>,
    pub farm_name: Option<String>,
    pub farm_size: Option<String>,
    pub farm_location: Option<String>,
    pub coordinates: Option<String>,
    pub specialization: Option<String>,
    pub years_experience: Option<i32>,
}

#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = user_profiles)]
pub struct UserProfilePatch {
    pub bio: Option<String>,
    pub farm_name: Option<String>,
    pub farm_size: Option<String>,
    pub farm_location: Option<String>,
    pub coordinates: Option<String>,
    pub specialization: Option<String>,
    pub years_experience: Option<i32>,
}

impl UserProfilePatch {
    pub fn is_empty(&self) -> bool {
        self.bio.is_none()
            && self.farm_name.is_none()
            && self.farm_size.is_none()
            && self.farm_location.is_none()
            && self.coordinates.is_none()
            && self.specialization.is_none()
            && self.years_experience.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Queryable)]
#[diesel(table_name = product_categories)]
#[serde(rename_all = "camelCase")]
pub struct ProductCategory {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, Queryable)]
#[diesel(table_name = products)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub farmer_id: String,
    pub category_id: String,
    pub name: String,
    pub description: Option<String>,
    pub price_per_kg: Decimal,
    pub available_stock: i32,
    pub unit: String,
    pub is_organic: bool,
    pub allow_pre_order: bool,
    pub harvest_date: Option<NaiveDateTime>,
    pub expiry_date: Option<NaiveDateTime>,
    pub quality_grade: Option<String>,
    pub status: String,
    pub images: Option<Vec<String>>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = products)]
pub struct NewProduct {
    pub id: String,
    pub farmer_id: String,
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

#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = products)]
pub struct ProductPatch {
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

impl ProductPatch {
    pub fn is_empty(&self) -> bool {
        self.category_id.is_none()
            && self.name.is_none()
            && self.description.is_none()
            && self.price_per_kg.is_none()
            && self.available_stock.is_none()
            && self.unit.is_none()
            && self.is_organic.is_none()
            && self.allow_pre_order.is_none()
            && self.harvest_date.is_none()
            && self.expiry_date.is_none()
            && self.quality_grade.is_none()
            && self.status.is_none()
            && self.images.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Queryable)]
#[diesel(table_name = orders)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub buyer_id: String,
    pub farmer_id: String,
    pub status: String,
    pub total_amount: Decimal,
    pub delivery_fee: Decimal,
    pub delivery_address: Option<String>,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = orders)]
pub struct NewOrder {
    pub id: String,
    pub buyer_id: String,
    pub farmer_id: String,
    pub status: Option<String>,
    pub total_amount: Decimal,
    pub delivery_fee: Option<Decimal>,
    pub delivery_address: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Queryable)]
#[diesel(table_name = order_items)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: String,
    pub order_id: String,
    pub product_id: String,
    pub quantity: i32,
    pub price_per_unit: Decimal,
    pub total_price: Decimal,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = order_items)]
pub struct NewOrderItem {
    pub id: String,
    pub order_id: String,
    pub product_id: String,
    pub quantity: i32,
    pub price_per_unit: Decimal,
    pub total_price: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, Queryable)]
#[diesel(table_name = messages)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub sender_id: String,
    pub receiver_id: String,
    pub order_id: Option<String>,
    pub content: String,
    pub is_read: bool,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = messages)]
pub struct NewMessage {
    pub id: String,
    pub sender_id: String,
    pub receiver_id: String,
    pub order_id: Option<String>,
    pub content: String,
    pub is_read: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Queryable)]
#[diesel(table_name = verifications)]
#[serde(rename_all = "camelCase")]
pub struct Verification {
    pub id: String,
    pub user_id: String,
    pub full_name: String,
    pub id_number: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub farm_name: Option<String>,
    pub coordinates: Option<String>,
    pub id_image_url: Option<String>,
    pub status: String,
    pub notes: Option<String>,
    pub submitted_at: NaiveDateTime,
    pub reviewed_at: Option<NaiveDateTime>,
    pub reviewer_id: Option<String>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = verifications)]
pub struct NewVerification {
    pub id: String,
    pub user_id: String,
    pub full_name: String,
    pub id_number: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub farm_name: Option<String>,
    pub coordinates: Option<String>,
    pub id_image_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UserWithProfile {
    #[serde(flatten)]
    pub user: User,
    pub profile: Option<UserProfile>,
}

#[derive(Debug, Serialize)]
pub struct OrderWithItems {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample_product() -> Product {
        let ts = NaiveDate::from_ymd_opt(2025, 6, 1)
            .unwrap()
            .and_hms_opt(8, 30, 0)
            .unwrap();
        Product {
            id: "p-1".to_string(),
            farmer_id: "farmer-1".to_string(),
            category_id: "cat-1".to_string(),
            name: "Tomatoes".to_string(),
            description: None,
            price_per_kg: Decimal::new(1250, 2),
            available_stock: 40,
            unit: "kg".to_string(),
            is_organic: true,
            allow_pre_order: false,
            harvest_date: None,
            expiry_date: None,
            quality_grade: Some("A".to_string()),
            status: "active".to_string(),
            images: None,
            created_at: ts,
            updated_at: ts,
        }
    }

    #[test]
    fn product_serializes_with_camel_case_keys() {
        let value = serde_json::to_value(sample_product()).unwrap();
        assert_eq!(value["pricePerKg"], "12.50");
        assert_eq!(value["availableStock"], 40);
        assert_eq!(value["isOrganic"], true);
        assert!(value.get("price_per_kg").is_none());
    }

    #[test]
    fn user_with_profile_flattens_user_fields() {
        let ts = NaiveDate::from_ymd_opt(2025, 6, 1)
            .unwrap()
            .and_hms_opt(8, 30, 0)
            .unwrap();
        let payload = UserWithProfile {
            user: User {
                id: "u-1".to_string(),
                email: Some("farmer@example.com".to_string()),
                first_name: None,
                last_name: None,
                profile_image_url: None,
                role: "farmer".to_string(),
                is_verified: false,
                phone: None,
                location: None,
                created_at: ts,
                updated_at: ts,
            },
            profile: None,
        };
        let value = serde_json::to_value(payload).unwrap();
        assert_eq!(value["id"], "u-1");
        assert_eq!(value["isVerified"], false);
        assert_eq!(value["profile"], serde_json::Value::Null);
    }

    #[test]
    fn empty_patches_report_empty() {
        assert!(ProductPatch::default().is_empty());
        assert!(UserProfilePatch::default().is_empty());
        let patch = ProductPatch {
            available_stock: Some(3),
            ..ProductPatch::default()
        };
        assert!(!patch.is_empty());
    }
}
