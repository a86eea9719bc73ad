use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::errors::ApiError;
use crate::models::{Order, Product};

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String, // Identity-provider subject id
    exp: usize,  // Expiration time
}

/// Caller identity resolved by the authentication middleware.
#[derive(Clone, Debug)]
pub struct AuthUser(String);

impl AuthUser {
    pub fn new(id: String) -> Self {
        Self(id)
    }

    pub fn id(&self) -> &str {
        &self.0
    }
}

pub fn create_token(user_id: &str, jwt_secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
    let expiration = (Utc::now() + Duration::hours(24)).timestamp() as usize;
    let claims = Claims {
        sub: user_id.to_string(),
        exp: expiration,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_secret.as_bytes()),
    )
}

pub fn validate_token(token: &str, jwt_secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt_secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(token_data.claims.sub)
}

pub fn require_product_owner(product: &Product, caller_id: &str) -> Result<(), ApiError> {
    if product.farmer_id == caller_id {
        Ok(())
    } else {
        Err(ApiError::forbidden("Unauthorized"))
    }
}

pub fn require_order_participant(order: &Order, caller_id: &str) -> Result<(), ApiError> {
    if order.buyer_id == caller_id || order.farmer_id == caller_id {
        Ok(())
    } else {
        Err(ApiError::forbidden("Unauthorized"))
    }
}

pub fn require_order_farmer(order: &Order, caller_id: &str) -> Result<(), ApiError> {
    if order.farmer_id == caller_id {
        Ok(())
    } else {
        Err(ApiError::forbidden("Unauthorized"))
    }
}

pub fn require_admin(admin_users: &HashSet<String>, caller_id: &str) -> Result<(), ApiError> {
    if admin_users.contains(caller_id) {
        Ok(())
    } else {
        Err(ApiError::forbidden("Unauthorized"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    #[test]
    fn token_round_trip_preserves_subject() {
        let token = create_token("user-42", "secret").unwrap();
        assert_eq!(validate_token(&token, "secret").unwrap(), "user-42");
    }

    #[test]
    fn token_with_wrong_secret_is_rejected() {
        let token = create_token("user-42", "secret").unwrap();
        assert!(validate_token(&token, "other-secret").is_err());
    }

    #[test]
    fn garbage_token_is_rejected() {
        assert!(validate_token("not-a-jwt", "secret").is_err());
    }

    fn order_between(buyer: &str, farmer: &str) -> Order {
        let ts = NaiveDate::from_ymd_opt(2025, 6, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        Order {
            id: "order-1".to_string(),
            buyer_id: buyer.to_string(),
            farmer_id: farmer.to_string(),
            status: "pending".to_string(),
            total_amount: Decimal::new(1000, 2),
            delivery_fee: Decimal::ZERO,
            delivery_address: None,
            notes: None,
            created_at: ts,
            updated_at: ts,
        }
    }

    #[test]
    fn order_access_is_limited_to_participants() {
        let order = order_between("buyer-1", "farmer-1");
        assert!(require_order_participant(&order, "buyer-1").is_ok());
        assert!(require_order_participant(&order, "farmer-1").is_ok());
        assert!(require_order_participant(&order, "stranger").is_err());
    }

    #[test]
    fn only_the_farmer_may_update_order_status() {
        let order = order_between("buyer-1", "farmer-1");
        assert!(require_order_farmer(&order, "farmer-1").is_ok());
        assert!(require_order_farmer(&order, "buyer-1").is_err());
    }

    #[test]
    fn product_owner_check_matches_farmer_id() {
        let ts = NaiveDate::from_ymd_opt(2025, 6, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        let product = Product {
            id: "p-1".to_string(),
            farmer_id: "farmer-1".to_string(),
            category_id: "cat-1".to_string(),
            name: "Maize".to_string(),
            description: None,
            price_per_kg: Decimal::new(500, 2),
            available_stock: 10,
            unit: "kg".to_string(),
            is_organic: false,
            allow_pre_order: false,
            harvest_date: None,
            expiry_date: None,
            quality_grade: None,
            status: "active".to_string(),
            images: None,
            created_at: ts,
            updated_at: ts,
        };
        assert!(require_product_owner(&product, "farmer-1").is_ok());
        assert!(require_product_owner(&product, "farmer-2").is_err());
    }

    #[test]
    fn admin_check_uses_the_allow_list() {
        let admins: HashSet<String> = ["admin-1".to_string()].into_iter().collect();
        assert!(require_admin(&admins, "admin-1").is_ok());
        assert!(require_admin(&admins, "farmer-1").is_err());
    }
}
