use axum::extract::{DefaultBodyLimit, Request, State};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post, put};
use axum::Router;
use std::net::SocketAddr;
use tower_http::services::ServeDir;

mod auth;
mod config;
mod db;
mod errors;
mod handlers;
mod models;
mod schema;
mod storage;

use errors::ApiError;

#[derive(Clone)]
pub struct AppState {
    pub config: config::AppConfig,
    pub db: db::DbPool,
}

async fn authenticate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = request
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .ok_or_else(|| ApiError::unauthorized("Missing Authorization header"))?;
    let token = auth_header
        .to_str()
        .ok()
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| ApiError::unauthorized("Invalid Authorization header format"))?;
    let user_id = auth::validate_token(token, &state.config.jwt_secret)
        .map_err(|_| ApiError::unauthorized("Invalid or expired token"))?;

    request.extensions_mut().insert(auth::AuthUser::new(user_id));
    Ok(next.run(request).await)
}

pub fn build_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/api/auth/user", get(handlers::users::get_current_user))
        .route(
            "/api/profile",
            post(handlers::users::create_profile).put(handlers::users::update_profile),
        )
        .route("/api/user/role", put(handlers::users::update_role))
        .route("/api/products", post(handlers::products::create_product))
        .route(
            "/api/products/:id",
            put(handlers::products::update_product).delete(handlers::products::delete_product),
        )
        .route(
            "/api/orders",
            get(handlers::orders::list_orders).post(handlers::orders::create_order),
        )
        .route("/api/orders/:id", get(handlers::orders::get_order))
        .route(
            "/api/orders/:id/status",
            put(handlers::orders::update_order_status),
        )
        .route(
            "/api/messages",
            get(handlers::messages::list_messages).post(handlers::messages::create_message),
        )
        .route("/api/messages/mark-read", put(handlers::messages::mark_read))
        .route(
            "/api/profile/verify",
            post(handlers::verifications::submit_verification)
                .get(handlers::verifications::get_my_verification),
        )
        .route(
            "/api/profile/verify/:id/review",
            put(handlers::verifications::review_verification),
        )
        .route(
            "/api/uploads/id-image",
            // Image size is the client's concern; leave room beyond the
            // default body cap.
            post(handlers::uploads::upload_id_image)
                .layer(DefaultBodyLimit::max(10 * 1024 * 1024)),
        )
        .layer(middleware::from_fn_with_state(state.clone(), authenticate));

    Router::new()
        .route("/", get(|| async { "Hello, Farm Marketplace!" }))
        .route("/api/auth/login", post(handlers::users::login))
        .route("/api/products", get(handlers::products::list_products))
        .route("/api/products/:id", get(handlers::products::get_product))
        .route("/api/categories", get(handlers::products::list_categories))
        .nest_service("/uploads", ServeDir::new(state.config.upload_dir.clone()))
        .merge(protected)
        .with_state(state)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    let config = config::AppConfig::load()?;
    log::info!("Loaded config, serving on port {}", config.port);

    let pool = db::init_pool(&config.database_url)?;
    {
        let mut conn = pool.get()?;
        db::run_migrations(&mut conn).map_err(|e| format!("Failed to run migrations: {}", e))?;
    }
    log::info!("Database ready");

    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));
    log::info!("Starting server on {}", addr);

    let state = AppState { config, db: pool };
    let app = build_router(state);
    axum::serve(
        tokio::net::TcpListener::bind(addr).await?,
        app.into_make_service(),
    )
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request as HttpRequest, StatusCode};
    use http_body_util::BodyExt;
    use tower::util::ServiceExt;

    const TEST_SECRET: &str = "test-secret";

    fn test_state(admins: &[&str]) -> AppState {
        AppState {
            config: config::AppConfig {
                database_url: "postgres://localhost/unreachable".to_string(),
                port: 0,
                jwt_secret: TEST_SECRET.to_string(),
                admin_users: admins.iter().map(|s| s.to_string()).collect(),
                upload_dir: std::env::temp_dir()
                    .join("farm-marketplace-test-uploads")
                    .to_string_lossy()
                    .into_owned(),
            },
            db: db::lazy_pool("postgres://localhost/unreachable"),
        }
    }

    fn bearer(user_id: &str) -> String {
        format!("Bearer {}", auth::create_token(user_id, TEST_SECRET).unwrap())
    }

    async fn send(request: HttpRequest<Body>) -> axum::response::Response {
        build_router(test_state(&["admin-1"]))
            .oneshot(request)
            .await
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn the_root_route_greets() {
        let response = send(
            HttpRequest::builder()
                .uri("/")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn protected_routes_require_an_authorization_header() {
        let response = send(
            HttpRequest::builder()
                .uri("/api/auth/user")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(response).await;
        assert_eq!(body["message"], "Missing Authorization header");
    }

    #[tokio::test]
    async fn a_header_without_bearer_prefix_is_rejected() {
        let response = send(
            HttpRequest::builder()
                .uri("/api/auth/user")
                .header("Authorization", "Token abc")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn a_forged_token_is_rejected() {
        let forged = auth::create_token("user-1", "wrong-secret").unwrap();
        let response = send(
            HttpRequest::builder()
                .uri("/api/auth/user")
                .header("Authorization", format!("Bearer {}", forged))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn an_unknown_role_is_a_validation_error() {
        let response = send(
            HttpRequest::builder()
                .method("PUT")
                .uri("/api/user/role")
                .header("Authorization", bearer("user-1"))
                .header("Content-Type", "application/json")
                .body(Body::from(r#"{"role":"admin"}"#))
                .unwrap(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["message"], "Invalid role");
    }

    #[tokio::test]
    async fn reviews_from_non_admins_are_forbidden() {
        let response = send(
            HttpRequest::builder()
                .method("PUT")
                .uri("/api/profile/verify/v-1/review")
                .header("Authorization", bearer("farmer-1"))
                .header("Content-Type", "application/json")
                .body(Body::from(r#"{"status":"approved"}"#))
                .unwrap(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn reviews_accept_only_approved_or_rejected() {
        let response = send(
            HttpRequest::builder()
                .method("PUT")
                .uri("/api/profile/verify/v-1/review")
                .header("Authorization", bearer("admin-1"))
                .header("Content-Type", "application/json")
                .body(Body::from(r#"{"status":"escalated"}"#))
                .unwrap(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["message"], "Invalid status");
    }

    #[tokio::test]
    async fn a_short_full_name_fails_verification_submission() {
        let response = send(
            HttpRequest::builder()
                .method("POST")
                .uri("/api/profile/verify")
                .header("Authorization", bearer("farmer-1"))
                .header("Content-Type", "application/json")
                .body(Body::from(r#"{"fullName":"A"}"#))
                .unwrap(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["errors"][0]["field"], "fullName");
    }

    #[tokio::test]
    async fn an_order_without_items_fails_validation() {
        let payload = r#"{"farmerId":"farmer-1","totalAmount":"0.00","items":[]}"#;
        let response = send(
            HttpRequest::builder()
                .method("POST")
                .uri("/api/orders")
                .header("Authorization", bearer("buyer-1"))
                .header("Content-Type", "application/json")
                .body(Body::from(payload))
                .unwrap(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["errors"][0]["field"], "items");
    }

    #[tokio::test]
    async fn an_order_with_inconsistent_totals_fails_validation() {
        let payload = r#"{
            "farmerId": "farmer-1",
            "totalAmount": "99.00",
            "items": [
                {"productId": "p-1", "quantity": 2, "pricePerUnit": "5.00", "totalPrice": "10.00"}
            ]
        }"#;
        let response = send(
            HttpRequest::builder()
                .method("POST")
                .uri("/api/orders")
                .header("Authorization", bearer("buyer-1"))
                .header("Content-Type", "application/json")
                .body(Body::from(payload))
                .unwrap(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["errors"][0]["field"], "totalAmount");
    }

    #[tokio::test]
    async fn an_empty_message_fails_validation() {
        let payload = r#"{"receiverId":"buyer-1","content":"   "}"#;
        let response = send(
            HttpRequest::builder()
                .method("POST")
                .uri("/api/messages")
                .header("Authorization", bearer("farmer-1"))
                .header("Content-Type", "application/json")
                .body(Body::from(payload))
                .unwrap(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["errors"][0]["field"], "content");
    }
}
