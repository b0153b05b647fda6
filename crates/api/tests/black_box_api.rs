use chrono::{Duration as ChronoDuration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::StatusCode;
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;

use backoffice_identity::JwtClaims;
use backoffice_infra::Settings;

const JWT_SECRET: &str = "test-secret";
const CPF: &str = "52998224725";

struct TestServer {
    base_url: String,
    client: reqwest::Client,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        Self::spawn_with_shutdown(CancellationToken::new()).await
    }

    async fn spawn_with_shutdown(shutdown: CancellationToken) -> Self {
        // Same router as prod with in-memory adapters, bound to an ephemeral port.
        let settings = Settings::from_lookup(|key| match key {
            "JWT_SECRET" => Some(JWT_SECRET.to_string()),
            _ => None,
        })
        .expect("settings");
        let app = backoffice_api::app::build_app(&settings, shutdown)
            .await
            .expect("failed to build app");
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            client: reqwest::Client::new(),
            handle,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post(&self, path: &str, body: Value) -> reqwest::Response {
        self.client.post(self.url(path)).json(&body).send().await.unwrap()
    }

    async fn register_employee(&self, email: &str, password: &str) {
        let res = self
            .post(
                "/employees",
                json!({ "name": "Maria Souza", "email": email, "password": password }),
            )
            .await;
        assert_eq!(res.status(), StatusCode::CREATED);
    }

    /// Registers an employee and signs in as them.
    async fn admin_token(&self) -> String {
        self.register_employee("maria@example.com", "admin-pass-1").await;
        let res = self
            .post(
                "/users/employee/sign-in",
                json!({ "email": "maria@example.com", "password": "admin-pass-1" }),
            )
            .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = res.json().await.unwrap();
        body["access_token"].as_str().unwrap().to_string()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn mint_jwt(jwt_secret: &str, groups: &[&str]) -> String {
    let now = Utc::now();
    let claims = JwtClaims {
        sub: "user-test".to_string(),
        email: Some("tester@example.com".to_string()),
        groups: groups.iter().map(|g| g.to_string()).collect(),
        iat: now.timestamp(),
        exp: (now + ChronoDuration::minutes(10)).timestamp(),
    };

    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(jwt_secret.as_bytes()),
    )
    .expect("failed to encode jwt")
}

fn customer_body(email: &str, tax_id: &str) -> Value {
    json!({
        "name": "João Silva",
        "email": email,
        "tax_id": tax_id,
        "password": "customer-pass",
    })
}

fn product_body(name: &str, category: &str) -> Value {
    json!({
        "name": name,
        "description": "Pão brioche, carne e queijo",
        "price": "25.90",
        "category": category,
        "active": true,
    })
}

#[tokio::test]
async fn health_is_public() {
    let srv = TestServer::spawn().await;
    let res = srv.client.get(srv.url("/health")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn back_office_routes_require_an_admin_token() {
    let srv = TestServer::spawn().await;

    let res = srv.client.get(srv.url("/customers")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let wrong_secret = mint_jwt("other-secret", &["admin"]);
    let res = srv
        .client
        .get(srv.url("/customers"))
        .bearer_auth(wrong_secret)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let customer_only = mint_jwt(JWT_SECRET, &["customer"]);
    let res = srv
        .client
        .get(srv.url("/customers"))
        .bearer_auth(customer_only)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let admin = mint_jwt(JWT_SECRET, &["admin"]);
    let res = srv
        .client
        .get(srv.url("/customers"))
        .bearer_auth(admin)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn customer_lifecycle_register_list_update_delete() {
    let srv = TestServer::spawn().await;
    let token = srv.admin_token().await;

    let res = srv.post("/customers", customer_body("joao@example.com", CPF)).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let created: Value = res.json().await.unwrap();
    let id = created["id"].as_str().unwrap().to_string();

    let res = srv
        .client
        .get(srv.url("/customers"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let listed: Vec<Value> = res.json().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["email"], "joao@example.com");

    // E-mail and tax id are not part of an update.
    let res = srv
        .client
        .put(srv.url(&format!("/customers/{id}")))
        .bearer_auth(&token)
        .json(&json!({ "id": id, "name": "João S.", "active": true }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = srv
        .client
        .delete(srv.url(&format!("/customers/{id}")))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = srv
        .client
        .delete(srv.url(&format!("/customers/{id}")))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn duplicate_and_invalid_customers_are_rejected_with_notifications() {
    let srv = TestServer::spawn().await;

    let res = srv.post("/customers", customer_body("joao@example.com", CPF)).await;
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = srv.post("/customers", customer_body("other@example.com", CPF)).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["notifications"][0]["message"], "Customer already exists");

    let res = srv.post("/customers", customer_body("new@example.com", "12345678900")).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert!(
        body["notifications"]
            .as_array()
            .unwrap()
            .iter()
            .any(|n| n["key"] == "tax_id")
    );
}

#[tokio::test]
async fn an_employee_email_cannot_be_reused_by_a_customer() {
    let srv = TestServer::spawn().await;
    srv.register_employee("shared@example.com", "admin-pass-1").await;

    let res = srv.post("/customers", customer_body("shared@example.com", CPF)).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn updates_without_the_active_flag_are_rejected() {
    let srv = TestServer::spawn().await;
    let token = mint_jwt(JWT_SECRET, &["admin"]);

    let res = srv.post("/customers", customer_body("joao@example.com", CPF)).await;
    let created: Value = res.json().await.unwrap();
    let id = created["id"].as_str().unwrap().to_string();

    let res = srv
        .client
        .put(srv.url(&format!("/customers/{id}")))
        .bearer_auth(&token)
        .json(&json!({ "id": id, "name": "João Silva", "active": false }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = srv
        .client
        .put(srv.url(&format!("/customers/{id}")))
        .bearer_auth(&token)
        .json(&json!({ "id": id, "name": "João S." }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // Still deactivated, so absent from the active listing.
    let res = srv
        .client
        .get(srv.url("/customers"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let listed: Vec<Value> = res.json().await.unwrap();
    assert!(listed.is_empty());

    let res = srv
        .client
        .post(srv.url("/products"))
        .bearer_auth(&token)
        .json(&product_body("X-Burger", "Lanche"))
        .send()
        .await
        .unwrap();
    let created: Value = res.json().await.unwrap();
    let product_id = created["id"].as_str().unwrap().to_string();

    let mut without_active = product_body("X-Salada", "Lanche");
    without_active.as_object_mut().unwrap().remove("active");
    let res = srv
        .client
        .put(srv.url(&format!("/products/{product_id}")))
        .bearer_auth(&token)
        .json(&without_active)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn requests_after_shutdown_are_cancelled() {
    let shutdown = CancellationToken::new();
    let srv = TestServer::spawn_with_shutdown(shutdown.clone()).await;
    shutdown.cancel();

    let res = srv.post("/customers", customer_body("joao@example.com", CPF)).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["notifications"][0]["message"], "request cancelled");

    let res = srv.client.get(srv.url("/products")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn update_rejects_mismatched_ids() {
    let srv = TestServer::spawn().await;
    let token = mint_jwt(JWT_SECRET, &["admin"]);

    let res = srv
        .client
        .put(srv.url("/customers/0190a0a0-0000-7000-8000-000000000001"))
        .bearer_auth(&token)
        .json(&json!({
            "id": "0190a0a0-0000-7000-8000-000000000002",
            "name": "João",
            "active": true,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "id_mismatch");
}

#[tokio::test]
async fn product_lifecycle_and_category_listing() {
    let srv = TestServer::spawn().await;
    let token = mint_jwt(JWT_SECRET, &["admin"]);

    let res = srv
        .client
        .post(srv.url("/products"))
        .json(&product_body("X-Burger", "Lanche"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = srv
        .client
        .post(srv.url("/products"))
        .bearer_auth(&token)
        .json(&product_body("X-Burger", "Lanche"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let created: Value = res.json().await.unwrap();
    let id = created["id"].as_str().unwrap().to_string();

    let res = srv.client.get(srv.url(&format!("/products/{id}"))).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let product: Value = res.json().await.unwrap();
    assert_eq!(product["category"], "Lanche");
    assert_eq!(product["price"], "25.90");

    let res = srv
        .client
        .get(srv.url("/products/category?category=Lanche"))
        .send()
        .await
        .unwrap();
    let listed: Vec<Value> = res.json().await.unwrap();
    assert_eq!(listed.len(), 1);

    // Unknown names and non-canonical casing yield an empty list.
    for category in ["Pizza", "lanche"] {
        let res = srv
            .client
            .get(srv.url(&format!("/products/category?category={category}")))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let listed: Vec<Value> = res.json().await.unwrap();
        assert!(listed.is_empty());
    }

    let res = srv
        .client
        .put(srv.url(&format!("/products/{id}")))
        .bearer_auth(&token)
        .json(&product_body("X-Salada", "Lanche"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = srv
        .client
        .delete(srv.url(&format!("/products/{id}")))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = srv.client.get(srv.url(&format!("/products/{id}"))).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn products_with_unknown_categories_or_bad_prices_are_rejected() {
    let srv = TestServer::spawn().await;
    let token = mint_jwt(JWT_SECRET, &["admin"]);

    let res = srv
        .client
        .post(srv.url("/products"))
        .bearer_auth(&token)
        .json(&product_body("X-Burger", "Pizza"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["notifications"][0]["key"], "category");

    let mut free = product_body("X-Burger", "Lanche");
    free["price"] = json!("0");
    let res = srv
        .client
        .post(srv.url("/products"))
        .bearer_auth(&token)
        .json(&free)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let mut sub_cent = product_body("X-Burger", "Lanche");
    sub_cent["price"] = json!("6.505");
    let res = srv
        .client
        .post(srv.url("/products"))
        .bearer_auth(&token)
        .json(&sub_cent)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["notifications"][0]["key"], "price");
}

#[tokio::test]
async fn customer_sign_in_issues_a_token_without_back_office_access() {
    let srv = TestServer::spawn().await;
    srv.post("/customers", customer_body("joao@example.com", CPF)).await;

    let res = srv
        .post(
            "/users/customer/sign-in",
            json!({ "tax_id": CPF, "password": "wrong-password" }),
        )
        .await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = srv
        .post(
            "/users/customer/sign-in",
            json!({ "tax_id": CPF, "password": "customer-pass" }),
        )
        .await;
    assert_eq!(res.status(), StatusCode::OK);
    let tokens: Value = res.json().await.unwrap();
    let access = tokens["access_token"].as_str().unwrap();

    let res = srv
        .client
        .get(srv.url("/customers"))
        .bearer_auth(access)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn employee_token_opens_back_office_routes() {
    let srv = TestServer::spawn().await;
    let token = srv.admin_token().await;

    let res = srv
        .client
        .get(srv.url("/customers"))
        .bearer_auth(token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn credential_recovery_flows() {
    let srv = TestServer::spawn().await;
    srv.register_employee("maria@example.com", "admin-pass-1").await;

    let res = srv
        .post(
            "/users/email-verification/confirm",
            json!({ "email": "maria@example.com", "code": "000000x" }),
        )
        .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = srv
        .post(
            "/users/password-recovery/request",
            json!({ "email": "maria@example.com" }),
        )
        .await;
    assert_eq!(res.status(), StatusCode::OK);

    let res = srv
        .post(
            "/users/password-recovery/request",
            json!({ "email": "nobody@example.com" }),
        )
        .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = srv
        .post(
            "/users/password-recovery/reset",
            json!({ "email": "maria@example.com", "code": "abcdef", "new_password": "short" }),
        )
        .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert!(
        body["notifications"]
            .as_array()
            .unwrap()
            .iter()
            .any(|n| n["key"] == "new_password")
    );
}

#[tokio::test]
async fn missing_body_is_an_invalid_argument() {
    let srv = TestServer::spawn().await;
    let res = srv
        .client
        .post(srv.url("/customers"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "invalid_argument");
}
