//! Black-box tests: spawn the real router on an ephemeral port and drive
//! it over HTTP with minted JWTs.

use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::StatusCode;
use serde_json::{json, Value};

use stockpos_db::{Database, DbConfig};
use stockpos_rest_api::auth::Claims;

const JWT_SECRET: &str = "test-secret";

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Same router as prod, backed by a fresh in-memory database.
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let app = stockpos_rest_api::build_app(db, JWT_SECRET);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{addr}");

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        TestServer { base_url, handle }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn mint_jwt(role: &str) -> String {
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: "test-user".to_string(),
        role: role.to_string(),
        iat: now,
        exp: now + 600,
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .expect("failed to encode jwt")
}

async fn create_category(
    client: &reqwest::Client,
    srv: &TestServer,
    token: &str,
    name: &str,
) -> String {
    let res = client
        .post(srv.url("/products/category"))
        .bearer_auth(token)
        .json(&json!({ "name": name }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = res.json().await.unwrap();
    body["id"].as_str().unwrap().to_string()
}

fn product_body(product_id: i64, name: &str, category_id: &str, quantity: i64) -> Value {
    json!({
        "productId": product_id,
        "productName": name,
        "categoryId": category_id,
        "genderType": "MALE",
        "price": 4_000,
        "quantity": quantity,
        "actualPrice": 3_000,
        "salePrice": 3_500,
    })
}

// =============================================================================
// Auth
// =============================================================================

#[tokio::test]
async fn health_is_open() {
    let srv = TestServer::spawn().await;
    let res = reqwest::get(srv.url("/health")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn missing_or_invalid_token_is_unauthorized() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client.get(srv.url("/products")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = client
        .get(srv.url("/products"))
        .bearer_auth("not-a-jwt")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn unknown_role_is_forbidden_but_admin_passes() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .get(srv.url("/products"))
        .bearer_auth(mint_jwt("ghost"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    // admin carries the user right
    let res = client
        .get(srv.url("/products"))
        .bearer_auth(mint_jwt("admin"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

// =============================================================================
// Products
// =============================================================================

#[tokio::test]
async fn product_lifecycle() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let token = mint_jwt("user");

    let category_id = create_category(&client, &srv, &token, "Shirts").await;

    // create
    let res = client
        .post(srv.url("/products"))
        .bearer_auth(&token)
        .json(&product_body(1001, "Blue Shirt", &category_id, 10))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let created: Value = res.json().await.unwrap();
    assert_eq!(created["productId"], 1001);
    assert_eq!(created["productName"], "Blue Shirt");
    assert_eq!(created["quantity"], 10);

    // duplicate sku → conflict
    let res = client
        .post(srv.url("/products"))
        .bearer_auth(&token)
        .json(&product_body(1001, "Red Shirt", &category_id, 5))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["code"], "CONFLICT");

    // unknown category → not found
    let res = client
        .post(srv.url("/products"))
        .bearer_auth(&token)
        .json(&product_body(1002, "Green Hat", "no-such-category", 5))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    // list: category join + salesCount present
    let res = client
        .get(srv.url("/products"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let page: Value = res.json().await.unwrap();
    assert_eq!(page["totalItems"], 1);
    assert_eq!(page["products"][0]["category"]["name"], "Shirts");
    assert_eq!(page["products"][0]["salesCount"], 0);
}

#[tokio::test]
async fn create_rejects_bad_input() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let token = mint_jwt("user");
    let category_id = create_category(&client, &srv, &token, "Shirts").await;

    let mut body = product_body(1001, "Blue Shirt", &category_id, 10);
    body["price"] = json!(-5);

    let res = client
        .post(srv.url("/products"))
        .bearer_auth(&token)
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let err: Value = res.json().await.unwrap();
    assert_eq!(err["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn update_product_flow() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let token = mint_jwt("user");
    let category_id = create_category(&client, &srv, &token, "Shirts").await;

    client
        .post(srv.url("/products"))
        .bearer_auth(&token)
        .json(&product_body(1001, "Blue Shirt", &category_id, 10))
        .send()
        .await
        .unwrap();

    // partial update
    let res = client
        .patch(srv.url("/products/update/1001"))
        .bearer_auth(&token)
        .json(&json!({ "quantity": 30, "price": 4_500 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let updated: Value = res.json().await.unwrap();
    assert_eq!(updated["quantity"], 30);
    assert_eq!(updated["price"], 4_500);
    assert_eq!(updated["productName"], "Blue Shirt");

    // empty change set
    let res = client
        .patch(srv.url("/products/update/1001"))
        .bearer_auth(&token)
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // unknown sku
    let res = client
        .patch(srv.url("/products/update/9999"))
        .bearer_auth(&token)
        .json(&json!({ "quantity": 1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

// =============================================================================
// Sale batch
// =============================================================================

#[tokio::test]
async fn sell_products_flow() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let token = mint_jwt("user");
    let category_id = create_category(&client, &srv, &token, "Shirts").await;

    client
        .post(srv.url("/products"))
        .bearer_auth(&token)
        .json(&product_body(1001, "Blue Shirt", &category_id, 10))
        .send()
        .await
        .unwrap();

    // sell 4 units
    let res = client
        .post(srv.url("/products/sell-products"))
        .bearer_auth(&token)
        .json(&json!([{ "productId": 1001, "quantity": 4, "totalPrice": 16_000 }]))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = client
        .get(srv.url("/products"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let page: Value = res.json().await.unwrap();
    assert_eq!(page["products"][0]["quantity"], 6);
    assert_eq!(page["products"][0]["salesCount"], 1);

    // oversell → 422, stock untouched
    let res = client
        .post(srv.url("/products/sell-products"))
        .bearer_auth(&token)
        .json(&json!([{ "productId": 1001, "quantity": 50, "totalPrice": 200_000 }]))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let err: Value = res.json().await.unwrap();
    assert_eq!(err["code"], "INSUFFICIENT_STOCK");

    // unknown sku in a batch → 404, nothing sold
    let res = client
        .post(srv.url("/products/sell-products"))
        .bearer_auth(&token)
        .json(&json!([
            { "productId": 1001, "quantity": 1, "totalPrice": 4_000 },
            { "productId": 9999, "quantity": 1, "totalPrice": 4_000 },
        ]))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = client
        .get(srv.url("/products"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let page: Value = res.json().await.unwrap();
    assert_eq!(page["products"][0]["quantity"], 6);
    assert_eq!(page["products"][0]["salesCount"], 1);
}

#[tokio::test]
async fn empty_sale_batch_is_rejected() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let token = mint_jwt("user");

    let res = client
        .post(srv.url("/products/sell-products"))
        .bearer_auth(&token)
        .json(&json!([]))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

// =============================================================================
// Pagination
// =============================================================================

#[tokio::test]
async fn product_listing_paginates() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let token = mint_jwt("user");
    let category_id = create_category(&client, &srv, &token, "Shirts").await;

    for sku in 1..=25 {
        let res = client
            .post(srv.url("/products"))
            .bearer_auth(&token)
            .json(&product_body(sku, &format!("Item {sku}"), &category_id, 5))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);
    }

    let res = client
        .get(srv.url("/products?limit=10&page=2&sortBy=productId&sortType=asc"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let page: Value = res.json().await.unwrap();

    assert_eq!(page["totalItems"], 25);
    assert_eq!(page["totalPages"], 3);
    assert_eq!(page["currentPage"], 2);
    assert_eq!(page["nextPage"], 3);
    let products = page["products"].as_array().unwrap();
    assert_eq!(products.len(), 10);
    assert_eq!(products[0]["productId"], 11);
    assert_eq!(products[9]["productId"], 20);
}

#[tokio::test]
async fn unlisted_sort_column_is_rejected() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let token = mint_jwt("user");

    let res = client
        .get(srv.url("/products?sortBy=password"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

// =============================================================================
// Categories
// =============================================================================

#[tokio::test]
async fn category_listing_and_conflicts() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let token = mint_jwt("user");

    create_category(&client, &srv, &token, "Shirts").await;
    create_category(&client, &srv, &token, "Shoes").await;

    // duplicate name → conflict
    let res = client
        .post(srv.url("/products/category"))
        .bearer_auth(&token)
        .json(&json!({ "name": "Shirts" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let res = client
        .get(srv.url("/products/category?sortBy=name&sortType=asc"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let page: Value = res.json().await.unwrap();
    assert_eq!(page["totalItems"], 2);
    assert_eq!(page["categories"][0]["name"], "Shirts");
    assert_eq!(page["categories"][1]["name"], "Shoes");
}
