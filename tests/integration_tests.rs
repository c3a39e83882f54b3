//! Integration tests for the Portfolio Server API
//!
//! These tests verify the complete request/response cycle for all endpoints.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use portfolio_server::{db::tables, open_store, routes, seed, AppState, Config, Row, Store};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

// Test configuration constants
const TEST_SECRET: &str = "test-secret-key";

// =============================================================================
// Test Helpers
// =============================================================================

/// Create a test configuration
fn test_config(temp_dir: &TempDir) -> Config {
    Config {
        server_host: "127.0.0.1".to_string(),
        server_port: 0,
        data_dir: temp_dir.path().display().to_string(),
        secret_key: TEST_SECRET.to_string(),
        access_token_expire_minutes: 60,
        bcrypt_cost: 4,
        allowed_origins: vec!["http://localhost:5173".to_string()],
        environment: "test".to_string(),
        log_requests: false,
    }
}

/// Create a store in a temporary directory with the default demo user
fn create_test_store(temp_dir: &TempDir) -> Store {
    let store = open_store(temp_dir.path()).expect("Failed to open test store");
    seed::ensure_default_user(&store, 4).expect("Failed to create demo user");
    store
}

/// Create a test app router
fn create_test_app(temp_dir: &TempDir) -> (Store, Router) {
    let store = create_test_store(temp_dir);
    let state = AppState::new(store.clone(), test_config(temp_dir));
    (store, routes::router(state))
}

/// Parse response body as JSON
async fn body_to_json(body: Body) -> Value {
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn make_request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Send a request and return (status, json body)
async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    (status, body_to_json(response.into_body()).await)
}

async fn get(app: &Router, uri: &str, token: &str) -> (StatusCode, Value) {
    send(app, make_request("GET", uri, Some(token), None)).await
}

async fn post(app: &Router, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
    send(app, make_request("POST", uri, Some(token), Some(body))).await
}

async fn put(app: &Router, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
    send(app, make_request("PUT", uri, Some(token), Some(body))).await
}

async fn delete(app: &Router, uri: &str, token: &str) -> (StatusCode, Value) {
    send(app, make_request("DELETE", uri, Some(token), None)).await
}

/// Log in as the demo user and return (token, user_id)
async fn login_demo(app: &Router) -> (String, String) {
    let (status, body) = send(
        app,
        make_request(
            "POST",
            "/api/v1/auth/login",
            None,
            Some(json!({ "username": "demo", "password": "demo" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    (
        body["access_token"].as_str().unwrap().to_string(),
        body["user_id"].as_str().unwrap().to_string(),
    )
}

/// Register a fresh user and return its token
async fn register(app: &Router, username: &str) -> String {
    let (status, body) = send(
        app,
        make_request(
            "POST",
            "/api/v1/auth/register",
            None,
            Some(json!({ "username": username, "password": "secret" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["access_token"].as_str().unwrap().to_string()
}

/// Create a portfolio for the token's user and return its id
async fn create_portfolio(app: &Router, token: &str, name: &str) -> String {
    let (status, body) = post(app, "/api/v1/portfolios", token, json!({ "name": name })).await;
    assert_eq!(status, StatusCode::OK);
    body["id"].as_str().unwrap().to_string()
}

// =============================================================================
// Health Check Tests
// =============================================================================

#[tokio::test]
async fn test_health_check_returns_healthy() {
    let temp_dir = TempDir::new().unwrap();
    let (_store, app) = create_test_app(&temp_dir);

    let (status, body) = send(&app, make_request("GET", "/health", None, None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert!(body["version"].is_string());
}

// =============================================================================
// Authentication Tests
// =============================================================================

#[tokio::test]
async fn test_login_demo_user() {
    let temp_dir = TempDir::new().unwrap();
    let (_store, app) = create_test_app(&temp_dir);

    let (status, body) = send(
        &app,
        make_request(
            "POST",
            "/api/v1/auth/login",
            None,
            Some(json!({ "username": "demo", "password": "demo" })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["token_type"], "bearer");
    assert_eq!(body["display_name"], "Demo User");
    assert!(!body["access_token"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_login_wrong_password() {
    let temp_dir = TempDir::new().unwrap();
    let (_store, app) = create_test_app(&temp_dir);

    let (status, body) = send(
        &app,
        make_request(
            "POST",
            "/api/v1/auth/login",
            None,
            Some(json!({ "username": "demo", "password": "nope" })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["detail"], "Incorrect username or password");
}

#[tokio::test]
async fn test_register_then_use_token() {
    let temp_dir = TempDir::new().unwrap();
    let (_store, app) = create_test_app(&temp_dir);

    let (status, body) = send(
        &app,
        make_request(
            "POST",
            "/api/v1/auth/register",
            None,
            Some(json!({ "username": " alice ", "password": "pw", "display_name": "Alice A" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["display_name"], "Alice A");
    let token = body["access_token"].as_str().unwrap().to_string();

    let (status, body) = get(&app, "/api/v1/portfolios", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    // Username was trimmed before storage
    let (status, _) = send(
        &app,
        make_request(
            "POST",
            "/api/v1/auth/login",
            None,
            Some(json!({ "username": "alice", "password": "pw" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_register_duplicate_username() {
    let temp_dir = TempDir::new().unwrap();
    let (store, app) = create_test_app(&temp_dir);

    let (status, body) = send(
        &app,
        make_request(
            "POST",
            "/api/v1/auth/register",
            None,
            Some(json!({ "username": "demo", "password": "other" })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Username already taken");
    assert_eq!(store.read_table(tables::USERS).unwrap().len(), 1);
}

#[tokio::test]
async fn test_register_blank_username() {
    let temp_dir = TempDir::new().unwrap();
    let (_store, app) = create_test_app(&temp_dir);

    let (status, _) = send(
        &app,
        make_request(
            "POST",
            "/api/v1/auth/register",
            None,
            Some(json!({ "username": "   ", "password": "pw" })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_falls_back_to_username_without_display_name() {
    let temp_dir = TempDir::new().unwrap();
    let (store, app) = create_test_app(&temp_dir);

    let password_hash = portfolio_server::security::hash_password("pw", 4).unwrap();
    store
        .append_row(
            tables::USERS,
            Row::new()
                .with("username", "nodisplay")
                .with("password_hash", password_hash)
                .with("display_name", ""),
        )
        .unwrap();

    let (status, body) = send(
        &app,
        make_request(
            "POST",
            "/api/v1/auth/login",
            None,
            Some(json!({ "username": "nodisplay", "password": "pw" })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["display_name"], "nodisplay");
}

#[tokio::test]
async fn test_body_missing_field_returns_json_detail() {
    let temp_dir = TempDir::new().unwrap();
    let (_store, app) = create_test_app(&temp_dir);
    let (token, _) = login_demo(&app).await;

    let (status, body) = post(&app, "/api/v1/portfolios", &token, json!({})).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["detail"].as_str().unwrap().contains("name"));
}

#[tokio::test]
async fn test_malformed_body_returns_json_detail() {
    let temp_dir = TempDir::new().unwrap();
    let (_store, app) = create_test_app(&temp_dir);

    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"username\": "))
        .unwrap();
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].is_string());
}

#[tokio::test]
async fn test_body_without_content_type_returns_json_detail() {
    let temp_dir = TempDir::new().unwrap();
    let (_store, app) = create_test_app(&temp_dir);

    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/auth/register")
        .body(Body::from(json!({ "username": "u", "password": "p" }).to_string()))
        .unwrap();
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert!(body["detail"].is_string());
}

#[tokio::test]
async fn test_missing_token_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let (_store, app) = create_test_app(&temp_dir);

    let response = app
        .clone()
        .oneshot(make_request("GET", "/api/v1/portfolios", None, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
        "Bearer"
    );
    let body = body_to_json(response.into_body()).await;
    assert_eq!(body["detail"], "Not authenticated");
}

#[tokio::test]
async fn test_invalid_token_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let (_store, app) = create_test_app(&temp_dir);

    let (status, body) = get(&app, "/api/v1/risk/scenarios", "not-a-jwt").await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["detail"], "Invalid or expired token");
}

// =============================================================================
// Portfolio and Holding Tests
// =============================================================================

#[tokio::test]
async fn test_portfolio_crud() {
    let temp_dir = TempDir::new().unwrap();
    let (_store, app) = create_test_app(&temp_dir);
    let (token, user_id) = login_demo(&app).await;

    let (status, created) = post(
        &app,
        "/api/v1/portfolios",
        &token,
        json!({ "name": "Core" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["currency"], "USD");
    assert_eq!(created["user_id"], user_id.as_str());
    assert!(!created["created_at"].as_str().unwrap().is_empty());
    let id = created["id"].as_str().unwrap();

    let (status, updated) = put(
        &app,
        &format!("/api/v1/portfolios/{}", id),
        &token,
        json!({ "currency": "EUR" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "Core");
    assert_eq!(updated["currency"], "EUR");

    let (status, list) = get(&app, "/api/v1/portfolios", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);

    let (status, body) = delete(&app, &format!("/api/v1/portfolios/{}", id), &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::Null);

    let (status, body) = get(&app, &format!("/api/v1/portfolios/{}", id), &token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Portfolio not found");
}

#[tokio::test]
async fn test_delete_portfolio_cascades_holdings() {
    let temp_dir = TempDir::new().unwrap();
    let (store, app) = create_test_app(&temp_dir);
    let (token, _) = login_demo(&app).await;
    let keep = create_portfolio(&app, &token, "Keep").await;
    let dropped = create_portfolio(&app, &token, "Drop").await;

    for pid in [&keep, &dropped] {
        let (status, _) = post(
            &app,
            &format!("/api/v1/portfolios/{}/holdings", pid),
            &token,
            json!({ "symbol": "VTI", "asset_class": "equity", "quantity": "10", "avg_cost": "245.50" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, _) = delete(&app, &format!("/api/v1/portfolios/{}", dropped), &token).await;
    assert_eq!(status, StatusCode::OK);

    let holdings = store.read_table(tables::HOLDINGS).unwrap();
    assert_eq!(holdings.len(), 1);
    assert_eq!(holdings[0].value("portfolio_id"), keep);
}

#[tokio::test]
async fn test_holding_must_belong_to_portfolio() {
    let temp_dir = TempDir::new().unwrap();
    let (_store, app) = create_test_app(&temp_dir);
    let (token, _) = login_demo(&app).await;
    let first = create_portfolio(&app, &token, "First").await;
    let second = create_portfolio(&app, &token, "Second").await;

    let (_, holding) = post(
        &app,
        &format!("/api/v1/portfolios/{}/holdings", first),
        &token,
        json!({ "symbol": "BND", "asset_class": "fixed_income", "quantity": "5", "avg_cost": "72.30" }),
    )
    .await;
    let holding_id = holding["id"].as_str().unwrap();

    let (status, body) = put(
        &app,
        &format!("/api/v1/portfolios/{}/holdings/{}", second, holding_id),
        &token,
        json!({ "quantity": "6" }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Holding not found");

    let (status, body) = put(
        &app,
        &format!("/api/v1/portfolios/{}/holdings/{}", first, holding_id),
        &token,
        json!({ "quantity": "6" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["quantity"], "6");
    assert_eq!(body["symbol"], "BND");
}

#[tokio::test]
async fn test_users_cannot_see_each_others_rows() {
    let temp_dir = TempDir::new().unwrap();
    let (_store, app) = create_test_app(&temp_dir);
    let (demo_token, _) = login_demo(&app).await;
    let other_token = register(&app, "mallory").await;

    let pid = create_portfolio(&app, &demo_token, "Private").await;

    let (status, list) = get(&app, "/api/v1/portfolios", &other_token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list, json!([]));

    let uri = format!("/api/v1/portfolios/{}", pid);
    let (status, _) = get(&app, &uri, &other_token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = put(&app, &uri, &other_token, json!({ "name": "Hijacked" })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = delete(&app, &uri, &other_token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = get(&app, &uri, &demo_token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Private");
}

// =============================================================================
// Feature Area Tests
// =============================================================================

#[tokio::test]
async fn test_risk_scenario_results_cascade() {
    let temp_dir = TempDir::new().unwrap();
    let (store, app) = create_test_app(&temp_dir);
    let (token, _) = login_demo(&app).await;
    let pid = create_portfolio(&app, &token, "Growth").await;

    let (status, scenario) = post(
        &app,
        "/api/v1/risk/scenarios",
        &token,
        json!({ "name": "Rate Shock" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(scenario["scenario_type"], "stress");
    assert_eq!(scenario["params_json"], "{}");
    let sid = scenario["id"].as_str().unwrap();

    let (status, _) = post(
        &app,
        "/api/v1/risk/results",
        &token,
        json!({ "scenario_id": sid, "portfolio_id": pid, "metric": "VaR_95_1d", "value": "-1.2%" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, results) = get(&app, &format!("/api/v1/risk/scenarios/{}/results", sid), &token).await;
    assert_eq!(results.as_array().unwrap().len(), 1);

    let (status, _) = delete(&app, &format!("/api/v1/risk/scenarios/{}", sid), &token).await;
    assert_eq!(status, StatusCode::OK);
    assert!(store.read_table(tables::RISK_RESULTS).unwrap().is_empty());
}

#[tokio::test]
async fn test_orders_filter_by_portfolio() {
    let temp_dir = TempDir::new().unwrap();
    let (_store, app) = create_test_app(&temp_dir);
    let (token, _) = login_demo(&app).await;
    let first = create_portfolio(&app, &token, "First").await;
    let second = create_portfolio(&app, &token, "Second").await;

    for (pid, symbol) in [(&first, "VTI"), (&first, "VEA"), (&second, "BND")] {
        let (status, order) = post(
            &app,
            "/api/v1/trading/orders",
            &token,
            json!({ "portfolio_id": pid, "symbol": symbol, "side": "BUY", "quantity": "1" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(order["status"], "NEW");
        assert_eq!(order["order_type"], "MARKET");
    }

    let (_, all) = get(&app, "/api/v1/trading/orders", &token).await;
    assert_eq!(all.as_array().unwrap().len(), 3);

    let (_, filtered) = get(
        &app,
        &format!("/api/v1/trading/orders?portfolio_id={}", first),
        &token,
    )
    .await;
    let filtered = filtered.as_array().unwrap();
    assert_eq!(filtered.len(), 2);
    assert!(filtered.iter().all(|o| o["portfolio_id"] == first.as_str()));

    let oid = filtered[0]["id"].as_str().unwrap();
    let (status, order) = put(
        &app,
        &format!("/api/v1/trading/orders/{}", oid),
        &token,
        json!({ "status": "FILLED" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(order["status"], "FILLED");
}

#[tokio::test]
async fn test_transaction_requires_owned_account() {
    let temp_dir = TempDir::new().unwrap();
    let (_store, app) = create_test_app(&temp_dir);
    let (token, _) = login_demo(&app).await;

    let (status, body) = post(
        &app,
        "/api/v1/operations/transactions",
        &token,
        json!({ "account_id": "missing", "type": "buy", "amount": "100", "date": "2025-01-15" }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Account not found");

    let (_, account) = post(
        &app,
        "/api/v1/operations/accounts",
        &token,
        json!({ "name": "Brokerage" }),
    )
    .await;
    assert_eq!(account["account_type"], "general");
    let aid = account["id"].as_str().unwrap();

    let (status, txn) = post(
        &app,
        "/api/v1/operations/transactions",
        &token,
        json!({ "account_id": aid, "type": "buy", "amount": "100", "date": "2025-01-15" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(txn["type"], "buy");
    assert_eq!(txn["description"], "");

    let (_, txns) = get(
        &app,
        &format!("/api/v1/operations/accounts/{}/transactions", aid),
        &token,
    )
    .await;
    assert_eq!(txns.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_fund_delete_cascades_commitments() {
    let temp_dir = TempDir::new().unwrap();
    let (store, app) = create_test_app(&temp_dir);
    let (token, _) = login_demo(&app).await;

    let (_, fund) = post(
        &app,
        "/api/v1/private-markets/funds",
        &token,
        json!({ "name": "Buyout XIII", "vintage_year": "2022" }),
    )
    .await;
    let fid = fund["id"].as_str().unwrap();
    assert_eq!(fund["strategy"], "");

    let (status, commitment) = post(
        &app,
        "/api/v1/private-markets/commitments",
        &token,
        json!({ "fund_id": fid, "amount": "1000000", "date": "2022-09-01" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(commitment["currency"], "USD");

    let (status, _) = post(
        &app,
        "/api/v1/private-markets/commitments",
        &token,
        json!({ "fund_id": "missing", "amount": "1", "date": "2022-09-01" }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = delete(&app, &format!("/api/v1/private-markets/funds/{}", fid), &token).await;
    assert_eq!(status, StatusCode::OK);
    assert!(store.read_table(tables::COMMITMENTS).unwrap().is_empty());
}

#[tokio::test]
async fn test_model_delete_cascades_client_accounts() {
    let temp_dir = TempDir::new().unwrap();
    let (store, app) = create_test_app(&temp_dir);
    let (token, _) = login_demo(&app).await;

    let (_, model) = post(
        &app,
        "/api/v1/wealth/models",
        &token,
        json!({ "name": "60/40" }),
    )
    .await;
    assert_eq!(model["allocation_json"], "{}");
    let mid = model["id"].as_str().unwrap();

    let (status, _) = post(
        &app,
        "/api/v1/wealth/client-accounts",
        &token,
        json!({ "model_id": mid, "name": "Smith Family Trust" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = post(
        &app,
        "/api/v1/wealth/client-accounts",
        &token,
        json!({ "model_id": "missing", "name": "Orphan" }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Model portfolio not found");

    let (status, _) = delete(&app, &format!("/api/v1/wealth/models/{}", mid), &token).await;
    assert_eq!(status, StatusCode::OK);
    assert!(store.read_table(tables::CLIENT_ACCOUNTS).unwrap().is_empty());
}

#[tokio::test]
async fn test_esg_requires_owned_portfolio() {
    let temp_dir = TempDir::new().unwrap();
    let (_store, app) = create_test_app(&temp_dir);
    let (token, _) = login_demo(&app).await;
    let other_token = register(&app, "other").await;
    let foreign = create_portfolio(&app, &other_token, "Theirs").await;

    let (status, _) = post(
        &app,
        "/api/v1/esg-climate",
        &token,
        json!({ "portfolio_id": foreign, "score_type": "ESG", "value": "7.2", "as_of_date": "2025-02-01" }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let pid = create_portfolio(&app, &token, "Mine").await;
    let (status, record) = post(
        &app,
        "/api/v1/esg-climate",
        &token,
        json!({ "portfolio_id": pid, "score_type": "Carbon", "value": "125", "as_of_date": "2025-02-01" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, updated) = put(
        &app,
        &format!("/api/v1/esg-climate/{}", record["id"].as_str().unwrap()),
        &token,
        json!({ "value": "118" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["value"], "118");
    assert_eq!(updated["score_type"], "Carbon");
}

#[tokio::test]
async fn test_reports_and_integrations_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let (_store, app) = create_test_app(&temp_dir);
    let (token, _) = login_demo(&app).await;

    let (status, report) = post(
        &app,
        "/api/v1/data-analytics/reports",
        &token,
        json!({ "name": "Monthly" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["report_type"], "custom");
    assert_eq!(report["config_json"], "{}");

    let (status, integration) = post(
        &app,
        "/api/v1/ecosystem/integrations",
        &token,
        json!({ "provider": "State Street" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(integration["integration_type"], "custodian");
    assert_eq!(integration["status"], "active");

    let iid = integration["id"].as_str().unwrap();
    let (status, _) = delete(&app, &format!("/api/v1/ecosystem/integrations/{}", iid), &token).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = delete(&app, &format!("/api/v1/ecosystem/integrations/{}", iid), &token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// =============================================================================
// Preference Tests
// =============================================================================

#[tokio::test]
async fn test_preferences_upsert_and_delete() {
    let temp_dir = TempDir::new().unwrap();
    let (_store, app) = create_test_app(&temp_dir);
    let (token, _) = login_demo(&app).await;
    let uri = "/api/v1/design-principles/preferences";

    let (status, body) = put(&app, uri, &token, json!({ "key": "theme", "value": "dark" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "key": "theme", "value": "dark" }));
    put(&app, uri, &token, json!({ "key": "theme", "value": "light" })).await;
    put(&app, uri, &token, json!({ "key": "layout", "value": "sidebar" })).await;

    let (_, prefs) = get(&app, uri, &token).await;
    assert_eq!(prefs, json!({ "theme": "light", "layout": "sidebar" }));

    // Empty value removes the key
    put(&app, uri, &token, json!({ "key": "layout", "value": "" })).await;
    let (status, _) = delete(&app, &format!("{}/theme", uri), &token).await;
    assert_eq!(status, StatusCode::OK);

    let (_, prefs) = get(&app, uri, &token).await;
    assert_eq!(prefs, json!({}));
}

#[tokio::test]
async fn test_preferences_migrate_from_legacy_table() {
    let temp_dir = TempDir::new().unwrap();
    let (store, app) = create_test_app(&temp_dir);
    let (token, user_id) = login_demo(&app).await;

    store
        .append_row(
            tables::USER_PREFERENCES,
            Row::new()
                .with("user_id", user_id.as_str())
                .with("key", "default_currency")
                .with("value", "EUR"),
        )
        .unwrap();

    let (status, prefs) = get(&app, "/api/v1/design-principles/preferences", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(prefs, json!({ "default_currency": "EUR" }));

    let migrated = store
        .get_by_owner(tables::DESIGN_PRINCIPLES_PREFERENCES, &user_id)
        .unwrap();
    assert_eq!(migrated.len(), 1);
    assert_eq!(migrated[0].value("value"), "EUR");
}

// =============================================================================
// Storage Tests
// =============================================================================

#[tokio::test]
async fn test_rows_persist_as_csv() {
    let temp_dir = TempDir::new().unwrap();
    let (_store, app) = create_test_app(&temp_dir);
    let (token, _) = login_demo(&app).await;
    create_portfolio(&app, &token, "On Disk, Quoted").await;

    let contents = std::fs::read_to_string(temp_dir.path().join("portfolios.csv")).unwrap();
    let mut lines = contents.lines();
    assert_eq!(lines.next(), Some("id,user_id,name,currency,created_at"));
    assert!(lines.next().unwrap().contains("\"On Disk, Quoted\""));
}

#[tokio::test]
async fn test_seeded_demo_data_is_visible() {
    let temp_dir = TempDir::new().unwrap();
    let (store, app) = create_test_app(&temp_dir);
    seed::seed_demo_data(&store, 4).unwrap();
    let (token, _) = login_demo(&app).await;

    let (_, portfolios) = get(&app, "/api/v1/portfolios", &token).await;
    assert_eq!(portfolios.as_array().unwrap().len(), 3);

    let (_, prefs) = get(&app, "/api/v1/design-principles/preferences", &token).await;
    assert_eq!(prefs["theme"], "dark");
}
