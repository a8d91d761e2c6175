//! HTTP 层测试：路由 + 中间件 + 错误映射，使用假网关

mod common;

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use blockio_gateway::{api, app_state::AppState, service::WalletMethod};
use common::{test_config, test_state, tx, FakeGateway};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

async fn send(app: Router, req: Request<Body>) -> (StatusCode, Option<String>, Value) {
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let trace_id = resp
        .headers()
        .get("X-Trace-Id")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, trace_id, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_healthz_sets_trace_id() {
    let app = api::routes(test_state(FakeGateway::new()));
    let (status, trace_id, body) = send(app, get("/healthz")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(trace_id.is_some());
}

#[tokio::test]
async fn test_incoming_trace_id_is_echoed() {
    let app = api::routes(test_state(FakeGateway::new()));
    let req = Request::builder()
        .uri("/healthz")
        .header("X-Trace-Id", "req-42")
        .body(Body::empty())
        .unwrap();
    let (_, trace_id, _) = send(app, req).await;
    assert_eq!(trace_id.as_deref(), Some("req-42"));
}

#[tokio::test]
async fn test_balance_envelope() {
    let gateway = FakeGateway::new();
    gateway.respond(
        WalletMethod::GetBalance,
        json!({
            "network": "DOGETEST",
            "available_balance": "100.50000000",
            "pending_received_balance": "2.00000000"
        }),
    );
    let app = api::routes(test_state(gateway));

    let (status, _, body) = send(app, get("/api/wallet/balance")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["code"], 0);
    assert_eq!(body["data"]["network"], "DOGETEST");
    assert_eq!(body["data"]["available_balance"], "100.50000000");
}

#[tokio::test]
async fn test_withdraw_normalizes_json_body() {
    let gateway = FakeGateway::new();
    gateway.respond(
        WalletMethod::Withdraw,
        json!({
            "txid": "abc",
            "amount_withdrawn": "1.0001",
            "amount_sent": "1.0",
            "network_fee": "0.0001",
            "blockio_fee": "0"
        }),
    );
    let app = api::routes(test_state(gateway.clone()));

    let (status, _, body) = send(
        app,
        post_json(
            "/api/wallet/withdrawals",
            json!({"to_addresses": "2N1", "amounts": "1"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["txid"], "abc");
    let (_, sent) = gateway.last_call().unwrap();
    assert_eq!(sent.get("amounts"), Some("1.00000000"));
    assert_eq!(sent.get("to_addresses"), Some("2N1"));
}

#[tokio::test]
async fn test_invalid_amount_maps_to_400_with_trace_id() {
    let gateway = FakeGateway::new();
    let app = api::routes(test_state(gateway.clone()));

    let (status, header_trace, body) = send(
        app,
        post_json(
            "/api/wallet/withdrawals",
            json!({"to_addresses": "2N1", "amounts": "ten"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_amount");
    assert_eq!(body["trace_id"].as_str(), header_trace.as_deref());
    assert_eq!(gateway.call_count(), 0);
}

#[tokio::test]
async fn test_missing_required_parameter() {
    let app = api::routes(test_state(FakeGateway::new()));
    let (status, _, body) = send(app, get("/api/wallet/addresses/balance")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_parameter");
}

#[tokio::test]
async fn test_pending_routes() {
    let gateway = FakeGateway::new();
    gateway.set_received(vec![
        tx("t1", 0.5, &[("ADDR", "1.00000001"), ("OTHER", "2")]),
        tx("t2", 0.95, &[("ADDR", "5.0")]),
    ]);
    let state = test_state(gateway);

    let (status, _, body) = send(
        api::routes(state.clone()),
        get("/api/wallet/pending?address=ADDR&threshold=0.9"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["txid"], "t1");

    let (_, _, body) = send(
        api::routes(state.clone()),
        get("/api/wallet/pending/amount?address=ADDR&threshold=0.9"),
    )
    .await;
    assert_eq!(body["data"]["amount"], "3.00000001");

    let (_, _, body) = send(
        api::routes(state),
        get("/api/wallet/pending/amount?address=ADDR&threshold=0.9&recipient_only=true"),
    )
    .await;
    assert_eq!(body["data"]["amount"], "1.00000001");
    assert_eq!(body["data"]["recipient_only"], true);
}

#[tokio::test]
async fn test_threshold_out_of_range_is_rejected() {
    let gateway = FakeGateway::new();
    let app = api::routes(test_state(gateway.clone()));

    let (status, _, body) = send(
        app,
        get("/api/wallet/pending/amount?address=ADDR&threshold=1.5"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_parameter");
    assert_eq!(gateway.call_count(), 0);
}

#[tokio::test]
async fn test_upstream_unavailable_maps_to_503() {
    let gateway = FakeGateway::new();
    gateway.fail_with("timed out");
    let app = api::routes(test_state(gateway));

    let (status, _, body) = send(app, get("/api/wallet/addresses")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["code"], "upstream_unavailable");
}

#[tokio::test]
async fn test_addresses_without_balances() {
    let gateway = FakeGateway::new();
    let app = api::routes(test_state(gateway.clone()));

    let (status, _, _) = send(app, get("/api/wallet/addresses?with_balances=false")).await;
    assert_eq!(status, StatusCode::OK);
    let (method, _) = gateway.last_call().unwrap();
    assert_eq!(method, WalletMethod::GetMyAddressesWithoutBalances);
}

#[tokio::test]
async fn test_create_multisig_address_route() {
    let gateway = FakeGateway::new();
    gateway.respond(
        WalletMethod::GetNewDtrustAddress,
        json!({"address": "2NDtrust", "label": "vault"}),
    );
    let app = api::routes(test_state(gateway.clone()));

    let (status, _, body) = send(
        app,
        post_json(
            "/api/wallet/multisig",
            json!({
                "label": "vault",
                "required_signatures": 2,
                "passphrases": ["a", "b"]
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["address"], "2NDtrust");
    let (_, sent) = gateway.last_call().unwrap();
    assert_eq!(sent.get("public_keys"), Some("pub:62,pub:61"));
}

#[tokio::test]
async fn test_multisig_requires_key_deriver() {
    let state = Arc::new(AppState::with_gateway(
        FakeGateway::new(),
        Arc::new(test_config()),
    ));
    let app = api::routes(state);

    let (status, _, body) = send(
        app,
        post_json(
            "/api/wallet/multisig",
            json!({"label": "vault", "required_signatures": 1, "passphrases": ["a"]}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["code"], "multisig_unavailable");
}

#[tokio::test]
async fn test_pending_overflow_maps_to_502() {
    let max = rust_decimal::Decimal::MAX.to_string();
    let gateway = FakeGateway::new();
    gateway.set_received(vec![
        tx("t1", 0.2, &[("ADDR", max.as_str())]),
        tx("t2", 0.3, &[("ADDR", "1")]),
    ]);
    let app = api::routes(test_state(gateway));

    let (status, header_trace, body) = send(
        app,
        get("/api/wallet/pending/amount?address=ADDR&threshold=0.9"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["code"], "malformed_transaction_data");
    assert_eq!(body["trace_id"].as_str(), header_trace.as_deref());
}

#[tokio::test]
async fn test_unparsable_query_uses_error_envelope() {
    let gateway = FakeGateway::new();
    let state = test_state(gateway.clone());

    for uri in [
        "/api/wallet/pending?address=ADDR",
        "/api/wallet/pending/amount?address=ADDR&threshold=high",
    ] {
        let (status, header_trace, body) = send(api::routes(state.clone()), get(uri)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert_eq!(body["code"], "invalid_parameter");
        assert!(body["message"].as_str().is_some_and(|m| !m.is_empty()));
        assert_eq!(body["trace_id"].as_str(), header_trace.as_deref());
    }
    assert_eq!(gateway.call_count(), 0);
}

#[tokio::test]
async fn test_bad_json_body_uses_error_envelope() {
    let gateway = FakeGateway::new();
    let app = api::routes(test_state(gateway.clone()));

    let req = Request::builder()
        .method("POST")
        .uri("/api/wallet/withdrawals")
        .header("content-type", "application/json")
        .body(Body::from("{\"amounts\": "))
        .unwrap();
    let (status, header_trace, body) = send(app, req).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "bad_request");
    assert_eq!(body["trace_id"].as_str(), header_trace.as_deref());
    assert_eq!(gateway.call_count(), 0);
}
