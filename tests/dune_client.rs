use axum::{
    extract::{Path, Query},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use std::{collections::HashMap, time::Duration};

use wallet_watch::{
    amount::Amount,
    config,
    detector,
    error::ErrorKind,
    models::{Address, Direction},
    upstream::{DuneClient, LedgerSource},
};

const API_KEY: &str = "test-key";
const WALLET: &str = "0x9F8c163cBA728e99993ABe7495F06c0A3c8Ac8b9";

type Params = Query<HashMap<String, String>>;

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("x-dune-api-key")
        .and_then(|v| v.to_str().ok())
        == Some(API_KEY)
}

async fn balance(headers: HeaderMap, Path(address): Path<String>, Query(q): Params) -> Response {
    if !authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, "missing key").into_response();
    }
    if q.get("chain_ids").map(String::as_str) != Some("11155111") {
        return (StatusCode::BAD_REQUEST, "wrong chain").into_response();
    }
    Json(json!({
        "wallet_address": address,
        "balances": [
            { "chain": "sepolia", "chain_id": 11155111, "address": "native", "amount": "140", "symbol": "ETH" }
        ]
    }))
    .into_response()
}

async fn transactions(headers: HeaderMap, Query(q): Params) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    if q.get("limit").map(String::as_str) != Some("100") {
        return (StatusCode::BAD_REQUEST, "wrong limit").into_response();
    }
    Json(json!({
        "transactions": [
            {
                "address": WALLET, "block_number": 6543210, "block_time": "2024-08-20T11:15:00+00:00",
                "chain": "sepolia", "from": WALLET, "hash": "0xsend", "to": "0xdef",
                "transaction_type": "Sender", "value": "0x64"
            },
            {
                "address": WALLET, "block_number": 6543000, "block_time": "2024-08-20T10:00:00+00:00",
                "chain": "sepolia", "from": "0xdef", "hash": "0xold", "to": WALLET,
                "transaction_type": "Receiver", "value": "0x3e8"
            }
        ]
    }))
    .into_response()
}

async fn query_results(headers: HeaderMap, Path(query_id): Path<u64>) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    match query_id {
        4074150 => Json(json!({
            "execution_id": "01HZ",
            "result": { "rows": [ { "latest_block_number": 6543211 } ] }
        }))
        .into_response(),
        4072279 => Json(json!({
            "result": { "rows": [
                { "block_number": 6543150, "tx_hash": "0xcall", "sender": WALLET.to_lowercase(), "success": true },
                { "block_number": 6543200, "tx_hash": "0xfail", "sender": "0xdef", "success": false }
            ] }
        }))
        .into_response(),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

fn fake_dune() -> Router {
    Router::new()
        .route("/api/beta/balance/:address", get(balance))
        .route("/api/beta/transactions/:address", get(transactions))
        .route("/api/v1/query/:id/results", get(query_results))
}

async fn spawn(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn client(base_url: &str, api_key: &str) -> DuneClient {
    let vars: HashMap<&str, String> = HashMap::from([
        ("DUNE_API_KEY", api_key.to_string()),
        ("DUNE_BASE_URL", base_url.to_string()),
        ("UPSTREAM_TIMEOUT_SECS", "1".to_string()),
    ]);
    let cfg = config::from_lookup(|key| vars.get(key).cloned()).unwrap();
    DuneClient::new(&cfg).unwrap()
}

fn wallet() -> Address {
    Address::parse(WALLET).unwrap()
}

#[tokio::test]
async fn fetches_and_decodes_every_endpoint() {
    let base = spawn(fake_dune()).await;
    let dune = client(&base, API_KEY);

    assert_eq!(dune.fetch_balance(&wallet()).await.unwrap(), Amount::from(140));
    assert_eq!(dune.fetch_current_block().await.unwrap(), 6543211);

    let transfers = dune.fetch_transfers(&wallet()).await.unwrap();
    assert_eq!(transfers.len(), 2);
    assert_eq!(transfers[0].amount, Amount::from(100));
    assert_eq!(transfers[0].direction, Direction::Outbound);
    assert_eq!(transfers[1].amount, Amount::from(1000));
    assert_eq!(transfers[1].direction, Direction::Inbound);

    let calls = dune.fetch_contract_interactions().await.unwrap();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].sender, wallet());
}

#[tokio::test]
async fn detectors_run_against_dune() {
    let base = spawn(fake_dune()).await;
    let dune = client(&base, API_KEY);

    // 140 now, 100 sent one block ago: 240 before.
    assert!(detector::check_balance_threshold(&dune, &wallet(), "150").await.unwrap());
    assert!(!detector::check_balance_threshold(&dune, &wallet(), "300").await.unwrap());

    assert!(detector::check_contract_interaction(&dune, &wallet()).await.unwrap());
    let stranger = Address::parse("0x0000000000000000000000000000000000000001").unwrap();
    assert!(!detector::check_contract_interaction(&dune, &stranger).await.unwrap());
}

#[tokio::test]
async fn bad_transfer_value_fails_the_check() {
    let app = Router::new()
        .route("/api/beta/balance/:address", get(balance))
        .route(
            "/api/beta/transactions/:address",
            get(|| async {
                Json(json!({
                    "transactions": [
                        {
                            "block_number": 6543210, "block_time": "2024-08-20T11:15:00+00:00",
                            "hash": "0xsend", "transaction_type": "Sender", "value": "0x64"
                        },
                        {
                            "block_number": 6543209, "block_time": "2024-08-20T11:14:00+00:00",
                            "hash": "0xbad", "transaction_type": "Receiver", "value": "0xzz"
                        }
                    ]
                }))
            }),
        )
        .route("/api/v1/query/:id/results", get(query_results));
    let base = spawn(app).await;
    let dune = client(&base, API_KEY);

    // The good send alone would report a crossing at 150.
    let err = detector::check_balance_threshold(&dune, &wallet(), "150")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidAmount);
}

#[tokio::test]
async fn rejected_key_is_upstream_unavailable() {
    let base = spawn(fake_dune()).await;
    let dune = client(&base, "wrong-key");

    let err = dune.fetch_balance(&wallet()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UpstreamUnavailable);
}

#[tokio::test]
async fn garbage_body_is_malformed_response() {
    let app = Router::new().route(
        "/api/v1/query/:id/results",
        get(|| async { Json(json!({ "result": { "rows": "nope" } })) }),
    );
    let base = spawn(app).await;
    let dune = client(&base, API_KEY);

    let err = dune.fetch_current_block().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedUpstreamResponse);
}

#[tokio::test]
async fn slow_upstream_times_out() {
    let app = Router::new().route(
        "/api/v1/query/:id/results",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(3)).await;
            Json(json!({ "result": { "rows": [] } }))
        }),
    );
    let base = spawn(app).await;
    let dune = client(&base, API_KEY);

    let err = dune.fetch_contract_interactions().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UpstreamTimeout);
}

#[tokio::test]
async fn unreachable_upstream_is_unavailable() {
    // Grab a free port, then close it so nothing is listening.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let dune = client(&format!("http://{}", addr), API_KEY);
    let err = dune.fetch_current_block().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UpstreamUnavailable);
}
