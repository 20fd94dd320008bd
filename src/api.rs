use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::{cors::{Any, CorsLayer}, trace::TraceLayer};
use tracing::{error, info, warn};

use crate::config::Config;
use crate::detector;
use crate::error::{Error, ErrorKind};
use crate::models::Address;
use crate::upstream::LedgerSource;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckWalletRequest {
    pub threshold: String, // decimal wei
    pub wallet_address: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckTransactionRequest {
    pub wallet_address: String,
}

#[derive(Debug, Serialize)]
pub struct CheckWalletResponse {
    pub threshold_crossed: bool,
}

#[derive(Debug, Serialize)]
pub struct CheckTransactionResponse {
    pub wallet_interacted: bool,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Clone)]
pub struct AppState {
    pub source: Arc<dyn LedgerSource>,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match self.kind() {
            ErrorKind::InvalidRequest => {
                warn!("Rejected request: {}", self);
                StatusCode::BAD_REQUEST
            }
            _ => {
                error!("Check failed: {}", self);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(ErrorResponse { error: self.to_string() })).into_response()
    }
}

fn bad_body(rejection: JsonRejection) -> Error {
    Error::InvalidRequest(rejection.body_text())
}

pub fn router(source: Arc<dyn LedgerSource>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(|| async { "Wallet watch API running" }))
        .route("/check-wallet", post(check_wallet))
        .route("/check-transaction", post(check_transaction))
        .with_state(AppState { source })
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

pub async fn serve(cfg: &Config, source: Arc<dyn LedgerSource>) -> eyre::Result<()> {
    let app = router(source);

    let addr = format!("{}:{}", cfg.host, cfg.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("API listening on http://{}", addr);

    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}

async fn check_wallet(
    State(state): State<AppState>,
    body: Result<Json<CheckWalletRequest>, JsonRejection>,
) -> Result<Json<CheckWalletResponse>, Error> {
    let Json(req) = body.map_err(bad_body)?;
    let wallet = Address::parse(&req.wallet_address)?;

    let threshold_crossed =
        detector::check_balance_threshold(state.source.as_ref(), &wallet, &req.threshold).await?;
    Ok(Json(CheckWalletResponse { threshold_crossed }))
}

async fn check_transaction(
    State(state): State<AppState>,
    body: Result<Json<CheckTransactionRequest>, JsonRejection>,
) -> Result<Json<CheckTransactionResponse>, Error> {
    let Json(req) = body.map_err(bad_body)?;
    let wallet = Address::parse(&req.wallet_address)?;

    let wallet_interacted = detector::check_contract_interaction(state.source.as_ref(), &wallet).await?;
    Ok(Json(CheckTransactionResponse { wallet_interacted }))
}
