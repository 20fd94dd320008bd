// src/upstream/dune.rs
use async_trait::async_trait;
use eyre::WrapErr;
use reqwest::{Client, Url};
use serde::{de::DeserializeOwned, Deserialize};
use tracing::{debug, warn};

use super::LedgerSource;
use crate::amount::Amount;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::models::{Address, BlockHeight, Direction, Interaction, Transfer};

const API_KEY_HEADER: &str = "X-Dune-Api-Key";
const BLOCK_QUERY_LIMIT: u32 = 1000;

#[derive(Debug, Deserialize)]
struct BalancesResponse {
    balances: Vec<BalanceRow>,
}

#[derive(Debug, Deserialize)]
struct BalanceRow {
    #[serde(default)]
    address: Option<String>, // "native" for the chain's own asset
    amount: String,
}

#[derive(Debug, Deserialize)]
struct TransactionsResponse {
    transactions: Vec<TransactionRow>,
}

#[derive(Debug, Deserialize)]
struct TransactionRow {
    hash: String,
    value: String, // hex wei
    transaction_type: String,
    block_time: String,
    block_number: u64,
}

#[derive(Debug, Deserialize)]
struct QueryResults<T> {
    result: QueryResult<T>,
}

#[derive(Debug, Deserialize)]
struct QueryResult<T> {
    rows: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct LatestBlockRow {
    latest_block_number: u64,
}

#[derive(Debug, Deserialize)]
struct InteractionRow {
    block_number: u64,
    tx_hash: String,
    sender: String,
    success: bool,
}

impl TryFrom<TransactionRow> for Transfer {
    type Error = Error;

    fn try_from(row: TransactionRow) -> Result<Self> {
        Ok(Transfer {
            amount: Amount::parse_hex(&row.value)?,
            direction: Direction::from_transaction_type(&row.transaction_type)?,
            block_height: row.block_number,
            block_time: row.block_time,
            hash: row.hash,
        })
    }
}

impl From<InteractionRow> for Interaction {
    fn from(row: InteractionRow) -> Self {
        Interaction {
            hash: row.tx_hash,
            sender: Address::new(row.sender),
            block_height: row.block_number,
            success: row.success,
        }
    }
}

/// Native-asset balance. Dune leaves out assets the wallet does not hold,
/// so a missing native row means zero; token rows are never a substitute.
fn pick_balance(resp: BalancesResponse) -> Result<Amount> {
    match resp
        .balances
        .iter()
        .find(|b| b.address.as_deref() == Some("native"))
    {
        Some(row) => Amount::parse_decimal(&row.amount),
        None => Ok(Amount::ZERO),
    }
}

fn latest_block(resp: QueryResults<LatestBlockRow>) -> Result<BlockHeight> {
    resp.result
        .rows
        .first()
        .map(|r| r.latest_block_number)
        .ok_or_else(|| Error::MalformedUpstreamResponse("no rows in current block response".into()))
}

/// HTTP client for the Dune balance, transaction and query-result APIs.
#[derive(Clone)]
pub struct DuneClient {
    client: Client,
    base_url: Url,
    api_key: String,
    chain_id: u64,
    contract_query_id: u64,
    current_block_query_id: u64,
    transactions_limit: u32,
    interactions_limit: u32,
}

impl DuneClient {
    pub fn new(cfg: &Config) -> eyre::Result<Self> {
        let client = Client::builder()
            .timeout(cfg.upstream_timeout)
            .build()?;
        let base_url = Url::parse(&cfg.dune_base_url)
            .wrap_err_with(|| format!("invalid DUNE_BASE_URL {:?}", cfg.dune_base_url))?;
        if base_url.cannot_be_a_base() {
            eyre::bail!("DUNE_BASE_URL {:?} cannot be used as a base", cfg.dune_base_url);
        }

        Ok(Self {
            client,
            base_url,
            api_key: cfg.dune_api_key.clone(),
            chain_id: cfg.chain_id,
            contract_query_id: cfg.contract_query_id,
            current_block_query_id: cfg.current_block_query_id,
            transactions_limit: cfg.transactions_limit,
            interactions_limit: cfg.interactions_limit,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // cannot_be_a_base was rejected in new()
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url, query: &[(&str, String)]) -> Result<T> {
        debug!("📡 GET {} {:?}", url, query);

        let resp = self
            .client
            .get(url.clone())
            .header(API_KEY_HEADER, &self.api_key)
            .query(query)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            warn!("Dune returned HTTP {} for {}", status, url);
            return Err(Error::UpstreamUnavailable(format!(
                "HTTP {} from {}",
                status,
                url.path()
            )));
        }

        let body = resp.text().await?;
        debug!("📩 {} bytes from {}", body.len(), url.path());
        Ok(serde_json::from_str(&body)?)
    }

    fn query_results_url(&self, query_id: u64) -> Url {
        let id = query_id.to_string();
        self.endpoint(&["api", "v1", "query", &id, "results"])
    }
}

#[async_trait]
impl LedgerSource for DuneClient {
    async fn fetch_balance(&self, address: &Address) -> Result<Amount> {
        let url = self.endpoint(&["api", "beta", "balance", address.as_str()]);
        let resp: BalancesResponse = self
            .get_json(url, &[("chain_ids", self.chain_id.to_string())])
            .await?;
        pick_balance(resp)
    }

    async fn fetch_transfers(&self, address: &Address) -> Result<Vec<Transfer>> {
        let url = self.endpoint(&["api", "beta", "transactions", address.as_str()]);
        let resp: TransactionsResponse = self
            .get_json(
                url,
                &[
                    ("chain_ids", self.chain_id.to_string()),
                    ("limit", self.transactions_limit.to_string()),
                ],
            )
            .await?;

        resp.transactions.into_iter().map(Transfer::try_from).collect()
    }

    async fn fetch_current_block(&self) -> Result<BlockHeight> {
        let url = self.query_results_url(self.current_block_query_id);
        let resp: QueryResults<LatestBlockRow> = self
            .get_json(url, &[("limit", BLOCK_QUERY_LIMIT.to_string())])
            .await?;
        latest_block(resp)
    }

    async fn fetch_contract_interactions(&self) -> Result<Vec<Interaction>> {
        let url = self.query_results_url(self.contract_query_id);
        let resp: QueryResults<InteractionRow> = self
            .get_json(url, &[("limit", self.interactions_limit.to_string())])
            .await?;
        Ok(resp.result.rows.into_iter().map(Interaction::from).collect())
    }
}
