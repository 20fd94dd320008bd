use dotenvy::dotenv;
use eyre::{eyre, Result, WrapErr};
use std::{env, fmt, str::FromStr, time::Duration};
use tracing::info;

#[derive(Clone)]
pub struct Config {
    pub dune_api_key: String,
    pub dune_base_url: String,
    pub chain_id: u64,
    pub contract_query_id: u64,      // rows: block_number, tx_hash, sender, success
    pub current_block_query_id: u64, // rows: latest_block_number
    pub transactions_limit: u32,
    pub interactions_limit: u32,
    pub upstream_timeout: Duration,
    pub host: String,
    pub port: u16,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("dune_api_key", &"<redacted>")
            .field("dune_base_url", &self.dune_base_url)
            .field("chain_id", &self.chain_id)
            .field("contract_query_id", &self.contract_query_id)
            .field("current_block_query_id", &self.current_block_query_id)
            .field("transactions_limit", &self.transactions_limit)
            .field("interactions_limit", &self.interactions_limit)
            .field("upstream_timeout", &self.upstream_timeout)
            .field("host", &self.host)
            .field("port", &self.port)
            .finish()
    }
}

pub fn load() -> Result<Config> {
    dotenv().ok(); // .env is optional

    let cfg = from_lookup(|key| env::var(key).ok())?;
    info!("Loaded config: {:?}", cfg);
    Ok(cfg)
}

/// Build a [`Config`] from any key/value source.
pub fn from_lookup<F>(lookup: F) -> Result<Config>
where
    F: Fn(&str) -> Option<String>,
{
    let dune_api_key = lookup("DUNE_API_KEY")
        .filter(|k| !k.trim().is_empty())
        .ok_or_else(|| eyre!("DUNE_API_KEY must be set"))?;

    let dune_base_url = lookup("DUNE_BASE_URL")
        .unwrap_or_else(|| "https://api.dune.com".to_string())
        .trim_end_matches('/')
        .to_string();

    let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());

    let timeout_secs: u64 = parse_or(&lookup, "UPSTREAM_TIMEOUT_SECS", 10)?;
    if timeout_secs == 0 {
        return Err(eyre!("UPSTREAM_TIMEOUT_SECS must be greater than zero"));
    }

    Ok(Config {
        dune_api_key,
        dune_base_url,
        chain_id: parse_or(&lookup, "CHAIN_ID", 11155111)?, // Sepolia
        contract_query_id: parse_or(&lookup, "CONTRACT_QUERY_ID", 4072279)?,
        current_block_query_id: parse_or(&lookup, "CURRENT_BLOCK_QUERY_ID", 4074150)?,
        transactions_limit: parse_or(&lookup, "TRANSACTIONS_LIMIT", 100)?,
        interactions_limit: parse_or(&lookup, "INTERACTIONS_LIMIT", 1000)?,
        upstream_timeout: Duration::from_secs(timeout_secs),
        host,
        port: parse_or(&lookup, "PORT", 8080)?,
    })
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .wrap_err_with(|| format!("invalid value for {key}: {raw:?}")),
        None => Ok(default),
    }
}
