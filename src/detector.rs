// src/detector.rs
use tracing::info;

use crate::amount::Amount;
use crate::error::Result;
use crate::membership;
use crate::models::Address;
use crate::replay;
use crate::upstream::LedgerSource;

/// Did `wallet`'s balance cross `threshold` (decimal wei) within the
/// balance window?
pub async fn check_balance_threshold<S>(source: &S, wallet: &Address, threshold: &str) -> Result<bool>
where
    S: LedgerSource + ?Sized,
{
    // Reject a bad threshold before spending any upstream calls on it.
    let threshold = Amount::parse_decimal(threshold)?;

    let (balance, transfers, current_block) = tokio::try_join!(
        source.fetch_balance(wallet),
        source.fetch_transfers(wallet),
        source.fetch_current_block(),
    )?;

    info!(
        "Wallet {}: balance {}, {} transfers, block {}",
        wallet,
        balance,
        transfers.len(),
        current_block
    );

    let crossed = replay::threshold_crossed(&balance, &threshold, current_block, &transfers)?;
    info!("Wallet {} threshold {} crossed: {}", wallet, threshold, crossed);
    Ok(crossed)
}

/// Did `wallet` successfully call the watched contract within the
/// interaction window?
pub async fn check_contract_interaction<S>(source: &S, wallet: &Address) -> Result<bool>
where
    S: LedgerSource + ?Sized,
{
    let (interactions, current_block) = tokio::try_join!(
        source.fetch_contract_interactions(),
        source.fetch_current_block(),
    )?;

    let interacted = membership::wallet_interacted(wallet, current_block, &interactions);
    info!(
        "Wallet {} interacted: {} ({} calls scanned, block {})",
        wallet,
        interacted,
        interactions.len(),
        current_block
    );
    Ok(interacted)
}


#[cfg(test)]
mod tests {
    use super::testing::FakeSource;
    use super::*;
    use crate::error::ErrorKind;
    use crate::models::{Direction, Interaction, Transfer};

    fn wallet() -> Address {
        Address::parse("0xAbC0000000000000000000000000000000000001").unwrap()
    }

    fn outbound(amount: u64, block: u64) -> Transfer {
        Transfer {
            hash: "0xsend".into(),
            amount: Amount::from(amount),
            direction: Direction::Outbound,
            block_height: block,
            block_time: "2024-08-20 11:15:00.000 UTC".into(),
        }
    }

    #[tokio::test]
    async fn reports_crossing_from_fetched_history() {
        let source = FakeSource {
            balance: Some(Amount::from(140)),
            transfers: Some(vec![outbound(100, 6_000_000)]),
            current_block: Some(6_000_001),
            ..Default::default()
        };
        assert!(check_balance_threshold(&source, &wallet(), "150").await.unwrap());
        assert!(!check_balance_threshold(&source, &wallet(), "250").await.unwrap());
    }

    #[tokio::test]
    async fn bad_threshold_fails_before_fetching() {
        let source = FakeSource::default();
        let err = check_balance_threshold(&source, &wallet(), "abc").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidAmount);
        assert_eq!(source.call_count(), 0);
    }

    #[tokio::test]
    async fn upstream_failure_is_an_error_not_false() {
        // Transfers missing: the detector must not treat that as "no history".
        let source = FakeSource {
            balance: Some(Amount::from(140)),
            current_block: Some(100),
            ..Default::default()
        };
        let err = check_balance_threshold(&source, &wallet(), "150").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UpstreamUnavailable);

        let source = FakeSource {
            interactions: Some(vec![]),
            ..Default::default()
        };
        let err = check_contract_interaction(&source, &wallet()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UpstreamUnavailable);
    }

    #[tokio::test]
    async fn finds_recent_successful_interaction() {
        let mut source = FakeSource {
            current_block: Some(6_000_000),
            interactions: Some(vec![Interaction {
                hash: "0xcall".into(),
                sender: Address::new("0xabc0000000000000000000000000000000000001"),
                block_height: 5_999_950,
                success: true,
            }]),
            ..Default::default()
        };
        assert!(check_contract_interaction(&source, &wallet()).await.unwrap());

        if let Some(calls) = source.interactions.as_mut() {
            calls[0].success = false;
        }
        assert!(!check_contract_interaction(&source, &wallet()).await.unwrap());
    }
}
