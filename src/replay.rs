// src/replay.rs
//! Backward balance replay for the threshold detector.
//!
//! Starting from the current balance, transfers are undone newest-first.
//! Undoing a send adds the amount back; undoing a receipt takes it away.
//! After each step the reconstructed balance is compared with the current
//! one: if they sit on opposite sides of the threshold, it was crossed.

use std::cmp::Ordering;
use tracing::debug;

use crate::amount::{Amount, SignedAmount};
use crate::error::Result;
use crate::models::{BlockHeight, Direction, Transfer};

/// Trailing blocks (inclusive) the balance detector looks at.
pub const BALANCE_WINDOW_BLOCKS: u64 = 3;

pub fn threshold_crossed(
    current_balance: &Amount,
    threshold: &Amount,
    current_block: BlockHeight,
    transfers: &[Transfer],
) -> Result<bool> {
    // Stable sort: transfers sharing a block_time keep upstream order.
    let mut ordered: Vec<&Transfer> = transfers.iter().collect();
    ordered.sort_by(|a, b| b.block_time.cmp(&a.block_time));

    let min_block = current_block.saturating_sub(BALANCE_WINDOW_BLOCKS);
    let current_side = current_balance.compare(threshold);
    let mut balance = SignedAmount::from_amount(current_balance)?;

    debug!(
        "Replaying {} transfers from balance {} (threshold {}, min block {})",
        ordered.len(),
        current_balance,
        threshold,
        min_block
    );

    for tx in ordered {
        if tx.block_height < min_block {
            debug!("Transfer {} at block {} is outside the window", tx.hash, tx.block_height);
            break;
        }

        balance = match tx.direction {
            Direction::Outbound => balance.add_amount(&tx.amount)?,
            Direction::Inbound => balance.sub_amount(&tx.amount)?,
        };
        debug!("Before {} ({:?} {}): balance {}", tx.hash, tx.direction, tx.amount, balance);

        let replayed_side = balance.compare_amount(threshold);
        let crossed = (replayed_side == Ordering::Greater && current_side != Ordering::Greater)
            || (replayed_side == Ordering::Less && current_side != Ordering::Less);
        if crossed {
            debug!("Threshold {} crossed at transfer {}", threshold, tx.hash);
            return Ok(true);
        }
    }

    Ok(false)
}
