// src/membership.rs
use tracing::debug;

use crate::models::{Address, BlockHeight, Interaction};

/// Trailing blocks (inclusive) the interaction detector looks at.
pub const INTERACTION_WINDOW_BLOCKS: u64 = 100;

/// True if `wallet` sent a successful call to the contract within the last
/// [`INTERACTION_WINDOW_BLOCKS`] blocks.
pub fn wallet_interacted(
    wallet: &Address,
    current_block: BlockHeight,
    interactions: &[Interaction],
) -> bool {
    let min_block = current_block.saturating_sub(INTERACTION_WINDOW_BLOCKS);

    let hit = interactions
        .iter()
        .find(|i| i.block_height >= min_block && i.success && i.sender == *wallet);

    if let Some(i) = hit {
        debug!("Wallet {} matched call {} at block {}", wallet, i.hash, i.block_height);
    }
    hit.is_some()
}
