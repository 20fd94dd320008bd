mod dune;

pub use dune::DuneClient;

use async_trait::async_trait;

use crate::amount::Amount;
use crate::error::Result;
use crate::models::{Address, BlockHeight, Interaction, Transfer};

/// Read-only view of the indexing service the detectors depend on.
///
/// Implementations must surface every failure as an error; an empty list
/// means "no records", never "could not fetch".
#[async_trait]
pub trait LedgerSource: Send + Sync {
    async fn fetch_balance(&self, address: &Address) -> Result<Amount>;

    /// Recent transfers touching `address`, in any order.
    async fn fetch_transfers(&self, address: &Address) -> Result<Vec<Transfer>>;

    async fn fetch_current_block(&self) -> Result<BlockHeight>;

    /// Calls to the watched contract from all senders.
    async fn fetch_contract_interactions(&self) -> Result<Vec<Interaction>>;
}
