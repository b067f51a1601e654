//! Evidence collectors
//!
//! The audit engine only ever talks to the chain through `EvidenceSource`,
//! so test doubles and alternative backends plug in without touching the
//! rule set.

pub mod solana;

pub use solana::SolanaClient;

use crate::models::errors::AppResult;
use crate::models::types::{AccountSnapshot, SignatureRecord, TransactionRecord};

/// Read-only query interface over a blockchain node.
///
/// All methods may fail (network error, malformed identifier, rate limiting);
/// the engine treats any failure as terminal for that audit attempt and maps
/// it to maximum risk instead of retrying.
#[allow(async_fn_in_trait)]
pub trait EvidenceSource {
    /// Account metadata, or `None` when the account does not exist
    async fn fetch_account(&self, address: &str) -> AppResult<Option<AccountSnapshot>>;

    /// Latest slot the node has processed
    async fn current_slot(&self) -> AppResult<u64>;

    /// Estimated production time of a slot, when the node still has it
    async fn block_time(&self, slot: u64) -> AppResult<Option<i64>>;

    /// Signature history for an address, newest first, bounded by `limit`
    async fn fetch_recent_signatures(
        &self,
        address: &str,
        limit: usize,
    ) -> AppResult<Vec<SignatureRecord>>;

    /// Transaction record, or `None` when the ledger has no such signature
    async fn fetch_transaction(&self, signature: &str) -> AppResult<Option<TransactionRecord>>;
}
