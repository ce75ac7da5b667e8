use async_trait::async_trait;
use thiserror::Error;

/// Errors surfaced by the ledger collaborator.
///
/// The underlying contract errors are generic over the middleware, so
/// they are captured as strings at this boundary; the orchestrator
/// only needs them for logging and for choosing the failure reply.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("market creation submission rejected: {0}")]
    Submission(String),
    #[error("market creation transaction dropped before confirmation")]
    Confirmation,
    #[error("market count query failed: {0}")]
    Query(String),
}

/// Narrow capability interface over the market contract.
#[async_trait]
pub trait MarketLedger: Send + Sync {
    /// Submit a market-creation transaction and wait until it is
    /// confirmed. Returns only once the transaction is mined.
    #[allow(clippy::too_many_arguments)]
    async fn submit_market(
        &self,
        question: &str,
        option_a: &str,
        option_b: &str,
        duration_secs: u64,
        category: &str,
        tags: Vec<String>,
        fee_bps: u64,
    ) -> Result<(), LedgerError>;

    /// Total number of markets the contract has created so far.
    async fn market_count(&self) -> Result<u64, LedgerError>;
}
