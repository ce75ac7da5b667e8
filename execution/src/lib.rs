//! Ledger collaborator: on-chain prediction-market creation
//!
//! Exposes the narrow capability the pipeline needs from the chain:
//! - submit a `createMarket` transaction and wait for confirmation
//! - read the current market count
//!
//! The `MarketLedger` trait is the seam the orchestrator is generic
//! over; `EvmLedger` is the production implementation.

pub mod evm;
pub mod ledger;

pub use evm::EvmLedger;
pub use ledger::{LedgerError, MarketLedger};
