//! Shared types and configuration for the market-creation agent
//!
//! Everything that crosses a crate boundary lives here: the domain
//! entities flowing through the pipeline and the explicitly constructed
//! runtime configuration.

pub mod config;
pub mod types;

pub use config::{AgentConfig, ChainConfig, TwitterConfig};
pub use types::{CreatedMarket, IncomingMessage, MarketRequest};
