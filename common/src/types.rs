//! Domain entities passed through the creation pipeline
//!
//! All of these are transient, single-owner values: constructed once,
//! handed down the pipeline, dropped after the reply is sent. None are
//! shared across concurrent event tasks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One social post delivered by the feed, already mapped out of the
/// wire envelope by the connector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomingMessage {
    /// Feed-assigned message id, used to thread replies.
    pub id: String,
    pub text: String,
    pub author_id: String,
    #[serde(default)]
    pub mentions: Vec<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Parsed intent to create a binary market: a question plus exactly
/// two distinct, non-empty options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketRequest {
    pub question: String,
    pub options: [String; 2],
}

impl MarketRequest {
    pub fn option_a(&self) -> &str {
        &self.options[0]
    }

    pub fn option_b(&self) -> &str {
        &self.options[1]
    }
}

/// Outcome of a confirmed on-chain market creation.
///
/// The identifier is only known after confirmation; the URL is derived
/// from it by the orchestrator using the configured frontend base.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedMarket {
    pub market_id: u64,
    pub url: String,
}
