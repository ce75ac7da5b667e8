//! Market creation orchestrator
//!
//! Drives one validated message end to end:
//! parse → submit on-chain → resolve the new identifier → reply.
//!
//! All side effects (ledger write, reply send) happen here; no state
//! is retained between invocations, so concurrent event tasks never
//! share anything mutable.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tracing::{error, info, warn};

use common::{CreatedMarket, IncomingMessage, MarketRequest};
use execution::{LedgerError, MarketLedger};

use crate::parser;

/// Fixed market lifetime: 7 days.
pub const MARKET_DURATION_SECS: u64 = 7 * 24 * 60 * 60;
/// Category label applied to every feed-created market.
pub const MARKET_CATEGORY: &str = "SOCIAL";
/// Creation fee in basis points (1%).
pub const MARKET_FEE_BPS: u64 = 100;

pub const FORMAT_GUIDANCE_REPLY: &str = "Sorry, I couldn't understand the market format. \
    Please use: \"Question\" Options: Option1/Option2";
pub const SUBMISSION_FAILED_REPLY: &str =
    "Sorry, there was an error creating the market. Please try again later.";

/// Capability to send a threaded reply on the originating message.
#[async_trait]
pub trait ReplySink: Send + Sync {
    async fn reply(&self, text: &str, in_reply_to: &str) -> Result<()>;
}

/// Orchestrates the per-message creation pipeline. Generic over the
/// ledger and reply collaborators so the pipeline is testable without
/// a chain or a feed.
pub struct MarketOrchestrator<L, R> {
    ledger: Arc<L>,
    replies: Arc<R>,
    frontend_url: String,
}

impl<L: MarketLedger, R: ReplySink> MarketOrchestrator<L, R> {
    pub fn new(ledger: Arc<L>, replies: Arc<R>, frontend_url: String) -> Self {
        Self {
            ledger,
            replies,
            frontend_url,
        }
    }

    /// Handle one validated message.
    ///
    /// Every message that reaches this point gets exactly one reply:
    /// success, format guidance, or the generic failure notice.
    /// Reply-send failures are logged and never fail the request
    /// further.
    pub async fn handle(&self, message: &IncomingMessage) {
        let Some(request) = parser::parse_request(&message.text) else {
            info!(message_id = %message.id, "Request did not match the market format");
            self.send_reply(FORMAT_GUIDANCE_REPLY, &message.id).await;
            return;
        };

        match self.create_market(&request).await {
            Ok(created) => {
                info!(
                    message_id = %message.id,
                    market_id = created.market_id,
                    "✅ Market created"
                );
                let text = format!(
                    "✨ Market created! Predict now at: {}\n\nQuestion: {}\nOptions: {} vs {}",
                    created.url,
                    request.question,
                    request.option_a(),
                    request.option_b()
                );
                self.send_reply(&text, &message.id).await;
            }
            Err(e) => {
                error!(
                    message_id = %message.id,
                    question = %request.question,
                    option_a = %request.option_a(),
                    option_b = %request.option_b(),
                    "Market creation failed: {}",
                    e
                );
                self.send_reply(SUBMISSION_FAILED_REPLY, &message.id).await;
            }
        }
    }

    /// Submit the creation transaction, then resolve the new market's
    /// identifier as `market_count() - 1`.
    ///
    /// Known limitation: the count-based lookup is not atomic with
    /// respect to concurrent creations by other actors, so the derived
    /// identifier can be wrong under a race. Resolving it exactly
    /// would need the id from the submission's own receipt, which the
    /// contract interface does not expose.
    async fn create_market(&self, request: &MarketRequest) -> Result<CreatedMarket, LedgerError> {
        self.ledger
            .submit_market(
                &request.question,
                request.option_a(),
                request.option_b(),
                MARKET_DURATION_SECS,
                MARKET_CATEGORY,
                Vec::new(),
                MARKET_FEE_BPS,
            )
            .await?;

        let count = self.ledger.market_count().await?;
        let market_id = count.saturating_sub(1);
        Ok(CreatedMarket {
            market_id,
            url: format!("{}/markets/{}", self.frontend_url, market_id),
        })
    }

    async fn send_reply(&self, text: &str, in_reply_to: &str) {
        if let Err(e) = self.replies.reply(text, in_reply_to).await {
            warn!(message_id = %in_reply_to, "Failed to send reply: {:#}", e);
        }
    }
}
