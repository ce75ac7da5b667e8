//! Twitter filtered-stream connector
//!
//! Owns every HTTP detail of the feed collaborator:
//! - stream-rule listing and registration
//! - the long-lived filtered stream (line-delimited JSON over HTTP)
//! - wire-to-domain mapping of delivered tweets
//! - threaded replies on the originating tweet
//!
//! The rest of the pipeline only sees `IncomingMessage` values and the
//! `ReplySink` capability.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures_util::{FutureExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use common::{IncomingMessage, TwitterConfig};
use execution::MarketLedger;

use crate::orchestrator::{MarketOrchestrator, ReplySink};
use crate::validator;

const API_BASE: &str = "https://api.twitter.com/2";

/// Fields requested for every delivered tweet.
const STREAM_FIELDS: &str = "author_id,created_at,entities";

/// One delivered stream payload: `{ "data": { ...tweet... } }`.
#[derive(Debug, Deserialize)]
struct StreamEnvelope {
    data: TweetData,
}

#[derive(Debug, Deserialize)]
struct TweetData {
    id: String,
    text: String,
    author_id: String,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    entities: Option<TweetEntities>,
}

#[derive(Debug, Default, Deserialize)]
struct TweetEntities {
    #[serde(default)]
    mentions: Vec<TweetMention>,
}

#[derive(Debug, Deserialize)]
struct TweetMention {
    username: String,
}

#[derive(Debug, Deserialize)]
struct RulesResponse {
    #[serde(default)]
    data: Vec<StreamRule>,
}

#[derive(Debug, Clone, Deserialize)]
struct StreamRule {
    #[serde(default)]
    id: Option<String>,
    value: String,
}

#[derive(Debug, Serialize)]
struct AddRulesRequest {
    add: Vec<RuleValue>,
}

#[derive(Debug, Serialize)]
struct RuleValue {
    value: String,
}

#[derive(Debug, Serialize)]
struct ReplyRequest<'a> {
    text: &'a str,
    reply: ReplyTarget<'a>,
}

#[derive(Debug, Serialize)]
struct ReplyTarget<'a> {
    in_reply_to_tweet_id: &'a str,
}

impl StreamEnvelope {
    fn into_message(self) -> IncomingMessage {
        let mentions = self
            .data
            .entities
            .unwrap_or_default()
            .mentions
            .into_iter()
            .map(|m| m.username)
            .collect();
        IncomingMessage {
            id: self.data.id,
            text: self.data.text,
            author_id: self.data.author_id,
            mentions,
            created_at: self.data.created_at,
        }
    }
}

/// The rule value that still needs registering, or `None` when a rule
/// with the trigger value is already active.
fn rule_to_add(existing: &[StreamRule], trigger: &str) -> Option<String> {
    if existing.iter().any(|rule| rule.value == trigger) {
        None
    } else {
        Some(trigger.to_string())
    }
}

/// Map one wire line into the domain message. Lines that are not tweet
/// envelopes (operational notices, rule summaries) are skipped.
fn parse_stream_line(line: &str) -> Option<IncomingMessage> {
    match serde_json::from_str::<StreamEnvelope>(line) {
        Ok(envelope) => Some(envelope.into_message()),
        Err(e) => {
            warn!("Skipping unparseable stream line: {}", e);
            None
        }
    }
}

/// Twitter API v2 connector: feed source and reply channel in one.
pub struct TwitterConnector {
    http: reqwest::Client,
    config: TwitterConfig,
    api_base: String,
    trigger: String,
    reconnect_delay: u64,
}

impl TwitterConnector {
    pub fn new(config: TwitterConfig) -> Self {
        let trigger = config.trigger_phrase();
        Self {
            http: reqwest::Client::new(),
            config,
            api_base: API_BASE.to_string(),
            trigger,
            reconnect_delay: 5,
        }
    }

    fn bearer(&self) -> String {
        format!("Bearer {}", self.config.access_token)
    }

    async fn list_active_rules(&self) -> Result<Vec<StreamRule>> {
        let url = format!("{}/tweets/search/stream/rules", self.api_base);
        let response = self
            .http
            .get(&url)
            .header("Authorization", self.bearer())
            .send()
            .await
            .context("failed to list stream rules")?;
        if !response.status().is_success() {
            return Err(anyhow!("stream rule listing failed: {}", response.status()));
        }
        let rules: RulesResponse = response
            .json()
            .await
            .context("malformed stream rules response")?;
        Ok(rules.data)
    }

    async fn add_rule(&self, value: String) -> Result<()> {
        let url = format!("{}/tweets/search/stream/rules", self.api_base);
        let body = AddRulesRequest {
            add: vec![RuleValue { value }],
        };
        let response = self
            .http
            .post(&url)
            .header("Authorization", self.bearer())
            .json(&body)
            .send()
            .await
            .context("failed to register stream rule")?;
        if !response.status().is_success() {
            return Err(anyhow!(
                "stream rule registration failed: {}",
                response.status()
            ));
        }
        Ok(())
    }

    /// Register the standing filter rule if it is not already active.
    ///
    /// Read, diff, apply: listing first keeps repeated startups from
    /// piling up duplicate rules.
    pub async fn ensure_stream_rule(&self) -> Result<()> {
        let existing = self.list_active_rules().await?;
        match rule_to_add(&existing, &self.trigger) {
            Some(value) => {
                self.add_rule(value).await?;
                info!(rule = %self.trigger, "Registered stream rule");
            }
            None => {
                debug!(rule = %self.trigger, "Stream rule already registered");
            }
        }
        Ok(())
    }

    /// Consume the filtered stream until the task is torn down,
    /// reconnecting with a fixed delay after transport errors.
    pub async fn run<L>(&self, orchestrator: Arc<MarketOrchestrator<L, Self>>)
    where
        L: MarketLedger + 'static,
    {
        loop {
            match self.connect_and_stream(&orchestrator).await {
                Ok(()) => info!("Feed stream closed by server"),
                Err(e) => error!("Feed stream failed: {:#}", e),
            }
            info!("Reconnecting in {} seconds...", self.reconnect_delay);
            sleep(Duration::from_secs(self.reconnect_delay)).await;
        }
    }

    async fn connect_and_stream<L>(
        &self,
        orchestrator: &Arc<MarketOrchestrator<L, Self>>,
    ) -> Result<()>
    where
        L: MarketLedger + 'static,
    {
        let url = format!(
            "{}/tweets/search/stream?tweet.fields={}",
            self.api_base, STREAM_FIELDS
        );
        info!("Connecting to filtered stream at {}", url);

        let response = self
            .http
            .get(&url)
            .header("Authorization", self.bearer())
            .send()
            .await
            .context("failed to open filtered stream")?;
        if !response.status().is_success() {
            return Err(anyhow!("filtered stream rejected: {}", response.status()));
        }

        info!("✅ Connected to filtered stream");

        let mut body = response.bytes_stream();
        let mut buffer: Vec<u8> = Vec::new();

        while let Some(chunk) = body.next().await {
            let chunk = chunk.context("filtered stream transport error")?;
            buffer.extend_from_slice(&chunk);

            while let Some(pos) = buffer.iter().position(|&b| b == b'\n') {
                let line: Vec<u8> = buffer.drain(..=pos).collect();
                let line = String::from_utf8_lossy(&line);
                let line = line.trim();
                if line.is_empty() {
                    // Keep-alive heartbeat.
                    continue;
                }
                self.dispatch_line(line, orchestrator);
            }
        }

        Ok(())
    }

    /// Decode one stream line and hand the event to its own task.
    ///
    /// Per-event isolation: each accepted message is handled in an
    /// independently spawned task with a boundary handler, so a fault
    /// in one event never aborts the stream or the handling of later
    /// events.
    fn dispatch_line<L>(&self, line: &str, orchestrator: &Arc<MarketOrchestrator<L, Self>>)
    where
        L: MarketLedger + 'static,
    {
        let Some(message) = parse_stream_line(line) else {
            return;
        };

        if !validator::is_creation_request(&message, &self.trigger) {
            debug!(message_id = %message.id, "Ignoring message without trigger phrase");
            return;
        }

        let orchestrator = orchestrator.clone();
        let message_id = message.id.clone();
        tokio::spawn(async move {
            let handled =
                std::panic::AssertUnwindSafe(orchestrator.handle(&message)).catch_unwind();
            if handled.await.is_err() {
                error!(message_id = %message_id, "Event handler panicked");
            }
        });
    }
}

#[async_trait]
impl ReplySink for TwitterConnector {
    /// POST a threaded reply to the originating tweet. Failures are
    /// surfaced to the caller, which logs them without halting the
    /// pipeline.
    async fn reply(&self, text: &str, in_reply_to: &str) -> Result<()> {
        let url = format!("{}/tweets", self.api_base);
        let body = ReplyRequest {
            text,
            reply: ReplyTarget {
                in_reply_to_tweet_id: in_reply_to,
            },
        };
        let response = self
            .http
            .post(&url)
            .header("Authorization", self.bearer())
            .json(&body)
            .send()
            .await
            .context("failed to send reply")?;
        if !response.status().is_success() {
            return Err(anyhow!("reply rejected: {}", response.status()));
        }
        debug!(in_reply_to = %in_reply_to, "Reply sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tweet_envelope() {
        let json = r#"{
            "data": {
                "id": "1760000000000000001",
                "text": "@marketbot create market: \"Will it rain?\" Options: Yes/No",
                "author_id": "123456",
                "created_at": "2025-02-20T12:00:00.000Z",
                "entities": {
                    "mentions": [{"start": 0, "end": 10, "username": "marketbot"}]
                }
            }
        }"#;

        let message = parse_stream_line(json).unwrap();
        assert_eq!(message.id, "1760000000000000001");
        assert_eq!(message.author_id, "123456");
        assert_eq!(message.mentions, vec!["marketbot".to_string()]);
        assert!(message.created_at.is_some());
        assert!(message.text.contains("create market:"));
    }

    #[test]
    fn test_parse_envelope_without_entities() {
        let json = r#"{
            "data": {
                "id": "2",
                "text": "hello",
                "author_id": "7"
            }
        }"#;

        let message = parse_stream_line(json).unwrap();
        assert!(message.mentions.is_empty());
        assert!(message.created_at.is_none());
    }

    #[test]
    fn test_skips_non_tweet_lines() {
        assert!(parse_stream_line(r#"{"errors":[{"title":"operational-disconnect"}]}"#).is_none());
        assert!(parse_stream_line("not json at all").is_none());
    }

    #[test]
    fn test_rule_diff_adds_when_absent() {
        assert_eq!(
            rule_to_add(&[], "@marketbot create market:"),
            Some("@marketbot create market:".to_string())
        );
    }

    #[test]
    fn test_rule_diff_skips_existing() {
        let existing = vec![StreamRule {
            id: Some("1".to_string()),
            value: "@marketbot create market:".to_string(),
        }];
        assert_eq!(rule_to_add(&existing, "@marketbot create market:"), None);
    }

    #[test]
    fn test_rule_diff_is_idempotent() {
        // Registering, then reconciling again, must not produce a
        // second rule with the same value.
        let mut rules: Vec<StreamRule> = Vec::new();
        if let Some(value) = rule_to_add(&rules, "trigger") {
            rules.push(StreamRule { id: None, value });
        }
        assert_eq!(rules.len(), 1);
        assert_eq!(rule_to_add(&rules, "trigger"), None);
        assert_eq!(rules.len(), 1);
    }

    #[test]
    fn test_rule_diff_ignores_unrelated_rules() {
        let existing = vec![StreamRule {
            id: Some("1".to_string()),
            value: "@otherbot create market:".to_string(),
        }];
        assert!(rule_to_add(&existing, "@marketbot create market:").is_some());
    }
}
