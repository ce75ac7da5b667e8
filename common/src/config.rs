//! Runtime configuration, built explicitly from the environment at
//! startup and passed into the subscription manager and orchestrator.
//! No ambient globals: every credential is read exactly once here.

use anyhow::{Context, Result};

/// Feed API credentials and the handle the agent listens as.
#[derive(Debug, Clone)]
pub struct TwitterConfig {
    pub api_key: String,
    pub api_secret: String,
    pub access_token: String,
    pub access_secret: String,
    /// Handle (without the `@`) the trigger phrase is bound to.
    pub agent_username: String,
}

impl TwitterConfig {
    /// The lower-cased substring that marks a message as a creation
    /// request, e.g. `@marketbot create market:`.
    pub fn trigger_phrase(&self) -> String {
        format!("@{} create market:", self.agent_username.to_lowercase())
    }
}

/// Chain connection and contract parameters.
#[derive(Debug, Clone)]
pub struct ChainConfig {
    pub rpc_url: String,
    /// Explicit chain id for transaction signing; when absent the
    /// provider's reported id is used.
    pub chain_id: Option<u64>,
    pub private_key: String,
    pub contract_address: String,
    /// Base URL the shareable market link is built from.
    pub frontend_url: String,
}

/// Full agent configuration.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub twitter: TwitterConfig,
    pub chain: ChainConfig,
}

fn required(name: &str) -> Result<String> {
    std::env::var(name).with_context(|| format!("{} must be set", name))
}

impl AgentConfig {
    /// Read the full configuration from the environment.
    pub fn from_env() -> Result<Self> {
        let chain_id = match std::env::var("CHAIN_ID") {
            Ok(raw) => Some(raw.parse::<u64>().context("CHAIN_ID must be an integer")?),
            Err(_) => None,
        };

        Ok(Self {
            twitter: TwitterConfig {
                api_key: required("TWITTER_API_KEY")?,
                api_secret: required("TWITTER_API_SECRET")?,
                access_token: required("TWITTER_ACCESS_TOKEN")?,
                access_secret: required("TWITTER_ACCESS_SECRET")?,
                agent_username: required("AGENT_USERNAME")?,
            },
            chain: ChainConfig {
                rpc_url: required("CHAIN_RPC_URL")?,
                chain_id,
                private_key: required("PRIVATE_KEY")?,
                contract_address: required("PREDICTION_MARKET_ADDRESS")?,
                frontend_url: required("FRONTEND_URL")?,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn twitter_config(handle: &str) -> TwitterConfig {
        TwitterConfig {
            api_key: "k".to_string(),
            api_secret: "s".to_string(),
            access_token: "t".to_string(),
            access_secret: "ts".to_string(),
            agent_username: handle.to_string(),
        }
    }

    #[test]
    fn trigger_phrase_lowercases_handle() {
        let config = twitter_config("MarketBot");
        assert_eq!(config.trigger_phrase(), "@marketbot create market:");
    }

    #[test]
    fn trigger_phrase_binds_colon() {
        let config = twitter_config("bot");
        assert_eq!(config.trigger_phrase(), "@bot create market:");
    }
}
