use std::sync::Arc;

use anyhow::Result;
use tracing::{info, Level};
use tracing_subscriber;

mod connectors;
mod orchestrator;
mod parser;
mod subscription;
mod validator;

use common::AgentConfig;
use connectors::TwitterConnector;
use execution::EvmLedger;
use orchestrator::MarketOrchestrator;
use subscription::FeedSubscription;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    info!("🚀 Starting Market Creation Agent");

    let config = AgentConfig::from_env()?;

    let ledger = Arc::new(EvmLedger::connect(&config.chain).await?);
    let connector = Arc::new(TwitterConnector::new(config.twitter));
    let orchestrator = Arc::new(MarketOrchestrator::new(
        ledger,
        connector.clone(),
        config.chain.frontend_url.clone(),
    ));

    let mut subscription = FeedSubscription::new(connector, orchestrator);
    subscription.start().await?;

    tokio::signal::ctrl_c().await?;
    info!("👋 Shutting down gracefully...");
    subscription.stop().await;

    Ok(())
}
