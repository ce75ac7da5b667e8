//! Feed subscription lifecycle
//!
//! `start()` reconciles the standing stream rule and spawns the
//! long-lived stream task; `stop()` tears the task down. Starting is
//! idempotent on both counts: a live task is left alone, and rule
//! registration never duplicates an existing matching rule.

use std::sync::Arc;

use anyhow::Result;
use tokio::task::JoinHandle;
use tracing::info;

use execution::MarketLedger;

use crate::connectors::TwitterConnector;
use crate::orchestrator::MarketOrchestrator;

pub struct FeedSubscription<L: MarketLedger + 'static> {
    connector: Arc<TwitterConnector>,
    orchestrator: Arc<MarketOrchestrator<L, TwitterConnector>>,
    stream_task: Option<JoinHandle<()>>,
}

impl<L: MarketLedger + 'static> FeedSubscription<L> {
    pub fn new(
        connector: Arc<TwitterConnector>,
        orchestrator: Arc<MarketOrchestrator<L, TwitterConnector>>,
    ) -> Self {
        Self {
            connector,
            orchestrator,
            stream_task: None,
        }
    }

    /// Reconcile the filter rule and open the live stream. Safe to
    /// call repeatedly.
    pub async fn start(&mut self) -> Result<()> {
        if self.stream_task.is_some() {
            return Ok(());
        }

        self.connector.ensure_stream_rule().await?;

        let connector = self.connector.clone();
        let orchestrator = self.orchestrator.clone();
        self.stream_task = Some(tokio::spawn(async move {
            connector.run(orchestrator).await;
        }));

        info!("Feed subscription started");
        Ok(())
    }

    /// Stop dispatching new events. In-flight per-event handler tasks
    /// are independent of the stream task and are left to finish.
    pub async fn stop(&mut self) {
        if let Some(task) = self.stream_task.take() {
            task.abort();
            let _ = task.await;
            info!("Feed subscription stopped");
        }
    }
}
