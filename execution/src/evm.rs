use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use ethers::contract::abigen;
use ethers::middleware::SignerMiddleware;
use ethers::providers::{Http, Middleware, Provider};
use ethers::signers::{LocalWallet, Signer};
use ethers::types::{Address, U256};
use tracing::{debug, info};

use common::ChainConfig;

use crate::ledger::{LedgerError, MarketLedger};

abigen!(
    PredictionMarket,
    r#"[
        function createMarket(string question, string optionA, string optionB, uint256 duration, string category, string[] tags, uint256 feeBps)
        function marketCount() view returns (uint256)
    ]"#
);

type SignerClient = SignerMiddleware<Provider<Http>, LocalWallet>;

/// Production ledger backed by the prediction-market contract on an
/// EVM chain.
pub struct EvmLedger {
    contract: PredictionMarket<SignerClient>,
}

impl EvmLedger {
    /// Connect the signing client and bind the contract.
    ///
    /// When no chain id is configured, the provider's reported id is
    /// used for transaction signing.
    pub async fn connect(config: &ChainConfig) -> Result<Self> {
        let provider = Provider::<Http>::try_from(config.rpc_url.as_str())
            .with_context(|| format!("invalid CHAIN_RPC_URL '{}'", config.rpc_url))?;

        let chain_id = match config.chain_id {
            Some(id) => id,
            None => provider
                .get_chainid()
                .await
                .context("failed to query chain id from RPC endpoint")?
                .as_u64(),
        };

        let wallet: LocalWallet = config
            .private_key
            .parse()
            .context("invalid PRIVATE_KEY")?;
        let wallet = wallet.with_chain_id(chain_id);

        let address: Address = config
            .contract_address
            .parse()
            .with_context(|| format!("invalid contract address '{}'", config.contract_address))?;

        let client = Arc::new(SignerMiddleware::new(provider, wallet));

        info!(
            contract = %config.contract_address,
            chain_id,
            "Connected to prediction market contract"
        );

        Ok(Self {
            contract: PredictionMarket::new(address, client),
        })
    }
}

#[async_trait]
impl MarketLedger for EvmLedger {
    async fn submit_market(
        &self,
        question: &str,
        option_a: &str,
        option_b: &str,
        duration_secs: u64,
        category: &str,
        tags: Vec<String>,
        fee_bps: u64,
    ) -> Result<(), LedgerError> {
        let call = self.contract.create_market(
            question.to_string(),
            option_a.to_string(),
            option_b.to_string(),
            U256::from(duration_secs),
            category.to_string(),
            tags,
            U256::from(fee_bps),
        );

        let pending = call
            .send()
            .await
            .map_err(|e| LedgerError::Submission(e.to_string()))?;
        let tx_hash = pending.tx_hash();
        debug!(tx_hash = %format!("{:#x}", tx_hash), "createMarket transaction submitted");

        let receipt = pending
            .await
            .map_err(|e| LedgerError::Submission(e.to_string()))?
            .ok_or(LedgerError::Confirmation)?;

        info!(
            tx_hash = %format!("{:#x}", tx_hash),
            block = ?receipt.block_number,
            "createMarket transaction confirmed"
        );
        Ok(())
    }

    async fn market_count(&self) -> Result<u64, LedgerError> {
        let count: U256 = self
            .contract
            .market_count()
            .call()
            .await
            .map_err(|e| LedgerError::Query(e.to_string()))?;
        Ok(count.as_u64())
    }
}
