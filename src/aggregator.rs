//! The DEX registry and entry point for swap requests.
//!
//! An [`Aggregator`] is constructed once at process start, wired with its
//! DEXs and collaborators, then shared behind an `Arc`. The registry is
//! immutable after construction; components resolve a DEX by name through
//! the aggregator they were handed instead of any global state.

use crate::core::{AggregatorConfig, LiquidityPool, SwapError, SwapResult, Token};
use crate::datum::{DefinitionBuilder, DefinitionBuilderFactory};
use crate::dex::Dex;
use crate::providers::{DataProvider, WalletProvider};
use crate::requests::{SplitSwapRequest, SwapRequest};
use futures::future::join_all;
use std::collections::HashMap;
use std::sync::Arc;

pub struct Aggregator {
    config: AggregatorConfig,
    dexs: HashMap<String, Arc<dyn Dex>>,
    data_provider: Option<Arc<dyn DataProvider>>,
    wallet_provider: Option<Arc<dyn WalletProvider>>,
    definition_builder_factory: Option<Arc<dyn DefinitionBuilderFactory>>,
}

impl Aggregator {
    pub fn new(config: AggregatorConfig) -> SwapResult<Self> {
        config.validate()?;

        Ok(Self {
            config,
            dexs: HashMap::new(),
            data_provider: None,
            wallet_provider: None,
            definition_builder_factory: None,
        })
    }

    pub fn register_dex(mut self, dex: Arc<dyn Dex>) -> Self {
        self.dexs.insert(dex.name().to_string(), dex);

        self
    }

    pub fn with_data_provider(mut self, provider: Arc<dyn DataProvider>) -> Self {
        self.data_provider = Some(provider);

        self
    }

    pub fn with_wallet_provider(mut self, provider: Arc<dyn WalletProvider>) -> Self {
        self.wallet_provider = Some(provider);

        self
    }

    pub fn with_definition_builder_factory(
        mut self,
        factory: Arc<dyn DefinitionBuilderFactory>,
    ) -> Self {
        self.definition_builder_factory = Some(factory);

        self
    }

    pub fn config(&self) -> &AggregatorConfig {
        &self.config
    }

    pub fn dex_names(&self) -> Vec<&str> {
        self.dexs.keys().map(String::as_str).collect()
    }

    pub fn dex_by_name(&self, name: &str) -> SwapResult<Arc<dyn Dex>> {
        self.dexs
            .get(name)
            .cloned()
            .ok_or_else(|| SwapError::UnavailableDex(name.to_string()))
    }

    pub fn data_provider(&self) -> Option<Arc<dyn DataProvider>> {
        self.data_provider.clone()
    }

    pub fn wallet_provider(&self) -> Option<Arc<dyn WalletProvider>> {
        self.wallet_provider.clone()
    }

    /// A fresh datum builder from the configured factory.
    pub fn definition_builder(&self) -> SwapResult<Box<dyn DefinitionBuilder>> {
        let factory = self.definition_builder_factory.as_ref().ok_or_else(|| {
            SwapError::ConfigError(
                "Definition builder factory must be set before building swap orders.".to_string(),
            )
        })?;

        Ok(factory.new_builder())
    }

    /// Query every registered DEX for pools containing the requested tokens.
    pub async fn liquidity_pools(
        &self,
        asset_a: &Token,
        asset_b: Option<&Token>,
    ) -> SwapResult<Vec<LiquidityPool>> {
        let provider = self.data_provider.as_ref().ok_or_else(|| {
            SwapError::ConfigError(
                "Data provider must be set before querying liquidity pools.".to_string(),
            )
        })?;

        let queries = self
            .dexs
            .values()
            .map(|dex| dex.liquidity_pools(provider.as_ref(), asset_a, asset_b));

        let mut pools = Vec::new();
        for result in join_all(queries).await {
            pools.extend(result?);
        }

        Ok(pools)
    }

    pub fn new_swap_request(self: &Arc<Self>, liquidity_pool: LiquidityPool) -> SwapRequest {
        SwapRequest::new(self.clone(), liquidity_pool)
    }

    pub fn new_split_swap_request(self: &Arc<Self>) -> SplitSwapRequest {
        SplitSwapRequest::new(self.clone())
    }
}
