use crate::aggregator::Aggregator;
use crate::core::{LiquidityPool, SwapError, SwapFee, SwapResult, Token, Utxo};
use crate::requests::SwapRequest;
use crate::transaction::{self, DexTransaction, TransactionStatus};
use futures::future::join_all;
use log::debug;
use std::sync::Arc;

/// Binds a pool to the portion of the total swap-in it should fill.
#[derive(Debug, Clone)]
pub struct SwapInAmountMapping {
    pub liquidity_pool: LiquidityPool,
    pub swap_in_amount: u128,
}

/// Binds a pool to the portion of the total receive it should produce.
#[derive(Debug, Clone)]
pub struct SwapOutAmountMapping {
    pub liquidity_pool: LiquidityPool,
    pub swap_out_amount: u128,
}

/// One logical swap fulfilled across several pools, possibly on different
/// DEXs. Totals are always recomputed from the constituent requests; there is
/// no independently stored aggregate.
#[derive(Clone)]
pub struct SplitSwapRequest {
    aggregator: Arc<Aggregator>,
    swap_requests: Vec<SwapRequest>,
    swap_in_token: Option<Token>,
    swap_out_token: Option<Token>,
    slippage_percent: f64,
    utxos: Vec<Utxo>,
}

impl SplitSwapRequest {
    pub(crate) fn new(aggregator: Arc<Aggregator>) -> Self {
        let slippage_percent = aggregator.config().default_slippage_percent;

        Self {
            aggregator,
            swap_requests: Vec::new(),
            swap_in_token: None,
            swap_out_token: None,
            slippage_percent,
            utxos: Vec::new(),
        }
    }

    pub fn swap_requests(&self) -> &[SwapRequest] {
        &self.swap_requests
    }

    pub fn liquidity_pools(&self) -> Vec<&LiquidityPool> {
        self.swap_requests
            .iter()
            .map(SwapRequest::liquidity_pool)
            .collect()
    }

    pub fn swap_in_token(&self) -> Option<&Token> {
        self.swap_in_token.as_ref()
    }

    pub fn swap_out_token(&self) -> Option<&Token> {
        self.swap_out_token.as_ref()
    }

    pub fn slippage_percent(&self) -> f64 {
        self.slippage_percent
    }

    pub fn with_swap_in_token(mut self, token: Token) -> Self {
        self.swap_in_token = Some(token);

        self
    }

    pub fn with_swap_out_token(mut self, token: Token) -> Self {
        self.swap_out_token = Some(token);

        self
    }

    fn configured_tokens(&self) -> SwapResult<(Token, Token)> {
        match (&self.swap_in_token, &self.swap_out_token) {
            (Some(swap_in), Some(swap_out)) => Ok((swap_in.clone(), swap_out.clone())),
            _ => Err(SwapError::ConfigError(
                "Swap-in & swap-out tokens must be set before setting the pool mappings."
                    .to_string(),
            )),
        }
    }

    /// Every mapping DEX must be registered, then every mapping pool must
    /// contain both configured swap tokens. Only then are the constituent
    /// requests materialized.
    fn validate_mapping_pools<'a>(
        &self,
        pools: impl Iterator<Item = &'a LiquidityPool> + Clone,
        swap_in_token: &Token,
        swap_out_token: &Token,
    ) -> SwapResult<()> {
        for pool in pools.clone() {
            if self.aggregator.dex_by_name(&pool.dex).is_err() {
                return Err(SwapError::UnavailableDex(pool.dex.clone()));
            }
        }

        for pool in pools {
            if !(pool.contains(swap_in_token) && pool.contains(swap_out_token)) {
                return Err(SwapError::PoolTokenMismatch {
                    pool: pool.identifier(),
                });
            }
        }

        Ok(())
    }

    pub fn with_swap_in_amount_mappings(
        mut self,
        mappings: Vec<SwapInAmountMapping>,
    ) -> SwapResult<Self> {
        let (swap_in_token, swap_out_token) = self.configured_tokens()?;
        self.validate_mapping_pools(
            mappings.iter().map(|mapping| &mapping.liquidity_pool),
            &swap_in_token,
            &swap_out_token,
        )?;

        self.swap_requests = mappings
            .into_iter()
            .map(|mapping| {
                self.aggregator
                    .new_swap_request(mapping.liquidity_pool)
                    .with_swap_in_token(swap_in_token.clone())?
                    .with_slippage_percent(self.slippage_percent)
                    .map(|request| request.with_swap_in_amount(mapping.swap_in_amount))
            })
            .collect::<SwapResult<Vec<SwapRequest>>>()?;

        Ok(self)
    }

    pub fn with_swap_out_amount_mappings(
        mut self,
        mappings: Vec<SwapOutAmountMapping>,
    ) -> SwapResult<Self> {
        let (swap_in_token, swap_out_token) = self.configured_tokens()?;
        self.validate_mapping_pools(
            mappings.iter().map(|mapping| &mapping.liquidity_pool),
            &swap_in_token,
            &swap_out_token,
        )?;

        self.swap_requests = mappings
            .into_iter()
            .map(|mapping| {
                self.aggregator
                    .new_swap_request(mapping.liquidity_pool)
                    .with_swap_in_token(swap_in_token.clone())?
                    .with_slippage_percent(self.slippage_percent)?
                    .with_swap_out_amount(mapping.swap_out_amount)
            })
            .collect::<SwapResult<Vec<SwapRequest>>>()?;

        Ok(self)
    }

    /// Propagates to every constituent request.
    pub fn with_slippage_percent(mut self, slippage_percent: f64) -> SwapResult<Self> {
        if slippage_percent < 0.0 {
            return Err(SwapError::InvalidSlippage(
                "Slippage percent must be zero or above.".to_string(),
            ));
        }

        for request in &mut self.swap_requests {
            request.set_slippage_percent(slippage_percent)?;
        }
        self.slippage_percent = slippage_percent;

        Ok(self)
    }

    /// Reverse the direction of every constituent and of the shared pair.
    pub fn flip(mut self) -> SwapResult<Self> {
        for request in &mut self.swap_requests {
            request.flip()?;
        }
        std::mem::swap(&mut self.swap_in_token, &mut self.swap_out_token);

        Ok(self)
    }

    /// Spendable inputs for the eventual transaction build.
    pub fn with_utxos(mut self, utxos: Vec<Utxo>) -> SwapResult<Self> {
        if utxos.is_empty() {
            return Err(SwapError::ConfigError(
                "Must provide valid UTxOs to use in swap.".to_string(),
            ));
        }
        self.utxos = utxos;

        Ok(self)
    }

    pub fn utxos(&self) -> &[Utxo] {
        &self.utxos
    }

    /// Total swap-in across constituents; always the sum, never cached.
    pub fn swap_in_amount(&self) -> u128 {
        self.swap_requests
            .iter()
            .map(SwapRequest::swap_in_amount)
            .sum()
    }

    pub fn get_estimated_receive(&self) -> SwapResult<u128> {
        self.swap_requests
            .iter()
            .try_fold(0u128, |total, request| {
                Ok(total + request.get_estimated_receive()?)
            })
    }

    pub fn get_minimum_receive(&self) -> SwapResult<u128> {
        self.swap_requests
            .iter()
            .try_fold(0u128, |total, request| {
                Ok(total + request.get_minimum_receive()?)
            })
    }

    /// Arithmetic mean of the constituents' price impact; exactly 0 for an
    /// empty or all-zero set rather than a division fault.
    pub fn get_avg_price_impact_percent(&self) -> SwapResult<f64> {
        let total: f64 = self
            .swap_requests
            .iter()
            .try_fold(0.0, |total, request| {
                Ok::<f64, SwapError>(total + request.get_price_impact_percent()?)
            })?;

        if total == 0.0 {
            return Ok(0.0);
        }

        Ok(total / self.swap_requests.len() as f64)
    }

    pub fn get_swap_fees(&self) -> SwapResult<Vec<SwapFee>> {
        let mut fees = Vec::new();
        for request in &self.swap_requests {
            fees.extend(request.get_swap_fees()?);
        }

        Ok(fees)
    }

    /// Submit the split order. Precondition violations fail synchronously;
    /// afterwards the returned transaction is the only progress channel. The
    /// per-constituent payment gathering fans out concurrently and joins
    /// before the Building stage starts.
    pub fn submit(&self) -> SwapResult<Arc<DexTransaction>> {
        let wallet = self.aggregator.wallet_provider().ok_or_else(|| {
            SwapError::ConfigError(
                "Wallet provider must be set before submitting a swap order.".to_string(),
            )
        })?;
        if !wallet.is_wallet_loaded() {
            return Err(SwapError::ConfigError(
                "Wallet must be loaded before submitting a swap order.".to_string(),
            ));
        }
        let (swap_in_token, swap_out_token) = self.configured_tokens()?;

        let transaction = Arc::new(wallet.create_transaction());
        let metadata_message = serde_json::json!({
            "msg": [format!(
                "[{}] Split {} -> {} Swap",
                self.aggregator.config().metadata_msg_branding,
                swap_in_token.display_name(),
                swap_out_token.display_name(),
            )],
        });

        let swap_requests = self.swap_requests.clone();
        let pipeline_transaction = transaction.clone();
        tokio::spawn(async move {
            debug!(
                "gathering payment instructions for {} split constituents",
                swap_requests.len()
            );
            let gathered = join_all(
                swap_requests
                    .iter()
                    .map(SwapRequest::get_payments_to_addresses),
            )
            .await;

            let mut payments = Vec::new();
            for result in gathered {
                match result {
                    Ok(constituent_payments) => payments.extend(constituent_payments),
                    Err(error) => {
                        pipeline_transaction.record_failure(
                            TransactionStatus::Building,
                            "Failed to build transaction.",
                            anyhow::Error::new(error),
                        );
                        return;
                    }
                }
            }

            transaction::drive_swap_order(pipeline_transaction, metadata_message, payments).await;
        });

        Ok(transaction)
    }
}
