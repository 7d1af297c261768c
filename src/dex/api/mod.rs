pub mod wingriders;

pub use wingriders::WingRidersApi;

use crate::core::{LiquidityPool, SwapResult, Token};
use async_trait::async_trait;

/// Off-chain market-data source for a DEX's liquidity pools.
#[async_trait]
pub trait DexApi: Send + Sync {
    /// Pools filtered to those containing at least one of the requested
    /// tokens.
    async fn liquidity_pools(
        &self,
        asset_a: &Token,
        asset_b: Option<&Token>,
    ) -> SwapResult<Vec<LiquidityPool>>;
}
