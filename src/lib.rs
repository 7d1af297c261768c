pub mod aggregator;
pub mod core;
pub mod datum;
pub mod dex;
pub mod providers;
pub mod quotes;
pub mod requests;
pub mod transaction;

// Re-export commonly used types
pub use crate::aggregator::Aggregator;
pub use crate::core::{
    AggregatorConfig, Asset, AssetAddress, AssetBalance, LiquidityPool, PayToAddress,
    RequestConfig, SwapError, SwapFee, SwapResult, Token, Utxo,
};
pub use crate::dex::{Dex, WingRiders};
pub use crate::providers::{DataProvider, WalletProvider};
pub use crate::requests::{
    SplitSwapRequest, SwapInAmountMapping, SwapOutAmountMapping, SwapRequest,
};
pub use crate::transaction::{DexTransaction, TransactionStatus};
