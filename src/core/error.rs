use thiserror::Error;

pub type SwapResult<T> = Result<T, SwapError>;

#[derive(Error, Debug)]
pub enum SwapError {
    #[error("DEX {0} provided with the liquidity pool is not available")]
    UnavailableDex(String),

    #[error("pool {pool} does not contain the provided swap-in or swap-out tokens")]
    PoolTokenMismatch { pool: String },

    #[error("token {token} is not part of pool {pool}")]
    TokenNotInPool { token: String, pool: String },

    #[error("invalid slippage: {0}")]
    InvalidSlippage(String),

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("invalid asset identifier: {0}")]
    InvalidAssetId(String),

    #[error("insufficient liquidity in pool {pool}: available {available}, requested {requested}")]
    InsufficientLiquidity {
        pool: String,
        available: u128,
        requested: u128,
    },

    #[error("invalid pool state: {0}")]
    InvalidPoolState(String),

    #[error("math overflow in swap calculation")]
    MathOverflow,

    #[error("arithmetic domain error: {0}")]
    MathDomain(String),

    #[error("configuration error: {0}")]
    ConfigError(String),

    #[error("datum error: {0}")]
    DatumError(String),

    #[error("network error: {0}")]
    NetworkError(String),

    #[error("serialization error: {0}")]
    SerializationError(String),

    #[error("provider error: {0}")]
    ProviderError(String),

    #[error("transaction failed: {0}")]
    TransactionFailed(String),

    #[error("other error: {0}")]
    Other(String),
}

impl From<anyhow::Error> for SwapError {
    fn from(err: anyhow::Error) -> Self {
        SwapError::Other(err.to_string())
    }
}

impl From<reqwest::Error> for SwapError {
    fn from(err: reqwest::Error) -> Self {
        SwapError::NetworkError(err.to_string())
    }
}

impl From<serde_json::Error> for SwapError {
    fn from(err: serde_json::Error) -> Self {
        SwapError::SerializationError(err.to_string())
    }
}
