use crate::core::{constants::*, error::SwapResult, SwapError};
use serde::{Deserialize, Serialize};

/// Transport settings shared by the market-data API clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestConfig {
    pub timeout_secs: u64,
    pub proxy_url: Option<String>,
    pub max_retries: u32,
}

impl RequestConfig {
    pub fn validate(&self) -> SwapResult<()> {
        if self.timeout_secs == 0 {
            return Err(SwapError::ConfigError(
                "Request timeout must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_REQUEST_TIMEOUT,
            proxy_url: None,
            max_retries: MAX_REQUEST_RETRIES,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregatorConfig {
    /// Branding tag prepended to the transaction metadata message.
    pub metadata_msg_branding: String,
    pub default_slippage_percent: f64,
    pub request: RequestConfig,
}

impl AggregatorConfig {
    pub fn validate(&self) -> SwapResult<()> {
        if self.metadata_msg_branding.is_empty() {
            return Err(SwapError::ConfigError(
                "Metadata branding must not be empty".to_string(),
            ));
        }

        if self.default_slippage_percent < 0.0 {
            return Err(SwapError::ConfigError(
                "Default slippage cannot be negative".to_string(),
            ));
        }

        if self.default_slippage_percent > MAX_SLIPPAGE_PERCENT {
            return Err(SwapError::ConfigError(
                "Default slippage cannot exceed 100%".to_string(),
            ));
        }

        self.request.validate()
    }
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            metadata_msg_branding: "Cardex".to_string(),
            default_slippage_percent: DEFAULT_SLIPPAGE_PERCENT,
            request: RequestConfig::default(),
        }
    }
}
