use crate::core::constants::POLICY_ID_HEX_LENGTH;
use crate::core::{SwapError, SwapResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A policy-qualified native asset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Asset {
    pub policy_id: String,
    pub asset_name_hex: String,
}

impl Asset {
    pub fn new(policy_id: impl Into<String>, asset_name_hex: impl Into<String>) -> Self {
        Self {
            policy_id: policy_id.into(),
            asset_name_hex: asset_name_hex.into(),
        }
    }

    /// Parse a concatenated `policyId + assetNameHex` identifier. The policy id
    /// occupies the first 56 hex characters.
    pub fn from_id(id: &str) -> SwapResult<Self> {
        if id.len() < POLICY_ID_HEX_LENGTH {
            return Err(SwapError::InvalidAssetId(format!(
                "{} is shorter than a policy id",
                id
            )));
        }

        let (policy_id, asset_name_hex) = id.split_at(POLICY_ID_HEX_LENGTH);
        if hex::decode(policy_id).is_err() {
            return Err(SwapError::InvalidAssetId(format!(
                "{} is not a hex-encoded policy id",
                policy_id
            )));
        }

        Ok(Self::new(policy_id, asset_name_hex))
    }

    pub fn id(&self) -> String {
        format!("{}{}", self.policy_id, self.asset_name_hex)
    }

    /// Human-readable asset name decoded from its hex form.
    pub fn asset_name(&self) -> String {
        hex::decode(&self.asset_name_hex)
            .map(|bytes| String::from_utf8_lossy(&bytes).to_string())
            .unwrap_or_else(|_| self.asset_name_hex.clone())
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

/// Either the chain's native currency or a policy-qualified asset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Token {
    Lovelace,
    Asset(Asset),
}

impl Token {
    pub fn is_lovelace(&self) -> bool {
        matches!(self, Token::Lovelace)
    }

    pub fn id(&self) -> String {
        match self {
            Token::Lovelace => "lovelace".to_string(),
            Token::Asset(asset) => asset.id(),
        }
    }

    pub fn policy_id(&self) -> &str {
        match self {
            Token::Lovelace => "",
            Token::Asset(asset) => &asset.policy_id,
        }
    }

    pub fn asset_name_hex(&self) -> &str {
        match self {
            Token::Lovelace => "",
            Token::Asset(asset) => &asset.asset_name_hex,
        }
    }

    /// Display name used in user-facing transaction metadata.
    pub fn display_name(&self) -> String {
        match self {
            Token::Lovelace => "ADA".to_string(),
            Token::Asset(asset) => asset.asset_name(),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

/// Structural token equality.
pub fn tokens_match(a: &Token, b: &Token) -> bool {
    a == b
}

/// One asset line inside a UTxO value or API payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetBalance {
    pub asset: Token,
    pub quantity: u128,
}

/// An unspent transaction output as reported by the data provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Utxo {
    pub tx_hash: String,
    pub output_index: u32,
    pub address: String,
    pub datum_hash: Option<String>,
    pub asset_balances: Vec<AssetBalance>,
}

/// An address holding a given asset, as reported by the data provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetAddress {
    pub address: String,
    pub quantity: u128,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AddressType {
    Contract,
    Base,
}

/// A fixed lovelace-denominated fee line attached to a swap order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapFee {
    pub id: String,
    pub title: String,
    pub description: String,
    pub value: u128,
    /// Refundable deposits are returned when the order settles or is reclaimed.
    pub is_returned: bool,
}

/// An output instruction consumed by the wallet/transaction collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayToAddress {
    pub address: String,
    pub address_type: AddressType,
    pub asset_balances: Vec<AssetBalance>,
    /// CBOR-encoded order datum, when the output carries one.
    pub datum: Option<String>,
    /// UTxOs this output must spend (e.g. when cancelling an open order).
    pub spend_utxos: Vec<Utxo>,
}

/// Point-in-time snapshot of a two-asset liquidity pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiquidityPool {
    pub dex: String,
    pub address: String,
    pub asset_a: Token,
    pub asset_b: Token,
    pub reserve_a: u128,
    pub reserve_b: u128,
    pub lp_token: Option<Asset>,
    pub total_lp_tokens: u128,
    pub pool_fee_percent: f64,
}

impl LiquidityPool {
    pub fn new(
        dex: impl Into<String>,
        address: impl Into<String>,
        asset_a: Token,
        asset_b: Token,
        reserve_a: u128,
        reserve_b: u128,
    ) -> Self {
        Self {
            dex: dex.into(),
            address: address.into(),
            asset_a,
            asset_b,
            reserve_a,
            reserve_b,
            lp_token: None,
            total_lp_tokens: 0,
            pool_fee_percent: 0.0,
        }
    }

    pub fn contains(&self, token: &Token) -> bool {
        tokens_match(&self.asset_a, token) || tokens_match(&self.asset_b, token)
    }

    /// The pool side opposite to the given token.
    pub fn other_asset(&self, token: &Token) -> SwapResult<&Token> {
        if tokens_match(&self.asset_a, token) {
            Ok(&self.asset_b)
        } else if tokens_match(&self.asset_b, token) {
            Ok(&self.asset_a)
        } else {
            Err(SwapError::TokenNotInPool {
                token: token.id(),
                pool: self.identifier(),
            })
        }
    }

    pub fn pair(&self) -> String {
        format!("{}/{}", self.asset_a.display_name(), self.asset_b.display_name())
    }

    pub fn identifier(&self) -> String {
        format!("{}.{}.{}", self.dex, self.asset_a.id(), self.asset_b.id())
    }

    /// Spot price of asset A denominated in asset B, derived from reserves.
    pub fn price(&self) -> f64 {
        if self.reserve_a == 0 {
            return 0.0;
        }
        self.reserve_b as f64 / self.reserve_a as f64
    }
}

impl fmt::Display for LiquidityPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.dex, self.pair())
    }
}
