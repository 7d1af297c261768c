//! Collaborator contracts for chain indexing and wallet signing backends.

use crate::core::{Asset, AssetAddress, SwapResult, Utxo};
use crate::transaction::DexTransaction;
use async_trait::async_trait;

/// UTxO/address indexing backend. May be queried concurrently per address.
#[async_trait]
pub trait DataProvider: Send + Sync {
    /// Addresses currently holding the given asset.
    async fn asset_addresses(&self, asset: &Asset) -> SwapResult<Vec<AssetAddress>>;

    /// UTxOs sitting at an address, optionally narrowed to those holding the
    /// given asset.
    async fn utxos(&self, address: &str, asset: Option<&Asset>) -> SwapResult<Vec<Utxo>>;
}

/// Wallet/signing backend used to assemble and submit swap transactions.
pub trait WalletProvider: Send + Sync {
    fn is_wallet_loaded(&self) -> bool;

    fn address(&self) -> String;

    fn public_key_hash(&self) -> String;

    fn staking_key_hash(&self) -> String;

    /// A fresh transaction handle bound to this wallet.
    fn create_transaction(&self) -> DexTransaction;
}
