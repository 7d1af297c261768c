pub mod api;
pub mod wingriders;

pub use wingriders::WingRiders;

use crate::core::{
    Asset, AssetBalance, LiquidityPool, PayToAddress, SwapError, SwapFee, SwapResult, Token, Utxo,
};
use crate::datum::{DatumParameterKey, DatumParameters, DefinitionBuilder};
use crate::providers::DataProvider;
use async_trait::async_trait;

/// Per-DEX extraction and order-building contract.
///
/// Pricing itself is uniform constant-product math (see [`crate::quotes`]);
/// a DEX contributes its pool discovery, fee schedule and on-chain order
/// layout.
#[async_trait]
pub trait Dex: Send + Sync {
    fn name(&self) -> &str;

    /// Address of the on-chain order (swap request) script.
    fn order_address(&self) -> &str;

    /// All pools plausibly containing the requested tokens, extracted from
    /// the data provider's on-chain state.
    async fn liquidity_pools(
        &self,
        provider: &dyn DataProvider,
        asset_a: &Token,
        asset_b: Option<&Token>,
    ) -> SwapResult<Vec<LiquidityPool>>;

    /// Best-effort extraction of a single pool from a raw UTxO. Malformed or
    /// irrelevant UTxOs yield `None`, never an error.
    fn liquidity_pool_from_utxo(
        &self,
        utxo: &Utxo,
        asset_a: &Token,
        asset_b: Option<&Token>,
    ) -> Option<LiquidityPool>;

    /// Turn a validated datum parameter map into the concrete order outputs.
    async fn build_swap_order(
        &self,
        parameters: DatumParameters,
        builder: &mut dyn DefinitionBuilder,
    ) -> SwapResult<Vec<PayToAddress>>;

    /// Spend an open order at this DEX's order address back to its owner.
    async fn build_cancel_swap_order(
        &self,
        order_utxos: &[Utxo],
        return_address: &str,
    ) -> SwapResult<Vec<PayToAddress>>;

    /// Fixed fee lines attached to every swap order on this DEX.
    fn swap_order_fees(&self) -> Vec<SwapFee>;

    /// Bundle the swap-in amount into an order payment on top of its fee
    /// lovelace: a native-currency swap-in joins the existing lovelace line,
    /// a token swap-in becomes its own balance line.
    fn build_swap_order_payment(
        &self,
        parameters: &DatumParameters,
        mut order_payment: PayToAddress,
    ) -> SwapResult<PayToAddress> {
        let swap_in_amount = parameters
            .int(DatumParameterKey::SwapInAmount)
            .ok_or_else(|| {
                SwapError::DatumError("swap-in amount parameter is not set".to_string())
            })?;

        let policy_id = parameters
            .string(DatumParameterKey::SwapInTokenPolicyId)
            .unwrap_or_default();
        let asset_name = parameters
            .string(DatumParameterKey::SwapInTokenAssetName)
            .unwrap_or_default();

        if policy_id.is_empty() {
            let lovelace = order_payment
                .asset_balances
                .iter_mut()
                .find(|balance| balance.asset.is_lovelace())
                .ok_or_else(|| {
                    SwapError::DatumError(
                        "order payment is missing its lovelace fee line".to_string(),
                    )
                })?;
            lovelace.quantity += swap_in_amount;
        } else {
            order_payment.asset_balances.push(AssetBalance {
                asset: Token::Asset(Asset::new(policy_id, asset_name)),
                quantity: swap_in_amount,
            });
        }

        Ok(order_payment)
    }
}
