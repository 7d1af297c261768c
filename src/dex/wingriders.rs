use crate::core::{
    AddressType, Asset, AssetAddress, AssetBalance, LiquidityPool, PayToAddress, RequestConfig,
    SwapError, SwapFee, SwapResult, Token, Utxo,
};
use crate::datum::{DatumParameterKey, DatumParameters, DefinitionBuilder, OrderTemplate};
use crate::dex::api::{DexApi, WingRidersApi};
use crate::dex::Dex;
use crate::providers::DataProvider;
use async_trait::async_trait;
use chrono::Utc;
use futures::future::join_all;
use log::debug;
use std::sync::Mutex;

/// WingRiders constants.
pub const NAME: &str = "WingRiders";
pub const ORDER_ADDRESS: &str = "addr1wxr2a8htmzuhj39y2gq7ftkpxv98y2g67tg8zezthgq4jkg0a4ul4";
pub const POOL_VALIDITY_ASSET: &str = "026a18d04a0c642759bb3d83b12e3344894e5c1c7b2aeb1a2113a5704c";

/// Minimum pool deposit locked as non-circulating rent in every pool UTxO.
const MIN_POOL_ADA: u128 = 3_000_000;
/// Floor an adjusted ADA reserve must stay above for the rent subtraction to
/// apply.
const RESERVE_FLOOR: u128 = 1_000_000;
/// The on-chain LP counter starts at i64::MAX and counts down as LP tokens
/// are issued.
const MAX_INT: u128 = 9_223_372_036_854_775_807;
const POOL_FEE_PERCENT: f64 = 0.35;
/// Orders expire six hours after construction.
const ORDER_EXPIRATION_MS: i64 = 6 * 60 * 60 * 1000;

const ORDER_TEMPLATE: OrderTemplate = OrderTemplate {
    name: "wingriders-order",
    required: &[
        DatumParameterKey::SenderPubKeyHash,
        DatumParameterKey::SenderStakingKeyHash,
        DatumParameterKey::Action,
        DatumParameterKey::Expiration,
        DatumParameterKey::PoolAssetAPolicyId,
        DatumParameterKey::PoolAssetAAssetName,
        DatumParameterKey::PoolAssetBPolicyId,
        DatumParameterKey::PoolAssetBAssetName,
        DatumParameterKey::SwapInTokenPolicyId,
        DatumParameterKey::SwapInTokenAssetName,
        DatumParameterKey::SwapOutTokenPolicyId,
        DatumParameterKey::SwapOutTokenAssetName,
        DatumParameterKey::SwapInAmount,
        DatumParameterKey::MinReceive,
    ],
    optional: &[
        DatumParameterKey::ReceiverPubKeyHash,
        DatumParameterKey::ReceiverStakingKeyHash,
    ],
};

lazy_static::lazy_static! {
    static ref VALIDITY_ASSET: Asset =
        Asset::from_id(POOL_VALIDITY_ASSET).expect("static validity asset id is well-formed");
}

pub struct WingRiders {
    api: WingRidersApi,
    /// Validity-asset addresses memoised after the first provider lookup.
    asset_addresses: Mutex<Vec<AssetAddress>>,
}

impl WingRiders {
    pub fn new(request_config: &RequestConfig) -> SwapResult<Self> {
        Ok(Self {
            api: WingRidersApi::new(request_config, POOL_FEE_PERCENT)?,
            asset_addresses: Mutex::new(Vec::new()),
        })
    }

    /// Off-chain market-data client for this DEX.
    pub fn api(&self) -> &WingRidersApi {
        &self.api
    }

    fn cached_asset_addresses(&self) -> Vec<AssetAddress> {
        self.asset_addresses
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn store_asset_addresses(&self, addresses: &[AssetAddress]) {
        *self
            .asset_addresses
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = addresses.to_vec();
    }

    /// The minimum deposit is rent, not tradable liquidity; subtract it from
    /// an ADA reserve unless that would not leave the reserve above the
    /// floor, in which case report the raw balance to guard against
    /// underflow near the reserve floor.
    fn adjusted_reserve(balance: &AssetBalance) -> u128 {
        match balance.asset {
            Token::Lovelace if balance.quantity > MIN_POOL_ADA + RESERVE_FLOOR => {
                balance.quantity - MIN_POOL_ADA
            }
            _ => balance.quantity,
        }
    }
}

#[async_trait]
impl Dex for WingRiders {
    fn name(&self) -> &str {
        NAME
    }

    fn order_address(&self) -> &str {
        ORDER_ADDRESS
    }

    async fn liquidity_pools(
        &self,
        provider: &dyn DataProvider,
        asset_a: &Token,
        asset_b: Option<&Token>,
    ) -> SwapResult<Vec<LiquidityPool>> {
        let cached = self.cached_asset_addresses();
        let asset_addresses = if cached.is_empty() {
            let fetched = provider.asset_addresses(&VALIDITY_ASSET).await?;
            self.store_asset_addresses(&fetched);
            fetched
        } else {
            cached
        };

        let lookups = asset_addresses
            .iter()
            .map(|asset_address| provider.utxos(&asset_address.address, Some(&VALIDITY_ASSET)));

        let mut liquidity_pools = Vec::new();
        for utxos in join_all(lookups).await {
            for utxo in utxos? {
                if let Some(pool) = self.liquidity_pool_from_utxo(&utxo, asset_a, asset_b) {
                    liquidity_pools.push(pool);
                }
            }
        }

        Ok(liquidity_pools)
    }

    fn liquidity_pool_from_utxo(
        &self,
        utxo: &Utxo,
        asset_a: &Token,
        asset_b: Option<&Token>,
    ) -> Option<LiquidityPool> {
        if utxo.datum_hash.is_none() {
            debug!("skipping utxo {}#{}: no datum hash", utxo.tx_hash, utxo.output_index);
            return None;
        }

        let relevant_assets: Vec<&AssetBalance> = utxo
            .asset_balances
            .iter()
            .filter(|balance| match &balance.asset {
                Token::Lovelace => true,
                Token::Asset(asset) => asset.policy_id != VALIDITY_ASSET.policy_id,
            })
            .collect();

        // Irrelevant UTxO
        if relevant_assets.len() < 2 {
            debug!(
                "skipping utxo {}#{}: {} relevant balances",
                utxo.tx_hash,
                utxo.output_index,
                relevant_assets.len()
            );
            return None;
        }

        // Could be an ADA/X or X/X pool
        let (asset_a_index, asset_b_index) = if relevant_assets.len() == 2 {
            (0, 1)
        } else {
            (1, 2)
        };

        let relevant_a = relevant_assets[asset_a_index];
        let relevant_b = relevant_assets[asset_b_index];

        // Only grab requested pools
        let matches_filter = match asset_b {
            Some(asset_b) => {
                (relevant_a.asset == *asset_a && relevant_b.asset == *asset_b)
                    || (relevant_a.asset == *asset_b && relevant_b.asset == *asset_a)
            }
            None => relevant_a.asset == *asset_a || relevant_b.asset == *asset_a,
        };

        if !matches_filter {
            return None;
        }

        let mut liquidity_pool = LiquidityPool::new(
            NAME,
            &utxo.address,
            relevant_a.asset.clone(),
            relevant_b.asset.clone(),
            Self::adjusted_reserve(relevant_a),
            Self::adjusted_reserve(relevant_b),
        );

        let lp_token_balance = utxo.asset_balances.iter().find(|balance| match &balance.asset {
            Token::Lovelace => false,
            Token::Asset(asset) => {
                asset.policy_id == VALIDITY_ASSET.policy_id
                    && asset.asset_name_hex != VALIDITY_ASSET.asset_name_hex
            }
        });

        if let Some(balance) = lp_token_balance {
            if let Token::Asset(asset) = &balance.asset {
                liquidity_pool.lp_token = Some(asset.clone());
                liquidity_pool.total_lp_tokens = MAX_INT.saturating_sub(balance.quantity);
            }
        }
        liquidity_pool.pool_fee_percent = POOL_FEE_PERCENT;

        Some(liquidity_pool)
    }

    async fn build_swap_order(
        &self,
        mut parameters: DatumParameters,
        builder: &mut dyn DefinitionBuilder,
    ) -> SwapResult<Vec<PayToAddress>> {
        let fees = self.swap_order_fees();
        let agent_fee = fees
            .iter()
            .find(|fee| fee.id == "agentFee")
            .ok_or_else(|| SwapError::ConfigError("Parameters for datum are not set.".to_string()))?;
        let oil = fees
            .iter()
            .find(|fee| fee.id == "oil")
            .ok_or_else(|| SwapError::ConfigError("Parameters for datum are not set.".to_string()))?;

        let swap_in_policy = parameters
            .string(DatumParameterKey::SwapInTokenPolicyId)
            .unwrap_or_default()
            .to_string();
        let swap_in_name = parameters
            .string(DatumParameterKey::SwapInTokenAssetName)
            .unwrap_or_default()
            .to_string();
        let swap_out_policy = parameters
            .string(DatumParameterKey::SwapOutTokenPolicyId)
            .unwrap_or_default()
            .to_string();
        let swap_out_name = parameters
            .string(DatumParameterKey::SwapOutTokenAssetName)
            .unwrap_or_default()
            .to_string();

        // The on-chain order encodes the pool pair in lexicographic order;
        // the direction flag recovers which side is being sold.
        let swap_in_id = format!("{}{}", swap_in_policy, swap_in_name);
        let swap_out_id = format!("{}{}", swap_out_policy, swap_out_name);
        let direction: u128 = if swap_in_id <= swap_out_id { 0 } else { 1 };

        let expiration = Utc::now().timestamp_millis() + ORDER_EXPIRATION_MS;

        let (pool_a_policy, pool_a_name, pool_b_policy, pool_b_name) = if direction == 0 {
            (swap_in_policy, swap_in_name, swap_out_policy, swap_out_name)
        } else {
            (swap_out_policy, swap_out_name, swap_in_policy, swap_in_name)
        };

        parameters.push_int(DatumParameterKey::Action, direction);
        parameters.push_int(DatumParameterKey::Expiration, expiration as u128);
        parameters.push_string(DatumParameterKey::PoolAssetAPolicyId, pool_a_policy);
        parameters.push_string(DatumParameterKey::PoolAssetAAssetName, pool_a_name);
        parameters.push_string(DatumParameterKey::PoolAssetBPolicyId, pool_b_policy);
        parameters.push_string(DatumParameterKey::PoolAssetBAssetName, pool_b_name);

        parameters.validate_for(&ORDER_TEMPLATE)?;
        builder.load_template(&ORDER_TEMPLATE)?;
        builder.push_parameters(&parameters)?;

        let order_payment = PayToAddress {
            address: ORDER_ADDRESS.to_string(),
            address_type: AddressType::Contract,
            asset_balances: vec![AssetBalance {
                asset: Token::Lovelace,
                quantity: agent_fee.value + oil.value,
            }],
            datum: Some(builder.serialize()?),
            spend_utxos: vec![],
        };

        Ok(vec![self.build_swap_order_payment(&parameters, order_payment)?])
    }

    async fn build_cancel_swap_order(
        &self,
        order_utxos: &[Utxo],
        return_address: &str,
    ) -> SwapResult<Vec<PayToAddress>> {
        let relevant_utxo = order_utxos
            .iter()
            .find(|utxo| utxo.address == ORDER_ADDRESS)
            .ok_or_else(|| {
                SwapError::TransactionFailed(
                    "Unable to find relevant UTxO for cancelling the swap order.".to_string(),
                )
            })?;

        Ok(vec![PayToAddress {
            address: return_address.to_string(),
            address_type: AddressType::Base,
            asset_balances: relevant_utxo.asset_balances.clone(),
            datum: None,
            spend_utxos: vec![relevant_utxo.clone()],
        }])
    }

    fn swap_order_fees(&self) -> Vec<SwapFee> {
        vec![
            SwapFee {
                id: "agentFee".to_string(),
                title: "Agent Fee".to_string(),
                description: "WingRiders DEX employs decentralized Agents to ensure equal access, strict fulfillment ordering and protection to every party involved in exchange for a small fee.".to_string(),
                value: 2_000_000,
                is_returned: false,
            },
            SwapFee {
                id: "oil".to_string(),
                title: "Oil".to_string(),
                description: "A small amount of ADA has to be bundled with all token transfers on the Cardano Blockchain. We call this \"Oil ADA\" and it is always returned to the owner when the request gets fulfilled. If the request expires and the funds are reclaimed, the Oil ADA is returned as well.".to_string(),
                value: 2_000_000,
                is_returned: true,
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    const INDY_POLICY: &str = "533bb94a8850ee3ccbe483106489399112b74c905342cb1792a797a0";
    const WMT_POLICY: &str = "1d7f33bd23d85e1a25d87d86fac4f199c3197a2f7afeb662a0f34e1e";

    fn dex() -> WingRiders {
        WingRiders::new(&RequestConfig::default()).unwrap()
    }

    fn indy() -> Token {
        Token::Asset(Asset::new(INDY_POLICY, "494e4459"))
    }

    fn wmt() -> Token {
        Token::Asset(Asset::new(WMT_POLICY, "776f726c646d6f62696c65746f6b656e"))
    }

    fn validity_balance() -> AssetBalance {
        AssetBalance {
            asset: Token::Asset(Asset::from_id(POOL_VALIDITY_ASSET).unwrap()),
            quantity: 1,
        }
    }

    fn lp_balance(outstanding: u128) -> AssetBalance {
        AssetBalance {
            asset: Token::Asset(Asset::new(
                VALIDITY_ASSET.policy_id.clone(),
                "6c70746f6b656e",
            )),
            quantity: outstanding,
        }
    }

    fn pool_utxo(asset_balances: Vec<AssetBalance>) -> Utxo {
        Utxo {
            tx_hash: "ab".repeat(32),
            output_index: 0,
            address: "addr1qpool".to_string(),
            datum_hash: Some("cd".repeat(32)),
            asset_balances,
        }
    }

    fn ada_indy_balances(ada: u128, indy_amount: u128) -> Vec<AssetBalance> {
        vec![
            validity_balance(),
            AssetBalance { asset: Token::Lovelace, quantity: ada },
            AssetBalance { asset: indy(), quantity: indy_amount },
            lp_balance(MAX_INT - 251_000_000),
        ]
    }

    #[test]
    fn test_extracts_ada_pool_with_two_relevant_balances() {
        let utxo = pool_utxo(ada_indy_balances(1_003_000_000, 500_000));
        let pool = dex()
            .liquidity_pool_from_utxo(&utxo, &Token::Lovelace, Some(&indy()))
            .unwrap();

        assert_eq!(pool.dex, NAME);
        assert_eq!(pool.address, "addr1qpool");
        assert_eq!(pool.asset_a, Token::Lovelace);
        assert_eq!(pool.asset_b, indy());
        // Rent deposit excluded from the tradable ADA reserve
        assert_eq!(pool.reserve_a, 1_000_000_000);
        assert_eq!(pool.reserve_b, 500_000);
        assert_eq!(pool.pool_fee_percent, 0.35);
    }

    #[test]
    fn test_skips_utxo_without_datum_hash() {
        let mut utxo = pool_utxo(ada_indy_balances(1_003_000_000, 500_000));
        utxo.datum_hash = None;

        assert!(dex()
            .liquidity_pool_from_utxo(&utxo, &Token::Lovelace, None)
            .is_none());
    }

    #[test]
    fn test_skips_utxo_with_too_few_relevant_balances() {
        let utxo = pool_utxo(vec![
            validity_balance(),
            AssetBalance { asset: Token::Lovelace, quantity: 5_000_000 },
        ]);

        assert!(dex()
            .liquidity_pool_from_utxo(&utxo, &Token::Lovelace, None)
            .is_none());
    }

    #[test]
    fn test_three_balance_utxo_uses_indices_one_and_two() {
        // Index 0 holds a non-pool asset; the pool pair sits at (1, 2).
        let utxo = pool_utxo(vec![
            validity_balance(),
            AssetBalance { asset: Token::Lovelace, quantity: 7_000_000 },
            AssetBalance { asset: indy(), quantity: 400_000 },
            AssetBalance { asset: wmt(), quantity: 900_000 },
        ]);

        let pool = dex()
            .liquidity_pool_from_utxo(&utxo, &indy(), Some(&wmt()))
            .unwrap();

        assert_eq!(pool.asset_a, indy());
        assert_eq!(pool.asset_b, wmt());
        assert_eq!(pool.reserve_a, 400_000);
        assert_eq!(pool.reserve_b, 900_000);
    }

    #[test_case(4_000_000, 4_000_000; "at the floor boundary the raw balance is kept")]
    #[test_case(3_500_000, 3_500_000; "below the boundary the raw balance is kept")]
    #[test_case(4_000_001, 1_000_001; "above the boundary the rent is subtracted")]
    #[test_case(1_003_000_000, 1_000_000_000; "deep pools always subtract the rent")]
    fn test_ada_reserve_adjustment(raw: u128, expected: u128) {
        let utxo = pool_utxo(vec![
            validity_balance(),
            AssetBalance { asset: Token::Lovelace, quantity: raw },
            AssetBalance { asset: indy(), quantity: 500_000 },
        ]);

        let pool = dex()
            .liquidity_pool_from_utxo(&utxo, &Token::Lovelace, None)
            .unwrap();

        assert_eq!(pool.reserve_a, expected);
    }

    #[test]
    fn test_token_reserves_are_never_adjusted() {
        let utxo = pool_utxo(vec![
            validity_balance(),
            AssetBalance { asset: Token::Lovelace, quantity: 7_000_000 },
            AssetBalance { asset: indy(), quantity: 3_500_000 },
            AssetBalance { asset: wmt(), quantity: 3_500_000 },
        ]);

        let pool = dex()
            .liquidity_pool_from_utxo(&utxo, &indy(), None)
            .unwrap();

        assert_eq!(pool.reserve_a, 3_500_000);
        assert_eq!(pool.reserve_b, 3_500_000);
    }

    #[test]
    fn test_lp_token_counts_down_from_max() {
        let utxo = pool_utxo(ada_indy_balances(1_003_000_000, 500_000));
        let pool = dex()
            .liquidity_pool_from_utxo(&utxo, &Token::Lovelace, None)
            .unwrap();

        assert_eq!(
            pool.lp_token,
            Some(Asset::new(VALIDITY_ASSET.policy_id.clone(), "6c70746f6b656e"))
        );
        assert_eq!(pool.total_lp_tokens, 251_000_000);
    }

    #[test]
    fn test_requested_pair_filter() {
        let utxo = pool_utxo(ada_indy_balances(1_003_000_000, 500_000));
        let wr = dex();

        // Exact pair in either orientation
        assert!(wr
            .liquidity_pool_from_utxo(&utxo, &Token::Lovelace, Some(&indy()))
            .is_some());
        assert!(wr
            .liquidity_pool_from_utxo(&utxo, &indy(), Some(&Token::Lovelace))
            .is_some());

        // Single-sided match
        assert!(wr.liquidity_pool_from_utxo(&utxo, &indy(), None).is_some());

        // Non-matching requests
        assert!(wr.liquidity_pool_from_utxo(&utxo, &wmt(), None).is_none());
        assert!(wr
            .liquidity_pool_from_utxo(&utxo, &Token::Lovelace, Some(&wmt()))
            .is_none());
    }

    struct RecordingBuilder {
        loaded: Option<&'static str>,
        pushed: Option<DatumParameters>,
    }

    impl RecordingBuilder {
        fn new() -> Self {
            Self { loaded: None, pushed: None }
        }
    }

    impl DefinitionBuilder for RecordingBuilder {
        fn load_template(&mut self, template: &OrderTemplate) -> SwapResult<()> {
            self.loaded = Some(template.name);
            Ok(())
        }

        fn push_parameters(&mut self, parameters: &DatumParameters) -> SwapResult<()> {
            self.pushed = Some(parameters.clone());
            Ok(())
        }

        fn serialize(&self) -> SwapResult<String> {
            Ok("d8799fcbor".to_string())
        }
    }

    fn swap_parameters(in_token: &Token, out_token: &Token, amount: u128) -> DatumParameters {
        let mut parameters = DatumParameters::new();
        parameters
            .push_string(DatumParameterKey::SenderPubKeyHash, "ab".repeat(28))
            .push_string(DatumParameterKey::SenderStakingKeyHash, "cd".repeat(28))
            .push_string(DatumParameterKey::SwapInTokenPolicyId, in_token.policy_id())
            .push_string(DatumParameterKey::SwapInTokenAssetName, in_token.asset_name_hex())
            .push_string(DatumParameterKey::SwapOutTokenPolicyId, out_token.policy_id())
            .push_string(DatumParameterKey::SwapOutTokenAssetName, out_token.asset_name_hex())
            .push_int(DatumParameterKey::SwapInAmount, amount)
            .push_int(DatumParameterKey::MinReceive, 4_884);
        parameters
    }

    #[tokio::test]
    async fn test_build_swap_order_for_ada_swap_in() {
        let mut builder = RecordingBuilder::new();
        let parameters = swap_parameters(&Token::Lovelace, &indy(), 10_000_000);

        let payments = dex()
            .build_swap_order(parameters, &mut builder)
            .await
            .unwrap();

        assert_eq!(builder.loaded, Some("wingriders-order"));
        let pushed = builder.pushed.unwrap();
        // ADA id sorts before any policy-qualified id
        assert_eq!(pushed.int(DatumParameterKey::Action), Some(0));
        assert!(pushed.int(DatumParameterKey::Expiration).is_some());
        assert_eq!(pushed.string(DatumParameterKey::PoolAssetAPolicyId), Some(""));
        assert_eq!(
            pushed.string(DatumParameterKey::PoolAssetBPolicyId),
            Some(INDY_POLICY)
        );

        assert_eq!(payments.len(), 1);
        let payment = &payments[0];
        assert_eq!(payment.address, ORDER_ADDRESS);
        assert_eq!(payment.address_type, AddressType::Contract);
        assert_eq!(payment.datum.as_deref(), Some("d8799fcbor"));
        // Agent fee + oil + the ADA swap-in amount on one lovelace line
        assert_eq!(payment.asset_balances.len(), 1);
        assert_eq!(payment.asset_balances[0].asset, Token::Lovelace);
        assert_eq!(payment.asset_balances[0].quantity, 2_000_000 + 2_000_000 + 10_000_000);
    }

    #[tokio::test]
    async fn test_build_swap_order_for_token_swap_in() {
        let mut builder = RecordingBuilder::new();
        let parameters = swap_parameters(&indy(), &Token::Lovelace, 4_933);

        let payments = dex()
            .build_swap_order(parameters, &mut builder)
            .await
            .unwrap();

        let pushed = builder.pushed.unwrap();
        // The policy-qualified id sorts after the empty ADA id
        assert_eq!(pushed.int(DatumParameterKey::Action), Some(1));
        assert_eq!(pushed.string(DatumParameterKey::PoolAssetAPolicyId), Some(""));

        let payment = &payments[0];
        assert_eq!(payment.asset_balances.len(), 2);
        assert_eq!(payment.asset_balances[0].quantity, 4_000_000);
        assert_eq!(payment.asset_balances[1].asset, indy());
        assert_eq!(payment.asset_balances[1].quantity, 4_933);
    }

    #[tokio::test]
    async fn test_build_swap_order_rejects_incomplete_parameters() {
        let mut builder = RecordingBuilder::new();

        // No minimum receive: template validation must trip before anything
        // reaches the builder.
        let mut parameters = DatumParameters::new();
        parameters
            .push_string(DatumParameterKey::SenderPubKeyHash, "ab".repeat(28))
            .push_string(DatumParameterKey::SenderStakingKeyHash, "cd".repeat(28))
            .push_string(DatumParameterKey::SwapInTokenPolicyId, "")
            .push_string(DatumParameterKey::SwapInTokenAssetName, "")
            .push_string(DatumParameterKey::SwapOutTokenPolicyId, INDY_POLICY)
            .push_string(DatumParameterKey::SwapOutTokenAssetName, "494e4459")
            .push_int(DatumParameterKey::SwapInAmount, 10_000_000);

        let result = dex().build_swap_order(parameters, &mut builder).await;

        assert!(matches!(result, Err(SwapError::DatumError(_))));
        assert!(builder.pushed.is_none());
    }

    #[tokio::test]
    async fn test_cancel_order_spends_the_order_utxo() {
        let order_utxo = Utxo {
            tx_hash: "ef".repeat(32),
            output_index: 1,
            address: ORDER_ADDRESS.to_string(),
            datum_hash: Some("ab".repeat(32)),
            asset_balances: vec![AssetBalance {
                asset: Token::Lovelace,
                quantity: 14_000_000,
            }],
        };
        let unrelated = Utxo {
            tx_hash: "01".repeat(32),
            output_index: 0,
            address: "addr1qother".to_string(),
            datum_hash: None,
            asset_balances: vec![],
        };

        let payments = dex()
            .build_cancel_swap_order(&[unrelated.clone(), order_utxo.clone()], "addr1qme")
            .await
            .unwrap();

        assert_eq!(payments.len(), 1);
        assert_eq!(payments[0].address, "addr1qme");
        assert_eq!(payments[0].address_type, AddressType::Base);
        assert_eq!(payments[0].asset_balances, order_utxo.asset_balances);
        assert_eq!(payments[0].spend_utxos, vec![order_utxo]);

        let missing = dex()
            .build_cancel_swap_order(&[unrelated], "addr1qme")
            .await;
        assert!(missing.is_err());
    }

    struct CountingProvider {
        address_lookups: std::sync::atomic::AtomicUsize,
    }

    #[async_trait]
    impl DataProvider for CountingProvider {
        async fn asset_addresses(&self, _asset: &Asset) -> SwapResult<Vec<AssetAddress>> {
            self.address_lookups
                .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            Ok(vec![AssetAddress {
                address: "addr1qpool".to_string(),
                quantity: 1,
            }])
        }

        async fn utxos(&self, _address: &str, _asset: Option<&Asset>) -> SwapResult<Vec<Utxo>> {
            Ok(vec![pool_utxo(ada_indy_balances(1_003_000_000, 500_000))])
        }
    }

    #[tokio::test]
    async fn test_liquidity_pools_memoise_asset_addresses() {
        let provider = CountingProvider {
            address_lookups: std::sync::atomic::AtomicUsize::new(0),
        };
        let wr = dex();

        let first = wr
            .liquidity_pools(&provider, &Token::Lovelace, None)
            .await
            .unwrap();
        let second = wr
            .liquidity_pools(&provider, &Token::Lovelace, None)
            .await
            .unwrap();

        assert_eq!(first.len(), 1);
        assert_eq!(second.len(), 1);
        assert_eq!(
            provider
                .address_lookups
                .load(std::sync::atomic::Ordering::SeqCst),
            1
        );
    }

    #[test]
    fn test_swap_order_fees() {
        let fees = dex().swap_order_fees();
        assert_eq!(fees.len(), 2);
        assert_eq!(fees[0].id, "agentFee");
        assert!(!fees[0].is_returned);
        assert_eq!(fees[1].id, "oil");
        assert!(fees[1].is_returned);
        assert_eq!(fees[0].value + fees[1].value, 4_000_000);
    }
}
