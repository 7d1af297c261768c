use crate::aggregator::Aggregator;
use crate::core::{
    LiquidityPool, PayToAddress, SwapError, SwapFee, SwapResult, Token,
};
use crate::datum::{DatumParameterKey, DatumParameters};
use crate::quotes;
use std::sync::Arc;

/// A swap intent against a single liquidity pool.
///
/// Owns a read-only snapshot of its pool; amounts and slippage are the only
/// state, and every accessor recomputes from them through the pricing engine.
#[derive(Clone)]
pub struct SwapRequest {
    aggregator: Arc<Aggregator>,
    liquidity_pool: LiquidityPool,
    swap_in_token: Token,
    swap_out_token: Token,
    swap_in_amount: u128,
    slippage_percent: f64,
}

impl SwapRequest {
    pub(crate) fn new(aggregator: Arc<Aggregator>, liquidity_pool: LiquidityPool) -> Self {
        let swap_in_token = liquidity_pool.asset_a.clone();
        let swap_out_token = liquidity_pool.asset_b.clone();
        let slippage_percent = aggregator.config().default_slippage_percent;

        Self {
            aggregator,
            liquidity_pool,
            swap_in_token,
            swap_out_token,
            swap_in_amount: 0,
            slippage_percent,
        }
    }

    pub fn liquidity_pool(&self) -> &LiquidityPool {
        &self.liquidity_pool
    }

    pub fn swap_in_token(&self) -> &Token {
        &self.swap_in_token
    }

    pub fn swap_out_token(&self) -> &Token {
        &self.swap_out_token
    }

    pub fn swap_in_amount(&self) -> u128 {
        self.swap_in_amount
    }

    pub fn slippage_percent(&self) -> f64 {
        self.slippage_percent
    }

    /// Sell the given token; the opposite pool side becomes the swap-out.
    pub fn with_swap_in_token(mut self, token: Token) -> SwapResult<Self> {
        self.swap_out_token = self.liquidity_pool.other_asset(&token)?.clone();
        self.swap_in_token = token;

        Ok(self)
    }

    /// Buy the given token; the opposite pool side becomes the swap-in.
    pub fn with_swap_out_token(mut self, token: Token) -> SwapResult<Self> {
        self.swap_in_token = self.liquidity_pool.other_asset(&token)?.clone();
        self.swap_out_token = token;

        Ok(self)
    }

    pub fn with_swap_in_amount(mut self, amount: u128) -> Self {
        self.swap_in_amount = amount;

        self
    }

    /// Target a receive amount; the required swap-in is derived through the
    /// pricing engine's inverted search.
    pub fn with_swap_out_amount(mut self, amount: u128) -> SwapResult<Self> {
        self.swap_in_amount =
            quotes::estimated_give(&self.liquidity_pool, &self.swap_out_token, amount)?;

        Ok(self)
    }

    pub fn with_slippage_percent(mut self, slippage_percent: f64) -> SwapResult<Self> {
        self.set_slippage_percent(slippage_percent)?;

        Ok(self)
    }

    pub(crate) fn set_slippage_percent(&mut self, slippage_percent: f64) -> SwapResult<()> {
        if slippage_percent < 0.0 {
            return Err(SwapError::InvalidSlippage(
                "Slippage percent must be zero or above.".to_string(),
            ));
        }
        self.slippage_percent = slippage_percent;

        Ok(())
    }

    /// Reverse the trade direction in place. A nonzero request becomes the
    /// equivalent reverse trade: the previous estimated receive is carried
    /// over as the new swap-in amount.
    pub fn flip(&mut self) -> SwapResult<()> {
        if self.swap_in_amount > 0 {
            self.swap_in_amount = self.get_estimated_receive()?;
        }
        std::mem::swap(&mut self.swap_in_token, &mut self.swap_out_token);

        Ok(())
    }

    pub fn get_estimated_receive(&self) -> SwapResult<u128> {
        quotes::estimated_receive(&self.liquidity_pool, &self.swap_in_token, self.swap_in_amount)
    }

    pub fn get_minimum_receive(&self) -> SwapResult<u128> {
        quotes::minimum_receive(self.get_estimated_receive()?, self.slippage_percent)
    }

    /// Price impact of this request; a request that trades nothing has none.
    pub fn get_price_impact_percent(&self) -> SwapResult<f64> {
        if self.swap_in_amount == 0 {
            return Ok(0.0);
        }

        quotes::price_impact_percent(
            &self.liquidity_pool,
            &self.swap_in_token,
            self.swap_in_amount,
        )
    }

    pub fn get_swap_fees(&self) -> SwapResult<Vec<SwapFee>> {
        Ok(self
            .aggregator
            .dex_by_name(&self.liquidity_pool.dex)?
            .swap_order_fees())
    }

    /// Assemble the order datum parameters and delegate to the owning DEX's
    /// order-building routine.
    pub async fn get_payments_to_addresses(&self) -> SwapResult<Vec<PayToAddress>> {
        let wallet = self.aggregator.wallet_provider().ok_or_else(|| {
            SwapError::ConfigError(
                "Wallet provider must be set before building swap payments.".to_string(),
            )
        })?;
        let dex = self.aggregator.dex_by_name(&self.liquidity_pool.dex)?;

        let mut parameters = DatumParameters::new();
        parameters
            .push_string(DatumParameterKey::SenderPubKeyHash, wallet.public_key_hash())
            .push_string(
                DatumParameterKey::SenderStakingKeyHash,
                wallet.staking_key_hash(),
            )
            .push_string(
                DatumParameterKey::SwapInTokenPolicyId,
                self.swap_in_token.policy_id(),
            )
            .push_string(
                DatumParameterKey::SwapInTokenAssetName,
                self.swap_in_token.asset_name_hex(),
            )
            .push_string(
                DatumParameterKey::SwapOutTokenPolicyId,
                self.swap_out_token.policy_id(),
            )
            .push_string(
                DatumParameterKey::SwapOutTokenAssetName,
                self.swap_out_token.asset_name_hex(),
            )
            .push_int(DatumParameterKey::SwapInAmount, self.swap_in_amount)
            .push_int(DatumParameterKey::MinReceive, self.get_minimum_receive()?);

        let mut builder = self.aggregator.definition_builder()?;
        dex.build_swap_order(parameters, builder.as_mut()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{AddressType, AggregatorConfig, Asset, RequestConfig};
    use crate::dex::WingRiders;
    use crate::providers::mocks::{MockWallet, StubDefinitionBuilderFactory};

    const INDY_POLICY: &str = "533bb94a8850ee3ccbe483106489399112b74c905342cb1792a797a0";

    fn indy() -> Token {
        Token::Asset(Asset::new(INDY_POLICY, "494e4459"))
    }

    fn ada_indy_pool() -> LiquidityPool {
        let mut pool = LiquidityPool::new(
            "WingRiders",
            "addr1qpool",
            Token::Lovelace,
            indy(),
            1_000_000_000,
            500_000,
        );
        pool.pool_fee_percent = 0.35;
        pool
    }

    fn aggregator() -> Arc<Aggregator> {
        Arc::new(
            Aggregator::new(AggregatorConfig::default())
                .unwrap()
                .register_dex(Arc::new(
                    WingRiders::new(&RequestConfig::default()).unwrap(),
                ))
                .with_wallet_provider(Arc::new(MockWallet::loaded()))
                .with_definition_builder_factory(Arc::new(StubDefinitionBuilderFactory)),
        )
    }

    #[test]
    fn test_swap_in_amount_round_trip() {
        let request = aggregator()
            .new_swap_request(ada_indy_pool())
            .with_swap_in_amount(10_000_000);

        assert_eq!(request.swap_in_amount(), 10_000_000);
        assert_eq!(request.get_estimated_receive().unwrap(), 4_933);
    }

    #[test]
    fn test_swap_out_amount_derives_swap_in() {
        let request = aggregator()
            .new_swap_request(ada_indy_pool())
            .with_swap_out_token(indy())
            .unwrap()
            .with_swap_out_amount(4_932)
            .unwrap();

        let receive = request.get_estimated_receive().unwrap();
        assert!(receive >= 4_932);
        assert!(receive <= 4_934);
    }

    #[test]
    fn test_swap_in_token_must_be_in_pool() {
        let stranger = Token::Asset(Asset::new(
            "aaaabb94a8850ee3ccbe483106489399112b74c905342cb1792a797a",
            "4254",
        ));

        let result = aggregator()
            .new_swap_request(ada_indy_pool())
            .with_swap_in_token(stranger);

        assert!(matches!(result, Err(SwapError::TokenNotInPool { .. })));
    }

    #[test]
    fn test_rejects_negative_slippage() {
        let result = aggregator()
            .new_swap_request(ada_indy_pool())
            .with_slippage_percent(-0.5);

        assert!(matches!(result, Err(SwapError::InvalidSlippage(_))));
    }

    #[test]
    fn test_minimum_receive_applies_slippage() {
        let request = aggregator()
            .new_swap_request(ada_indy_pool())
            .with_swap_in_amount(10_000_000)
            .with_slippage_percent(1.0)
            .unwrap();

        // 4_933 * 10_000 / 10_100
        assert_eq!(request.get_minimum_receive().unwrap(), 4_884);
    }

    #[test]
    fn test_flip_carries_the_estimated_receive() {
        let mut request = aggregator()
            .new_swap_request(ada_indy_pool())
            .with_swap_in_amount(10_000_000);

        request.flip().unwrap();

        assert_eq!(request.swap_in_token(), &indy());
        assert_eq!(request.swap_out_token(), &Token::Lovelace);
        assert_eq!(request.swap_in_amount(), 4_933);
    }

    #[test]
    fn test_flip_with_zero_amount_only_swaps_roles() {
        let mut request = aggregator().new_swap_request(ada_indy_pool());

        request.flip().unwrap();

        assert_eq!(request.swap_in_token(), &indy());
        assert_eq!(request.swap_in_amount(), 0);
    }

    #[test]
    fn test_zero_amount_has_no_price_impact() {
        let request = aggregator().new_swap_request(ada_indy_pool());
        assert_eq!(request.get_price_impact_percent().unwrap(), 0.0);
    }

    #[test]
    fn test_swap_fees_come_from_the_owning_dex() {
        let fees = aggregator()
            .new_swap_request(ada_indy_pool())
            .get_swap_fees()
            .unwrap();

        assert_eq!(fees.len(), 2);
    }

    #[tokio::test]
    async fn test_payments_to_addresses_builds_the_order_output() {
        let request = aggregator()
            .new_swap_request(ada_indy_pool())
            .with_swap_in_amount(10_000_000);

        let payments = request.get_payments_to_addresses().await.unwrap();

        assert_eq!(payments.len(), 1);
        let payment = &payments[0];
        assert_eq!(payment.address_type, AddressType::Contract);
        assert!(payment.datum.is_some());
        // agent fee + oil + ADA swap-in
        assert_eq!(payment.asset_balances[0].quantity, 14_000_000);
    }

    #[tokio::test]
    async fn test_payments_require_a_wallet_provider() {
        let aggregator = Arc::new(
            Aggregator::new(AggregatorConfig::default())
                .unwrap()
                .register_dex(Arc::new(
                    WingRiders::new(&RequestConfig::default()).unwrap(),
                )),
        );
        let request = aggregator
            .new_swap_request(ada_indy_pool())
            .with_swap_in_amount(10_000_000);

        let result = request.get_payments_to_addresses().await;

        assert!(matches!(result, Err(SwapError::ConfigError(_))));
    }
}
