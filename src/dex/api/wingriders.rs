use crate::core::{
    tokens_match, Asset, LiquidityPool, RequestConfig, SwapResult, Token,
};
use crate::dex::api::DexApi;
use async_trait::async_trait;
use log::debug;
use serde::Deserialize;
use std::time::Duration;

const API_URL: &str = "https://api.mainnet.wingriders.com/graphql";

const POOLS_QUERY: &str = r#"
    query LiquidityPoolsWithMarketData($input: PoolsWithMarketdataInput) {
        poolsWithMarketdata(input: $input) {
            ...LiquidityPoolFragment
        }
    }
    fragment LiquidityPoolFragment on PoolWithMarketdata {
        issuedShareToken {
            policyId
            assetName
            quantity
        }
        tokenA {
            policyId
            assetName
            quantity
        }
        tokenB {
            policyId
            assetName
            quantity
        }
        treasuryA
        treasuryB
    }
"#;

#[derive(Debug, Deserialize)]
struct GraphqlResponse {
    data: PoolsData,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PoolsData {
    pools_with_marketdata: Vec<PoolRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PoolRecord {
    issued_share_token: ApiToken,
    token_a: ApiToken,
    token_b: ApiToken,
    treasury_a: String,
    treasury_b: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiToken {
    policy_id: String,
    asset_name: String,
    #[serde(default)]
    quantity: Option<String>,
}

impl ApiToken {
    fn to_token(&self) -> Token {
        if self.policy_id.is_empty() {
            Token::Lovelace
        } else {
            Token::Asset(Asset::new(self.policy_id.clone(), self.asset_name.clone()))
        }
    }
}

/// GraphQL market-data client for WingRiders pools.
pub struct WingRidersApi {
    client: reqwest::Client,
    base_url: String,
    pool_fee_percent: f64,
}

impl WingRidersApi {
    pub fn new(request_config: &RequestConfig, pool_fee_percent: f64) -> SwapResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(request_config.timeout_secs))
            .build()?;

        let base_url = match &request_config.proxy_url {
            Some(proxy) => format!("{}/{}", proxy.trim_end_matches('/'), API_URL),
            None => API_URL.to_string(),
        };

        Ok(Self {
            client,
            base_url,
            pool_fee_percent,
        })
    }

    /// Redirect requests to a different endpoint (tests, self-hosted mirrors).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn pool_from_record(&self, record: &PoolRecord) -> Option<LiquidityPool> {
        let reserve_a: u128 = match record.treasury_a.parse() {
            Ok(value) => value,
            Err(_) => {
                debug!("skipping pool record with malformed treasuryA {}", record.treasury_a);
                return None;
            }
        };
        let reserve_b: u128 = match record.treasury_b.parse() {
            Ok(value) => value,
            Err(_) => {
                debug!("skipping pool record with malformed treasuryB {}", record.treasury_b);
                return None;
            }
        };

        let mut pool = LiquidityPool::new(
            crate::dex::wingriders::NAME,
            // Pool addresses are not exposed by the market-data API.
            "",
            record.token_a.to_token(),
            record.token_b.to_token(),
            reserve_a,
            reserve_b,
        );

        pool.lp_token = Some(Asset::new(
            record.issued_share_token.policy_id.clone(),
            record.issued_share_token.asset_name.clone(),
        ));
        pool.total_lp_tokens = record
            .issued_share_token
            .quantity
            .as_deref()
            .and_then(|quantity| quantity.parse().ok())
            .unwrap_or(0);
        pool.pool_fee_percent = self.pool_fee_percent;

        Some(pool)
    }
}

#[async_trait]
impl DexApi for WingRidersApi {
    async fn liquidity_pools(
        &self,
        asset_a: &Token,
        asset_b: Option<&Token>,
    ) -> SwapResult<Vec<LiquidityPool>> {
        let body = serde_json::json!({
            "operationName": "LiquidityPoolsWithMarketData",
            "query": POOLS_QUERY,
            "variables": {
                "input": {
                    "sort": true,
                },
            },
        });

        let response: GraphqlResponse = self
            .client
            .post(&self.base_url)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let pools = response
            .data
            .pools_with_marketdata
            .iter()
            .filter(|record| {
                let token_a = record.token_a.to_token();
                let token_b = record.token_b.to_token();

                tokens_match(&token_a, asset_a)
                    || tokens_match(&token_b, asset_a)
                    || asset_b.is_some_and(|wanted| {
                        tokens_match(&token_a, wanted) || tokens_match(&token_b, wanted)
                    })
            })
            .filter_map(|record| self.pool_from_record(record))
            .collect();

        Ok(pools)
    }
}
