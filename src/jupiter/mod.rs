pub mod types;

use async_trait::async_trait;
use solana_sdk::pubkey::Pubkey;
use tracing::debug;

use crate::{
    error::SwapError,
    provider::{parse_amount, read_json, request_failure, Stage, SwapProvider},
    token_account::TokenAccountResolver,
    types::{Provider, ProviderConfig, Quote, SwapRequest, UnsignedTransactionSet},
};

use self::types::{
    JupiterQuoteApiResponse, JupiterQuoteParams, JupiterRoutePlanStep, JupiterSwapRequest,
    JupiterSwapResponse,
};

const DEFAULT_JUPITER_API_URL: &str = "https://lite-api.jup.ag/swap/v1";
const JUPITER_API_URL_ENV: &str = "JUPITER_API_URL";

/// Aggregator-backed provider. The build endpoint returns one transaction with
/// native-asset wrapping and destination account creation already wired in.
pub struct JupiterProvider {
    pub client: reqwest::Client,
    pub base_url: String,
    pub api_key: Option<String>,
    pub slippage_bps: u16,
}

impl JupiterProvider {
    pub fn new(config: &ProviderConfig) -> Result<Self, SwapError> {
        Ok(Self {
            client: config.http_client()?,
            base_url: config.resolve_base_url(JUPITER_API_URL_ENV, DEFAULT_JUPITER_API_URL),
            api_key: config.api_key.clone(),
            slippage_bps: config.slippage_bps,
        })
    }

    fn with_api_key(&self, mut req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if let Some(key) = &self.api_key {
            req = req.header("x-api-key", key);
        }
        req
    }
}

#[async_trait]
impl SwapProvider for JupiterProvider {
    fn provider(&self) -> Provider {
        Provider::Jupiter
    }

    async fn quote(&self, request: &SwapRequest) -> Result<Quote, SwapError> {
        let params = JupiterQuoteParams {
            input_mint: request.input_mint.to_string(),
            output_mint: request.output_mint.to_string(),
            amount: request.amount.to_string(),
            slippage_bps: request.slippage_bps.unwrap_or(self.slippage_bps),
        };

        let url = format!("{}/quote", self.base_url);
        debug!("jupiter quote: {url}");
        let raw_json: serde_json::Value = read_json(
            Provider::Jupiter,
            Stage::Quote,
            self.with_api_key(self.client.get(&url).query(&params)),
        )
        .await?;

        let api_response: JupiterQuoteApiResponse = serde_json::from_value(raw_json.clone())
            .map_err(|e| request_failure(Provider::Jupiter, Stage::Quote, e))?;

        Ok(Quote {
            provider: Provider::Jupiter,
            input_mint: request.input_mint,
            output_mint: request.output_mint,
            input_amount: parse_amount(Provider::Jupiter, "inAmount", &api_response.in_amount)?,
            output_amount: parse_amount(Provider::Jupiter, "outAmount", &api_response.out_amount)?,
            price_impact: api_response
                .price_impact_pct
                .as_deref()
                .and_then(|pct| pct.parse::<f64>().ok())
                .map(f64::abs),
            slippage_bps: api_response.slippage_bps,
            route: describe_route(&api_response.route_plan),
            provider_data: raw_json,
        })
    }

    async fn build_transactions(
        &self,
        _resolver: &TokenAccountResolver<'_>,
        user: &Pubkey,
        quote: &Quote,
    ) -> Result<UnsignedTransactionSet, SwapError> {
        let swap_request = JupiterSwapRequest {
            user_public_key: user.to_string(),
            quote_response: quote.provider_data.clone(),
            wrap_and_unwrap_sol: true,
            dynamic_compute_unit_limit: true,
        };

        let url = format!("{}/swap", self.base_url);
        debug!("jupiter swap: {url}");
        let response: JupiterSwapResponse = read_json(
            Provider::Jupiter,
            Stage::Build,
            self.with_api_key(self.client.post(&url).json(&swap_request)),
        )
        .await?;

        UnsignedTransactionSet::from_base64(Provider::Jupiter, [response.swap_transaction.as_str()])
    }
}

fn describe_route(plan: &[JupiterRoutePlanStep]) -> String {
    plan.iter()
        .map(|step| {
            step.swap_info
                .label
                .clone()
                .unwrap_or_else(|| step.swap_info.amm_key.clone())
        })
        .collect::<Vec<_>>()
        .join(" -> ")
}
