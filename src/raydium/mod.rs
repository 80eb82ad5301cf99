pub mod types;

use async_trait::async_trait;
use solana_sdk::{pubkey::Pubkey, signer::Signer};
use tracing::{debug, warn};

use crate::{
    error::SwapError,
    executor::TransactionExecutor,
    provider::{parse_amount, read_json, request_failure, Stage, SwapProvider},
    token_account::TokenAccountResolver,
    types::{
        resolve_url, Provider, ProviderConfig, Quote, RaydiumFeeConfig, SwapRequest,
        TokenProgramKind, UnsignedTransactionSet,
    },
};

use self::types::{
    RaydiumComputeData, RaydiumComputeParams, RaydiumEnvelope, RaydiumPriorityFeeData,
    RaydiumRoutePlanStep, RaydiumTransactionData, RaydiumTransactionRequest,
};

const DEFAULT_RAYDIUM_API_URL: &str = "https://transaction-v1.raydium.io";
const RAYDIUM_API_URL_ENV: &str = "RAYDIUM_API_URL";
const DEFAULT_RAYDIUM_PRIORITY_FEE_URL: &str = "https://api-v3.raydium.io/main/auto-fee";
const RAYDIUM_PRIORITY_FEE_URL_ENV: &str = "RAYDIUM_PRIORITY_FEE_URL";
const FALLBACK_COMPUTE_UNIT_PRICE: u64 = 100_000;
const TX_VERSION: &str = "V0";

/// Raydium trade API. Routing runs on Raydium's side; a swap that needs
/// intermediate accounts comes back as several transactions.
pub struct RaydiumProvider {
    pub client: reqwest::Client,
    pub base_url: String,
    pub slippage_bps: u16,
    pub priority_fee_url: String,
    /// Fixed priority fee; fetched from `priority_fee_url` per build when `None`.
    pub compute_unit_price_micro_lamports: Option<u64>,
}

impl RaydiumProvider {
    pub fn new(config: &ProviderConfig, fees: &RaydiumFeeConfig) -> Result<Self, SwapError> {
        Ok(Self {
            client: config.http_client()?,
            base_url: config.resolve_base_url(RAYDIUM_API_URL_ENV, DEFAULT_RAYDIUM_API_URL),
            slippage_bps: config.slippage_bps,
            priority_fee_url: resolve_url(
                fees.priority_fee_url.as_deref(),
                RAYDIUM_PRIORITY_FEE_URL_ENV,
                DEFAULT_RAYDIUM_PRIORITY_FEE_URL,
            ),
            compute_unit_price_micro_lamports: fees.compute_unit_price_micro_lamports,
        })
    }

    async fn compute_unit_price(&self) -> u64 {
        if let Some(price) = self.compute_unit_price_micro_lamports {
            return price;
        }

        debug!("raydium priority fee: {}", self.priority_fee_url);
        let fees: Result<RaydiumEnvelope<RaydiumPriorityFeeData>, SwapError> = read_json(
            Provider::Raydium,
            Stage::Build,
            self.client.get(&self.priority_fee_url),
        )
        .await;

        match fees {
            Ok(RaydiumEnvelope {
                success: true,
                data: Some(data),
                ..
            }) => data.default.h,
            Ok(_) => FALLBACK_COMPUTE_UNIT_PRICE,
            Err(e) => {
                warn!("raydium priority fee unavailable, using {FALLBACK_COMPUTE_UNIT_PRICE}: {e}");
                FALLBACK_COMPUTE_UNIT_PRICE
            }
        }
    }
}

#[async_trait]
impl SwapProvider for RaydiumProvider {
    fn provider(&self) -> Provider {
        Provider::Raydium
    }

    async fn quote(&self, request: &SwapRequest) -> Result<Quote, SwapError> {
        let params = RaydiumComputeParams {
            input_mint: request.input_mint.to_string(),
            output_mint: request.output_mint.to_string(),
            amount: request.amount.to_string(),
            slippage_bps: request.slippage_bps.unwrap_or(self.slippage_bps),
            tx_version: TX_VERSION,
        };

        let url = format!("{}/compute/swap-base-in", self.base_url);
        debug!("raydium compute: {url}");
        let raw_json: serde_json::Value = read_json(
            Provider::Raydium,
            Stage::Quote,
            self.client.get(&url).query(&params),
        )
        .await?;

        let envelope: RaydiumEnvelope<RaydiumComputeData> = serde_json::from_value(raw_json.clone())
            .map_err(|e| request_failure(Provider::Raydium, Stage::Quote, e))?;
        let data = match envelope {
            RaydiumEnvelope {
                success: true,
                data: Some(data),
                ..
            } => data,
            RaydiumEnvelope { id, msg, .. } => {
                return Err(request_failure(
                    Provider::Raydium,
                    Stage::Quote,
                    format!("compute {id} rejected: {}", msg.unwrap_or_default()),
                ));
            }
        };

        Ok(Quote {
            provider: Provider::Raydium,
            input_mint: request.input_mint,
            output_mint: request.output_mint,
            input_amount: parse_amount(Provider::Raydium, "inputAmount", &data.input_amount)?,
            output_amount: parse_amount(Provider::Raydium, "outputAmount", &data.output_amount)?,
            // Raydium reports a percentage.
            price_impact: data.price_impact_pct.map(|pct| pct.abs() / 100.0),
            slippage_bps: data.slippage_bps,
            route: describe_route(&data.route_plan),
            provider_data: raw_json,
        })
    }

    /// Standard-program destinations get their associated account up front;
    /// Raydium's builder creates Token-2022 destinations itself.
    async fn prepare_accounts(
        &self,
        resolver: &TokenAccountResolver<'_>,
        executor: &TransactionExecutor,
        signer: &(dyn Signer + Sync),
        quote: &Quote,
    ) -> Result<(), SwapError> {
        if quote.output_is_native() {
            return Ok(());
        }
        if resolver.resolve_token_program(&quote.output_mint).await == TokenProgramKind::Standard {
            resolver
                .ensure_associated_account(executor, signer, &quote.output_mint)
                .await?;
        }
        Ok(())
    }

    async fn build_transactions(
        &self,
        resolver: &TokenAccountResolver<'_>,
        user: &Pubkey,
        quote: &Quote,
    ) -> Result<UnsignedTransactionSet, SwapError> {
        let input_account = if quote.input_is_native() {
            None
        } else {
            Some(resolver.associated_account(user, &quote.input_mint).await)
        };

        let output_account = if quote.output_is_native()
            || resolver.resolve_token_program(&quote.output_mint).await
                == TokenProgramKind::Extended
        {
            None
        } else {
            Some(resolver.associated_account(user, &quote.output_mint).await)
        };

        let request = RaydiumTransactionRequest {
            compute_unit_price_micro_lamports: self.compute_unit_price().await.to_string(),
            swap_response: quote.provider_data.clone(),
            tx_version: TX_VERSION,
            wallet: user.to_string(),
            wrap_sol: quote.input_is_native(),
            unwrap_sol: quote.output_is_native(),
            input_account: input_account.map(|a| a.to_string()),
            output_account: output_account.map(|a| a.to_string()),
        };

        let url = format!("{}/transaction/swap-base-in", self.base_url);
        debug!("raydium transaction: {url}");
        let envelope: RaydiumEnvelope<Vec<RaydiumTransactionData>> = read_json(
            Provider::Raydium,
            Stage::Build,
            self.client.post(&url).json(&request),
        )
        .await?;

        let transactions = match envelope {
            RaydiumEnvelope {
                success: true,
                data: Some(data),
                ..
            } => data,
            RaydiumEnvelope { id, msg, .. } => {
                return Err(request_failure(
                    Provider::Raydium,
                    Stage::Build,
                    format!("transaction {id} rejected: {}", msg.unwrap_or_default()),
                ));
            }
        };

        debug!("raydium returned {} transaction(s)", transactions.len());
        UnsignedTransactionSet::from_base64(
            Provider::Raydium,
            transactions.iter().map(|t| t.transaction.as_str()),
        )
    }
}

fn describe_route(plan: &[RaydiumRoutePlanStep]) -> String {
    plan.iter()
        .map(|step| step.pool_id.as_str())
        .collect::<Vec<_>>()
        .join(" -> ")
}
