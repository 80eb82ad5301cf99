use solana_sdk::{pubkey::Pubkey, signer::Signer};
use tracing::info;

use crate::{
    aggregator::QuoteAggregator,
    chain::ChainConnection,
    error::SwapError,
    executor::TransactionExecutor,
    provider::{ProviderClient, SwapProvider},
    token_account::TokenAccountResolver,
    types::{SwapConfig, SwapRequest, SwapResult},
};

/// Quote, build and execute one swap with the best-paying provider.
///
/// Errors from any step are returned as-is. There is no fallback to another
/// provider and no automatic retry: the transaction may already have landed.
pub struct Swapper<P = ProviderClient> {
    aggregator: QuoteAggregator<P>,
    executor: TransactionExecutor,
}

impl Swapper<ProviderClient> {
    pub fn from_config(config: SwapConfig) -> Result<Self, SwapError> {
        Ok(Self::new(
            QuoteAggregator::from_config(&config)?,
            TransactionExecutor::new(config.executor),
        ))
    }
}

impl<P: SwapProvider> Swapper<P> {
    pub fn new(aggregator: QuoteAggregator<P>, executor: TransactionExecutor) -> Self {
        Self {
            aggregator,
            executor,
        }
    }

    pub fn aggregator(&self) -> &QuoteAggregator<P> {
        &self.aggregator
    }

    pub fn executor(&self) -> &TransactionExecutor {
        &self.executor
    }

    pub async fn swap(
        &self,
        connection: &dyn ChainConnection,
        signer: &(dyn Signer + Sync),
        input_mint: Pubkey,
        output_mint: Pubkey,
        amount: u64,
    ) -> Result<SwapResult, SwapError> {
        let user = signer
            .try_pubkey()
            .map_err(|e| SwapError::SigningFailed(e.to_string()))?;
        let request = SwapRequest {
            input_mint,
            output_mint,
            amount,
            slippage_bps: None,
            user,
        };

        let resolver = TokenAccountResolver::new(connection);
        let (provider, quote) = self.aggregator.best_quote_with_provider(&request).await?;

        provider
            .prepare_accounts(&resolver, &self.executor, signer, &quote)
            .await?;
        let set = provider.build_transactions(&resolver, &user, &quote).await?;
        info!("{} built {} transaction(s)", set.provider, set.len());

        let signatures = self
            .executor
            .execute(connection, signer, set.transactions)
            .await?;
        let signature = *signatures.last().ok_or_else(|| SwapError::BuildFailed {
            provider: quote.provider,
            message: "empty transaction set".to_string(),
        })?;

        info!(
            "swapped {amount} {input_mint} for {} {output_mint} via {}: {signature}",
            quote.output_amount, quote.provider
        );

        Ok(SwapResult {
            provider: quote.provider,
            input_mint,
            output_mint,
            output_amount: quote.output_amount,
            signature,
            signatures,
        })
    }
}
