use tracing::{info, warn};

use crate::{
    error::SwapError,
    provider::{ProviderClient, SwapProvider},
    types::{Provider, Quote, SwapConfig, SwapRequest},
};

/// Fans a quote request out to every registered provider and keeps the one
/// paying the most output.
pub struct QuoteAggregator<P = ProviderClient> {
    providers: Vec<P>,
}

impl QuoteAggregator<ProviderClient> {
    pub fn from_config(config: &SwapConfig) -> Result<Self, SwapError> {
        Ok(Self::new(ProviderClient::from_config(config)?))
    }
}

impl<P: SwapProvider> QuoteAggregator<P> {
    /// Registration order is the tie-break order.
    pub fn new(providers: Vec<P>) -> Self {
        Self { providers }
    }

    pub fn providers(&self) -> &[P] {
        &self.providers
    }

    pub async fn quote(&self, provider: Provider, request: &SwapRequest) -> Result<Quote, SwapError> {
        let p = self
            .providers
            .iter()
            .find(|p| p.provider() == provider)
            .ok_or_else(|| SwapError::QuoteUnavailable {
                provider,
                message: "provider not configured".to_string(),
            })?;
        p.quote(request).await
    }

    /// Every provider's outcome, in registration order. One provider failing
    /// never cancels the others.
    pub async fn quote_all(&self, request: &SwapRequest) -> Vec<(Provider, Result<Quote, SwapError>)> {
        let futures = self.providers.iter().map(|p| async move {
            (p.provider(), p.quote(request).await)
        });
        futures::future::join_all(futures).await
    }

    pub async fn best_quote(&self, request: &SwapRequest) -> Result<Quote, SwapError> {
        self.best_quote_with_provider(request)
            .await
            .map(|(_, quote)| quote)
    }

    /// The winning quote together with the provider that issued it, so the
    /// quote payload is only ever handed back to its own provider.
    pub(crate) async fn best_quote_with_provider(
        &self,
        request: &SwapRequest,
    ) -> Result<(&P, Quote), SwapError> {
        let outcomes = self.quote_all(request).await;
        let (index, quote) = select_best(outcomes)?;
        info!(
            "best quote: {} -> {} via {} ({})",
            request.amount, quote.output_amount, quote.provider, quote.route
        );
        let provider = self.providers.get(index).ok_or_else(|| SwapError::QuoteUnavailable {
            provider: quote.provider,
            message: "quote from unregistered provider".to_string(),
        })?;
        Ok((provider, quote))
    }
}

/// Highest `output_amount` wins; on a tie the earlier entry wins. Returns the
/// winner's position in `outcomes`.
pub fn select_best(
    outcomes: Vec<(Provider, Result<Quote, SwapError>)>,
) -> Result<(usize, Quote), SwapError> {
    let mut best: Option<(usize, Quote)> = None;
    let mut failures = Vec::new();

    for (index, (provider, outcome)) in outcomes.into_iter().enumerate() {
        match outcome {
            Ok(quote) => {
                let better = best
                    .as_ref()
                    .map_or(true, |(_, current)| quote.output_amount > current.output_amount);
                if better {
                    best = Some((index, quote));
                }
            }
            Err(e) => {
                if e.is_auth_required() {
                    warn!("{provider} requires authentication, skipping it this cycle");
                } else {
                    warn!("{provider} quote failed: {e}");
                }
                failures.push((provider, e));
            }
        }
    }

    best.ok_or(SwapError::NoQuotesAvailable(failures))
}
