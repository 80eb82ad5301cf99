use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use solana_sdk::{pubkey::Pubkey, signer::Signer};

#[cfg(feature = "jupiter")]
use crate::jupiter::JupiterProvider;
#[cfg(feature = "raydium")]
use crate::raydium::RaydiumProvider;
use crate::{
    error::SwapError,
    executor::TransactionExecutor,
    token_account::TokenAccountResolver,
    types::{Provider, Quote, SwapConfig, SwapRequest, UnsignedTransactionSet},
};

/// One liquidity provider: quotes a swap and turns its own quote into
/// transactions.
#[async_trait]
pub trait SwapProvider: Send + Sync {
    fn provider(&self) -> Provider;

    /// Read-only; never touches chain state.
    async fn quote(&self, request: &SwapRequest) -> Result<Quote, SwapError>;

    /// Chain writes the provider needs before its transactions can be built,
    /// such as creating the destination token account.
    async fn prepare_accounts(
        &self,
        _resolver: &TokenAccountResolver<'_>,
        _executor: &TransactionExecutor,
        _signer: &(dyn Signer + Sync),
        _quote: &Quote,
    ) -> Result<(), SwapError> {
        Ok(())
    }

    async fn build_transactions(
        &self,
        resolver: &TokenAccountResolver<'_>,
        user: &Pubkey,
        quote: &Quote,
    ) -> Result<UnsignedTransactionSet, SwapError>;
}

/// The providers this crate ships, in the order they are registered.
pub enum ProviderClient {
    #[cfg(feature = "jupiter")]
    Jupiter(JupiterProvider),
    #[cfg(feature = "raydium")]
    Raydium(RaydiumProvider),
}

impl ProviderClient {
    pub fn from_config(config: &SwapConfig) -> Result<Vec<Self>, SwapError> {
        let mut providers = Vec::new();

        #[cfg(feature = "jupiter")]
        if let Some(jupiter) = &config.jupiter {
            providers.push(Self::Jupiter(JupiterProvider::new(jupiter)?));
        }

        #[cfg(feature = "raydium")]
        if let Some(raydium) = &config.raydium {
            providers.push(Self::Raydium(RaydiumProvider::new(raydium, &config.raydium_fees)?));
        }

        #[cfg(not(any(feature = "jupiter", feature = "raydium")))]
        let _ = config;

        Ok(providers)
    }
}

#[async_trait]
impl SwapProvider for ProviderClient {
    fn provider(&self) -> Provider {
        match *self {
            #[cfg(feature = "jupiter")]
            Self::Jupiter(ref p) => p.provider(),
            #[cfg(feature = "raydium")]
            Self::Raydium(ref p) => p.provider(),
        }
    }

    async fn quote(&self, request: &SwapRequest) -> Result<Quote, SwapError> {
        match *self {
            #[cfg(feature = "jupiter")]
            Self::Jupiter(ref p) => p.quote(request).await,
            #[cfg(feature = "raydium")]
            Self::Raydium(ref p) => p.quote(request).await,
        }
    }

    async fn prepare_accounts(
        &self,
        resolver: &TokenAccountResolver<'_>,
        executor: &TransactionExecutor,
        signer: &(dyn Signer + Sync),
        quote: &Quote,
    ) -> Result<(), SwapError> {
        match *self {
            #[cfg(feature = "jupiter")]
            Self::Jupiter(ref p) => p.prepare_accounts(resolver, executor, signer, quote).await,
            #[cfg(feature = "raydium")]
            Self::Raydium(ref p) => p.prepare_accounts(resolver, executor, signer, quote).await,
        }
    }

    async fn build_transactions(
        &self,
        resolver: &TokenAccountResolver<'_>,
        user: &Pubkey,
        quote: &Quote,
    ) -> Result<UnsignedTransactionSet, SwapError> {
        match *self {
            #[cfg(feature = "jupiter")]
            Self::Jupiter(ref p) => p.build_transactions(resolver, user, quote).await,
            #[cfg(feature = "raydium")]
            Self::Raydium(ref p) => p.build_transactions(resolver, user, quote).await,
        }
    }
}

/// Which provider call an HTTP failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Stage {
    Quote,
    Build,
}

pub(crate) fn request_failure(provider: Provider, stage: Stage, message: impl ToString) -> SwapError {
    let message = message.to_string();
    match stage {
        Stage::Quote => SwapError::QuoteUnavailable { provider, message },
        Stage::Build => SwapError::BuildFailed { provider, message },
    }
}

/// 401 means the public endpoint changed its contract; everything else is a
/// failure of this one call.
pub(crate) fn http_failure(provider: Provider, stage: Stage, status: StatusCode, body: &str) -> SwapError {
    if status == StatusCode::UNAUTHORIZED {
        return SwapError::AuthRequired(provider);
    }
    request_failure(provider, stage, format!("HTTP {status}: {body}"))
}

/// Amounts cross the HTTP boundary as decimal strings.
pub(crate) fn parse_amount(provider: Provider, field: &str, value: &str) -> Result<u64, SwapError> {
    value.parse().map_err(|e: std::num::ParseIntError| {
        request_failure(provider, Stage::Quote, format!("{field} {value:?}: {e}"))
    })
}

pub(crate) async fn read_json<T: DeserializeOwned>(
    provider: Provider,
    stage: Stage,
    request: reqwest::RequestBuilder,
) -> Result<T, SwapError> {
    let response = request
        .send()
        .await
        .map_err(|e| request_failure(provider, stage, e))?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(http_failure(provider, stage, status, &body));
    }

    let body = response
        .text()
        .await
        .map_err(|e| request_failure(provider, stage, e))?;
    serde_json::from_str(&body)
        .map_err(|e| request_failure(provider, stage, format!("invalid response: {e}")))
}
