use solana_sdk::{pubkey::Pubkey, signature::Signature};

use crate::types::Provider;

#[derive(Debug, thiserror::Error)]
pub enum SwapError {
    #[error("{provider} quote unavailable: {message}")]
    QuoteUnavailable { provider: Provider, message: String },

    #[error("{0} rejected the request as unauthenticated")]
    AuthRequired(Provider),

    #[error("no quotes available ({} provider failures)", .0.len())]
    NoQuotesAvailable(Vec<(Provider, SwapError)>),

    #[error("{provider} failed to build transaction: {message}")]
    BuildFailed { provider: Provider, message: String },

    #[error("signing failed: {0}")]
    SigningFailed(String),

    #[error("submission failed after {attempts} attempts: {message}")]
    SubmissionFailed { attempts: usize, message: String },

    #[error("transaction {signature} unconfirmed after {attempts} status polls")]
    ConfirmationTimeout { signature: Signature, attempts: usize },

    #[error("transaction {signature} failed on-chain: {message}")]
    TransactionFailed { signature: Signature, message: String },

    #[error("associated account for mint {mint} could not be created: {message}")]
    AccountCreationFailed { mint: Pubkey, message: String },

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("solana error: {0}")]
    Solana(String),
}

impl SwapError {
    /// The provider endpoint changed its contract; the caller should stop
    /// using that provider for the current cycle.
    pub fn is_auth_required(&self) -> bool {
        matches!(self, Self::AuthRequired(_))
    }

    /// Funds may have moved even though no confirmation was observed.
    pub fn is_outcome_unknown(&self) -> bool {
        matches!(self, Self::ConfirmationTimeout { .. })
    }

    /// Providers that answered `AuthRequired` while the aggregator collected quotes.
    pub fn auth_required_providers(&self) -> Vec<Provider> {
        match self {
            Self::AuthRequired(provider) => vec![*provider],
            Self::NoQuotesAvailable(failures) => failures
                .iter()
                .filter(|(_, e)| e.is_auth_required())
                .map(|(p, _)| *p)
                .collect(),
            _ => Vec::new(),
        }
    }
}
