pub mod aggregator;
pub mod chain;
pub mod error;
pub mod executor;
pub mod provider;
pub mod swap;
pub mod token_account;
pub mod types;

#[cfg(feature = "jupiter")]
pub mod jupiter;
#[cfg(feature = "raydium")]
pub mod raydium;

pub use aggregator::QuoteAggregator;
pub use chain::ChainConnection;
pub use error::SwapError;
pub use executor::TransactionExecutor;
pub use provider::{ProviderClient, SwapProvider};
pub use swap::Swapper;
pub use token_account::TokenAccountResolver;
pub use types::{
    ExecutorConfig, Provider, ProviderConfig, Quote, RaydiumFeeConfig, SwapConfig, SwapRequest, SwapResult,
    TokenProgramKind, UnsignedTransactionSet, NATIVE_MINT,
};
