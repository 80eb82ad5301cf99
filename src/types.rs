use std::time::Duration;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use solana_sdk::{
    commitment_config::CommitmentConfig, pubkey::Pubkey, signature::Signature,
    transaction::VersionedTransaction,
};

use crate::error::SwapError;

/// Wrapped SOL; stands in for the native asset on both sides of a swap.
pub const NATIVE_MINT: Pubkey = Pubkey::from_str_const("So11111111111111111111111111111111111111112");
pub const TOKEN_PROGRAM_ID: Pubkey =
    Pubkey::from_str_const("TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA");
pub const TOKEN_2022_PROGRAM_ID: Pubkey =
    Pubkey::from_str_const("TokenzQdBNbLqP5VEhdkAS6EPFLC1PHnBqCXEpPxuEb");

pub const DEFAULT_SLIPPAGE_BPS: u16 = 100;
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    Jupiter,
    Raydium,
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Jupiter => write!(f, "Jupiter"),
            Self::Raydium => write!(f, "Raydium"),
        }
    }
}

/// Token program that owns a mint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TokenProgramKind {
    #[default]
    Standard,
    Extended,
}

impl TokenProgramKind {
    pub fn from_owner(owner: &Pubkey) -> Self {
        if *owner == TOKEN_2022_PROGRAM_ID {
            Self::Extended
        } else {
            Self::Standard
        }
    }

    pub fn program_id(self) -> Pubkey {
        match self {
            Self::Standard => TOKEN_PROGRAM_ID,
            Self::Extended => TOKEN_2022_PROGRAM_ID,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SwapRequest {
    pub input_mint: Pubkey,
    pub output_mint: Pubkey,
    pub amount: u64,
    /// Overrides the provider's configured slippage when set.
    pub slippage_bps: Option<u16>,
    pub user: Pubkey,
}

#[derive(Debug, Clone)]
pub struct Quote {
    pub provider: Provider,
    pub input_mint: Pubkey,
    pub output_mint: Pubkey,
    pub input_amount: u64,
    pub output_amount: u64,
    /// Fraction in `0..=1`; `None` when the provider does not report it.
    pub price_impact: Option<f64>,
    pub slippage_bps: u16,
    pub route: String,
    /// Provider-specific payload, only meaningful to the provider that issued it.
    pub provider_data: serde_json::Value,
}

impl Quote {
    pub fn input_is_native(&self) -> bool {
        self.input_mint == NATIVE_MINT
    }

    pub fn output_is_native(&self) -> bool {
        self.output_mint == NATIVE_MINT
    }
}

/// Transactions that must land in order for one swap.
#[derive(Debug, Clone)]
pub struct UnsignedTransactionSet {
    pub provider: Provider,
    pub transactions: Vec<VersionedTransaction>,
}

impl UnsignedTransactionSet {
    /// Decodes base64 bincode transactions as returned by provider build endpoints.
    pub fn from_base64<'a>(
        provider: Provider,
        blobs: impl IntoIterator<Item = &'a str>,
    ) -> Result<Self, SwapError> {
        let build_failed = |message: String| SwapError::BuildFailed { provider, message };
        let transactions = blobs
            .into_iter()
            .map(|blob| {
                let bytes = BASE64
                    .decode(blob)
                    .map_err(|e| build_failed(format!("invalid base64 transaction: {e}")))?;
                bincode::deserialize::<VersionedTransaction>(&bytes)
                    .map_err(|e| build_failed(format!("invalid transaction: {e}")))
            })
            .collect::<Result<Vec<_>, SwapError>>()?;

        if transactions.is_empty() {
            return Err(build_failed("no transactions in build response".to_string()));
        }

        Ok(Self {
            provider,
            transactions,
        })
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct SwapResult {
    pub provider: Provider,
    pub input_mint: Pubkey,
    pub output_mint: Pubkey,
    pub output_amount: u64,
    /// Signature of the last transaction in the set.
    pub signature: Signature,
    pub signatures: Vec<Signature>,
}

#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub base_url: Option<String>,
    pub slippage_bps: u16,
    pub user_agent: Option<String>,
    pub api_key: Option<String>,
    pub timeout: Duration,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            slippage_bps: DEFAULT_SLIPPAGE_BPS,
            user_agent: None,
            api_key: None,
            timeout: DEFAULT_HTTP_TIMEOUT,
        }
    }
}

impl ProviderConfig {
    pub(crate) fn http_client(&self) -> Result<reqwest::Client, SwapError> {
        let mut builder = reqwest::Client::builder().timeout(self.timeout);
        if let Some(agent) = &self.user_agent {
            builder = builder.user_agent(agent.clone());
        }
        Ok(builder.build()?)
    }

    pub(crate) fn resolve_base_url(&self, env_var: &str, default: &str) -> String {
        resolve_url(self.base_url.as_deref(), env_var, default)
    }
}

/// Explicit value, then `env_var`, then `default`; trailing slashes trimmed.
pub(crate) fn resolve_url(explicit: Option<&str>, env_var: &str, default: &str) -> String {
    explicit
        .map(str::to_string)
        .or_else(|| std::env::var(env_var).ok())
        .unwrap_or_else(|| default.to_string())
        .trim_end_matches('/')
        .to_string()
}

/// Priority fee settings for Raydium builds.
#[derive(Debug, Clone, Default)]
pub struct RaydiumFeeConfig {
    /// Fee endpoint; falls back to `RAYDIUM_PRIORITY_FEE_URL`, then Raydium's public one.
    pub priority_fee_url: Option<String>,
    /// Fixed fee. When set the fee endpoint is never called.
    pub compute_unit_price_micro_lamports: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    pub confirm_interval: Duration,
    pub max_confirm_attempts: usize,
    /// Pause between consecutive transactions of one set.
    pub settle_delay: Duration,
    pub send_retries: usize,
    pub commitment: CommitmentConfig,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            confirm_interval: Duration::from_secs(10),
            max_confirm_attempts: 6,
            settle_delay: Duration::from_secs(5),
            send_retries: 2,
            commitment: CommitmentConfig::confirmed(),
        }
    }
}

pub struct SwapConfig {
    pub jupiter: Option<ProviderConfig>,
    pub raydium: Option<ProviderConfig>,
    pub raydium_fees: RaydiumFeeConfig,
    pub executor: ExecutorConfig,
}

impl Default for SwapConfig {
    fn default() -> Self {
        Self {
            jupiter: Some(ProviderConfig::default()),
            raydium: Some(ProviderConfig::default()),
            raydium_fees: RaydiumFeeConfig::default(),
            executor: ExecutorConfig::default(),
        }
    }
}
