use async_trait::async_trait;
use solana_client::{nonblocking::rpc_client::RpcClient, rpc_config::RpcSendTransactionConfig};
use solana_sdk::{
    account::Account,
    commitment_config::CommitmentConfig,
    hash::Hash,
    pubkey::Pubkey,
    signature::Signature,
    transaction::{TransactionError, VersionedTransaction},
};

use crate::error::SwapError;

/// Chain access the swap engine needs. Implementations hold no mutable local
/// state, so one handle can be shared by concurrent swaps.
#[async_trait]
pub trait ChainConnection: Send + Sync {
    /// `Ok(None)` when the account does not exist.
    async fn get_account(&self, address: &Pubkey) -> Result<Option<Account>, SwapError>;

    async fn get_latest_blockhash(&self) -> Result<Hash, SwapError>;

    async fn send_transaction(
        &self,
        transaction: &VersionedTransaction,
        skip_preflight: bool,
        max_retries: Option<usize>,
    ) -> Result<Signature, SwapError>;

    /// `Ok(None)` while the transaction has not been observed at `commitment`.
    async fn get_signature_status(
        &self,
        signature: &Signature,
        commitment: CommitmentConfig,
    ) -> Result<Option<Result<(), TransactionError>>, SwapError>;
}

#[async_trait]
impl ChainConnection for RpcClient {
    async fn get_account(&self, address: &Pubkey) -> Result<Option<Account>, SwapError> {
        self.get_account_with_commitment(address, self.commitment())
            .await
            .map(|response| response.value)
            .map_err(|e| SwapError::Solana(e.to_string()))
    }

    async fn get_latest_blockhash(&self) -> Result<Hash, SwapError> {
        RpcClient::get_latest_blockhash(self)
            .await
            .map_err(|e| SwapError::Solana(e.to_string()))
    }

    async fn send_transaction(
        &self,
        transaction: &VersionedTransaction,
        skip_preflight: bool,
        max_retries: Option<usize>,
    ) -> Result<Signature, SwapError> {
        let config = RpcSendTransactionConfig {
            skip_preflight,
            max_retries,
            ..Default::default()
        };
        self.send_transaction_with_config(transaction, config)
            .await
            .map_err(|e| SwapError::Solana(e.to_string()))
    }

    async fn get_signature_status(
        &self,
        signature: &Signature,
        commitment: CommitmentConfig,
    ) -> Result<Option<Result<(), TransactionError>>, SwapError> {
        self.get_signature_status_with_commitment(signature, commitment)
            .await
            .map_err(|e| SwapError::Solana(e.to_string()))
    }
}
