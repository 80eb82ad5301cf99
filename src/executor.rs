use solana_sdk::{
    commitment_config::CommitmentConfig,
    hash::Hash,
    message::VersionedMessage,
    signature::Signature,
    signer::Signer,
    transaction::VersionedTransaction,
};
use tracing::{debug, info, warn};

use crate::{chain::ChainConnection, error::SwapError, types::ExecutorConfig};

/// Signs, submits and confirms transactions one at a time.
///
/// A transaction is never resubmitted once it has been accepted by the
/// network: if no status shows up within the poll budget the outcome is
/// reported as unknown.
#[derive(Debug, Clone, Default)]
pub struct TransactionExecutor {
    config: ExecutorConfig,
}

impl TransactionExecutor {
    pub fn new(config: ExecutorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    pub fn with_commitment(&self, commitment: CommitmentConfig) -> Self {
        Self {
            config: ExecutorConfig {
                commitment,
                ..self.config.clone()
            },
        }
    }

    /// Runs the whole set in order and returns one signature per transaction.
    /// Any failure aborts the remaining transactions.
    pub async fn execute(
        &self,
        connection: &dyn ChainConnection,
        signer: &(dyn Signer + Sync),
        transactions: Vec<VersionedTransaction>,
    ) -> Result<Vec<Signature>, SwapError> {
        let total = transactions.len();
        let mut signatures = Vec::with_capacity(total);

        for (index, transaction) in transactions.into_iter().enumerate() {
            if index > 0 {
                debug!("settling {:?} before transaction {}/{total}", self.config.settle_delay, index + 1);
                tokio::time::sleep(self.config.settle_delay).await;
            }

            let signed = self.sign(connection, signer, transaction).await?;
            let signature = self.submit(connection, &signed).await?;
            self.confirm(connection, &signature).await?;

            info!("transaction {}/{total} landed: {signature}", index + 1);
            signatures.push(signature);
        }

        Ok(signatures)
    }

    async fn sign(
        &self,
        connection: &dyn ChainConnection,
        signer: &(dyn Signer + Sync),
        mut transaction: VersionedTransaction,
    ) -> Result<VersionedTransaction, SwapError> {
        let signer_key = signer
            .try_pubkey()
            .map_err(|e| SwapError::SigningFailed(e.to_string()))?;

        let required = transaction.message.header().num_required_signatures as usize;
        let position = transaction
            .message
            .static_account_keys()
            .iter()
            .take(required)
            .position(|key| *key == signer_key)
            .ok_or_else(|| {
                SwapError::SigningFailed(format!("{signer_key} is not a required signer"))
            })?;

        // Co-signed transactions keep their blockhash, otherwise the
        // existing signatures would no longer verify.
        if required == 1 {
            match connection.get_latest_blockhash().await {
                Ok(blockhash) => match &mut transaction.message {
                    VersionedMessage::Legacy(m) => m.recent_blockhash = blockhash,
                    VersionedMessage::V0(m) => m.recent_blockhash = blockhash,
                },
                // A locally built transaction has no blockhash to fall back on.
                Err(e) if *transaction.message.recent_blockhash() == Hash::default() => {
                    return Err(e);
                }
                Err(e) => warn!("blockhash refresh failed, keeping provider blockhash: {e}"),
            }
        }

        let signature = signer
            .try_sign_message(&transaction.message.serialize())
            .map_err(|e| SwapError::SigningFailed(e.to_string()))?;

        transaction
            .signatures
            .resize(required, Signature::default());
        transaction.signatures[position] = signature;

        Ok(transaction)
    }

    async fn submit(
        &self,
        connection: &dyn ChainConnection,
        transaction: &VersionedTransaction,
    ) -> Result<Signature, SwapError> {
        let attempts = self.config.send_retries + 1;
        let mut last_error = String::new();

        for attempt in 1..=attempts {
            match connection
                .send_transaction(transaction, true, Some(self.config.send_retries))
                .await
            {
                Ok(signature) => {
                    debug!("sent {signature} on attempt {attempt}");
                    return Ok(signature);
                }
                Err(e) => {
                    warn!("send attempt {attempt}/{attempts} failed: {e}");
                    last_error = e.to_string();
                }
            }
        }

        Err(SwapError::SubmissionFailed {
            attempts,
            message: last_error,
        })
    }

    async fn confirm(
        &self,
        connection: &dyn ChainConnection,
        signature: &Signature,
    ) -> Result<(), SwapError> {
        let attempts = self.config.max_confirm_attempts;

        for attempt in 1..=attempts {
            tokio::time::sleep(self.config.confirm_interval).await;

            match connection
                .get_signature_status(signature, self.config.commitment)
                .await
            {
                Ok(Some(Ok(()))) => {
                    debug!("{signature} confirmed on poll {attempt}");
                    return Ok(());
                }
                Ok(Some(Err(e))) => {
                    return Err(SwapError::TransactionFailed {
                        signature: *signature,
                        message: e.to_string(),
                    });
                }
                Ok(None) => debug!("{signature} not visible yet (poll {attempt}/{attempts})"),
                Err(e) => warn!("status poll {attempt}/{attempts} for {signature} failed: {e}"),
            }
        }

        Err(SwapError::ConfirmationTimeout {
            signature: *signature,
            attempts,
        })
    }
}
