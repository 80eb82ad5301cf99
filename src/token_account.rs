use dashmap::DashMap;
use solana_sdk::{
    commitment_config::CommitmentConfig,
    message::{Message, VersionedMessage},
    pubkey::Pubkey,
    signature::Signature,
    signer::Signer,
    transaction::VersionedTransaction,
};
use spl_associated_token_account_client::{
    address::get_associated_token_address_with_program_id,
    instruction::create_associated_token_account_idempotent,
};
use tracing::{debug, info, warn};

use crate::{
    chain::ChainConnection, error::SwapError, executor::TransactionExecutor, types::TokenProgramKind,
};

/// Resolves token programs and associated accounts for one swap call.
///
/// Mint program lookups are cached only for the lifetime of the resolver, so a
/// mint that moves between token programs is picked up on the next swap.
pub struct TokenAccountResolver<'a> {
    connection: &'a dyn ChainConnection,
    programs: DashMap<Pubkey, TokenProgramKind>,
}

impl<'a> TokenAccountResolver<'a> {
    pub fn new(connection: &'a dyn ChainConnection) -> Self {
        Self {
            connection,
            programs: DashMap::new(),
        }
    }

    /// Never fails: an unreadable or missing mint resolves to `Standard`.
    pub async fn resolve_token_program(&self, mint: &Pubkey) -> TokenProgramKind {
        if let Some(kind) = self.programs.get(mint) {
            return *kind;
        }

        let kind = match self.connection.get_account(mint).await {
            Ok(Some(account)) => TokenProgramKind::from_owner(&account.owner),
            Ok(None) => {
                warn!("mint {mint} not found, assuming standard token program");
                TokenProgramKind::Standard
            }
            Err(e) => {
                warn!("mint {mint} unreadable ({e}), assuming standard token program");
                TokenProgramKind::Standard
            }
        };

        self.programs.insert(*mint, kind);
        kind
    }

    pub async fn associated_account(&self, owner: &Pubkey, mint: &Pubkey) -> Pubkey {
        let kind = self.resolve_token_program(mint).await;
        associated_token_address(owner, mint, kind)
    }

    /// Returns the owner's associated account for `mint`, creating it first when
    /// it does not exist yet. Creation waits for finalization.
    pub async fn ensure_associated_account(
        &self,
        executor: &TransactionExecutor,
        owner: &(dyn Signer + Sync),
        mint: &Pubkey,
    ) -> Result<Pubkey, SwapError> {
        let owner_key = owner.pubkey();
        let kind = self.resolve_token_program(mint).await;
        let address = associated_token_address(&owner_key, mint, kind);

        if self.account_exists(&address).await {
            debug!("associated account {address} already exists");
            return Ok(address);
        }

        let instruction = create_associated_token_account_idempotent(
            &owner_key,
            &owner_key,
            mint,
            &kind.program_id(),
        );
        let transaction = VersionedTransaction {
            signatures: vec![Signature::default()],
            message: VersionedMessage::Legacy(Message::new(&[instruction], Some(&owner_key))),
        };

        info!("creating associated account {address} for mint {mint}");
        let finalized = executor.with_commitment(CommitmentConfig::finalized());
        let Err(e) = finalized
            .execute(self.connection, owner, vec![transaction])
            .await
        else {
            return Ok(address);
        };

        if self.account_exists(&address).await {
            warn!("account creation reported {e}, but {address} exists");
            return Ok(address);
        }

        Err(SwapError::AccountCreationFailed {
            mint: *mint,
            message: e.to_string(),
        })
    }

    async fn account_exists(&self, address: &Pubkey) -> bool {
        match self.connection.get_account(address).await {
            Ok(account) => account.is_some(),
            Err(e) => {
                debug!("account {address} read failed: {e}");
                false
            }
        }
    }
}

pub fn associated_token_address(owner: &Pubkey, mint: &Pubkey, kind: TokenProgramKind) -> Pubkey {
    get_associated_token_address_with_program_id(owner, mint, &kind.program_id())
}
