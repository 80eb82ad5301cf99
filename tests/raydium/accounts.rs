use serde_json::json;
use solana_sdk::{
    pubkey::Pubkey,
    signature::{Keypair, Signer},
};

use sol_swap_engine::{
    raydium::RaydiumProvider,
    token_account::associated_token_address,
    types::{TOKEN_2022_PROGRAM_ID, TOKEN_PROGRAM_ID},
    ExecutorConfig, Provider, ProviderConfig, Quote, RaydiumFeeConfig, SwapProvider,
    TokenAccountResolver, TokenProgramKind, TransactionExecutor, NATIVE_MINT,
};

use crate::common::{token_mint, MockChain};

fn raydium() -> RaydiumProvider {
    RaydiumProvider::new(
        &ProviderConfig {
            base_url: Some("http://127.0.0.1:9".to_string()),
            ..ProviderConfig::default()
        },
        &RaydiumFeeConfig::default(),
    )
    .unwrap()
}

fn quote_into(output_mint: Pubkey) -> Quote {
    Quote {
        provider: Provider::Raydium,
        input_mint: NATIVE_MINT,
        output_mint,
        input_amount: 1_000_000_000,
        output_amount: 950_000,
        price_impact: None,
        slippage_bps: 100,
        route: "pool".to_string(),
        provider_data: json!({}),
    }
}

#[tokio::test(start_paused = true)]
async fn standard_destination_is_created_once() {
    let owner = Keypair::new();
    let mint = token_mint();
    let address = associated_token_address(&owner.pubkey(), &mint, TokenProgramKind::Standard);
    let chain = MockChain::new()
        .with_account(mint, TOKEN_PROGRAM_ID)
        .creating_on_send(address);
    let resolver = TokenAccountResolver::new(&chain);
    let executor = TransactionExecutor::new(ExecutorConfig::default());
    let raydium = raydium();
    let quote = quote_into(mint);

    raydium
        .prepare_accounts(&resolver, &executor, &owner, &quote)
        .await
        .unwrap();
    raydium
        .prepare_accounts(&resolver, &executor, &owner, &quote)
        .await
        .unwrap();

    assert_eq!(chain.send_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn extended_destination_is_left_to_the_builder() {
    let owner = Keypair::new();
    let mint = token_mint();
    let chain = MockChain::new().with_account(mint, TOKEN_2022_PROGRAM_ID);
    let resolver = TokenAccountResolver::new(&chain);
    let executor = TransactionExecutor::new(ExecutorConfig::default());

    raydium()
        .prepare_accounts(&resolver, &executor, &owner, &quote_into(mint))
        .await
        .unwrap();

    assert_eq!(chain.send_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn native_destination_needs_no_account() {
    let owner = Keypair::new();
    let chain = MockChain::new();
    let resolver = TokenAccountResolver::new(&chain);
    let executor = TransactionExecutor::new(ExecutorConfig::default());

    raydium()
        .prepare_accounts(&resolver, &executor, &owner, &quote_into(NATIVE_MINT))
        .await
        .unwrap();

    assert_eq!(chain.send_count(), 0);
    assert!(chain.events().is_empty());
}
