use solana_sdk::signature::{Keypair, Signer};

use sol_swap_engine::{
    ExecutorConfig, Provider, QuoteAggregator, SwapError, Swapper, TransactionExecutor, NATIVE_MINT,
};

use crate::common::{token_mint, ChainEvent, MockChain, MockProvider, MockQuote};

fn swapper(a: MockProvider, b: MockProvider) -> Swapper<MockProvider> {
    Swapper::new(
        QuoteAggregator::new(vec![a, b]),
        TransactionExecutor::new(ExecutorConfig::default()),
    )
}

#[tokio::test(start_paused = true)]
async fn native_to_token_swap_uses_the_best_provider() {
    let chain = MockChain::new().with_statuses([None, Some(Ok(()))]);
    let keypair = Keypair::new();
    let token_x = token_mint();
    let swapper = swapper(
        MockProvider::new(Provider::Jupiter, MockQuote::Amount(900_000)),
        MockProvider::new(Provider::Raydium, MockQuote::Amount(950_000)),
    );

    let result = swapper
        .swap(&chain, &keypair, NATIVE_MINT, token_x, 1_000_000_000)
        .await
        .expect("swap should succeed");

    assert_eq!(result.provider, Provider::Raydium);
    assert_eq!(result.output_amount, 950_000);
    assert_eq!(result.input_mint, NATIVE_MINT);
    assert_eq!(result.output_mint, token_x);
    assert_eq!(result.signatures, vec![result.signature]);

    let providers = swapper.aggregator().providers();
    assert_eq!(providers[0].build_count(), 0);
    assert_eq!(providers[1].build_count(), 1);

    assert_eq!(chain.send_count(), 1);
    assert_eq!(
        chain.events().last(),
        Some(&ChainEvent::Poll {
            signature: result.signature,
            observed: true
        })
    );
    assert_eq!(chain.poll_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn auth_required_provider_is_skipped() {
    let chain = MockChain::new();
    let keypair = Keypair::new();
    let swapper = swapper(
        MockProvider::new(Provider::Jupiter, MockQuote::AuthRequired),
        MockProvider::new(Provider::Raydium, MockQuote::Amount(10)),
    );

    let result = swapper
        .swap(&chain, &keypair, NATIVE_MINT, token_mint(), 1_000)
        .await
        .unwrap();

    assert_eq!(result.provider, Provider::Raydium);
}

#[tokio::test(start_paused = true)]
async fn no_quotes_means_nothing_is_sent() {
    let chain = MockChain::new();
    let keypair = Keypair::new();
    let swapper = swapper(
        MockProvider::new(Provider::Jupiter, MockQuote::AuthRequired),
        MockProvider::new(Provider::Raydium, MockQuote::Unavailable),
    );

    let err = swapper
        .swap(&chain, &keypair, NATIVE_MINT, token_mint(), 1_000)
        .await
        .unwrap_err();

    assert!(matches!(err, SwapError::NoQuotesAvailable(_)));
    assert_eq!(err.auth_required_providers(), vec![Provider::Jupiter]);
    assert_eq!(chain.send_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn confirmation_timeout_is_returned_unchanged() {
    let chain = MockChain::new().never_confirm();
    let keypair = Keypair::new();
    let swapper = swapper(
        MockProvider::new(Provider::Jupiter, MockQuote::Amount(10)),
        MockProvider::new(Provider::Raydium, MockQuote::Amount(5)),
    );

    let err = swapper
        .swap(&chain, &keypair, NATIVE_MINT, token_mint(), 1_000)
        .await
        .unwrap_err();

    assert!(err.is_outcome_unknown());
    assert_eq!(chain.send_count(), 1);
    assert_eq!(swapper.aggregator().providers()[1].build_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn multi_transaction_set_reports_every_signature() {
    let chain = MockChain::new();
    let keypair = Keypair::new();
    let swapper = swapper(
        MockProvider::new(Provider::Jupiter, MockQuote::Amount(10)),
        MockProvider::new(Provider::Raydium, MockQuote::Amount(20)).with_transactions(2),
    );

    let result = swapper
        .swap(&chain, &keypair, token_mint(), NATIVE_MINT, 1_000)
        .await
        .unwrap();

    assert_eq!(result.signatures.len(), 2);
    assert_eq!(result.signature, result.signatures[1]);
    assert_eq!(chain.send_count(), 2);
    assert!(chain
        .sent()
        .iter()
        .all(|tx| tx.message.static_account_keys()[0] == keypair.pubkey()));
}
