use std::env;
use std::time::Duration;

use bitcoin::Amount;
use mine_api_core::client::{ClientError, MineApiClient};

fn server_client(token: &str) -> MineApiClient {
    let base_url = env::var("MINE_API_TEST_SERVER_BASE_URL")
        .expect("MINE_API_TEST_SERVER_BASE_URL must be set");
    MineApiClient::new(Some(&base_url), token).expect("client must build")
}

fn api_token() -> String {
    env::var("MINE_API_TEST_SERVER_API_TOKEN").expect("MINE_API_TEST_SERVER_API_TOKEN must be set")
}

async fn wait_for_server(client: &MineApiClient) {
    let health_url = format!("{}/api/health", client.base_url());
    for _ in 0..60 {
        if let Ok(resp) = reqwest::get(&health_url).await {
            if resp.status().is_success() {
                return;
            }
        }
        tokio::time::sleep(Duration::from_millis(500)).await;
    }
    panic!("server did not become healthy in time");
}

#[tokio::test(flavor = "multi_thread")]
#[ignore = "requires local regtest bitcoind + mine-api process; set MINE_API_TEST_SERVER_*"]
async fn regtest_server_mines_funds_and_sends() {
    let client = server_client(&api_token());
    wait_for_server(&client).await;

    // =========================================================================
    // Auth
    // =========================================================================

    let wrong = server_client("not-the-token");
    match wrong.create_wallet().await {
        Err(ClientError::Api { status, error, .. }) => {
            assert_eq!(status, 401);
            assert_eq!(error, "Unauthorized");
        }
        other => panic!("expected 401, got {other:?}"),
    }

    // =========================================================================
    // Create two wallets
    // =========================================================================

    let w1 = client.create_wallet().await.expect("create w1").wallet;
    let w2 = client.create_wallet().await.expect("create w2").wallet;
    assert_ne!(w1.id, w2.id);
    assert_eq!(w1.network, "regtest");

    // =========================================================================
    // Mine to w1 and check the matured balance
    // =========================================================================

    let mined = client.mine_blocks(101, &w1.address).await.expect("mine 101");
    assert_eq!(mined.blocks.len(), 101);

    let funded = client.get_wallet(&w1.id).await.expect("get w1").wallet;
    assert!(funded.balance > Amount::ZERO);
    assert!(funded.addresses.contains(&w1.address));

    // =========================================================================
    // Send by source address, confirm, and inspect the receiver
    // =========================================================================

    let sent = client
        .send_bitcoin(&w1.address, &w2.address, Amount::ONE_BTC)
        .await
        .expect("send 1 BTC");
    assert_eq!(sent.transaction.amount, Amount::ONE_BTC);
    assert_eq!(sent.transaction.to, w2.address);

    client.mine_blocks(1, &w1.address).await.expect("confirm");

    let received = client.get_wallet(&w2.address).await.expect("get w2").wallet;
    assert_eq!(received.id, w2.id);
    assert_eq!(received.balance, Amount::ONE_BTC);
    assert!(received
        .recent_transactions
        .iter()
        .any(|tx| tx.txid == sent.transaction.txid && tx.category == "receive"));

    // =========================================================================
    // Validation and not-found paths
    // =========================================================================

    match client.mine_blocks(0, &w1.address).await {
        Err(ClientError::Api { status, .. }) => assert_eq!(status, 400),
        other => panic!("expected 400 for zero blocks, got {other:?}"),
    }
    match client.get_wallet("wallet_does_not_exist").await {
        Err(ClientError::Api { status, error, .. }) => {
            assert_eq!(status, 404);
            assert_eq!(error, "Wallet not found");
        }
        other => panic!("expected 404, got {other:?}"),
    }
}
