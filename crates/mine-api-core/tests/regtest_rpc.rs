use std::env;
use std::sync::Once;

use bitcoin::Amount;
use mine_api_core::rpc::{BitcoinRpc, HttpRpcClient};
use mine_api_core::{resolve_wallet, WalletIdGenerator, WalletResolution};

static TRACING_INIT: Once = Once::new();

fn init_tracing() {
    TRACING_INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("mine_api_core=debug")),
            )
            .with_target(true)
            .try_init();
    });
}

fn regtest_client() -> HttpRpcClient {
    let rpc_url = env::var("MINE_API_TEST_RPC_URL").expect("MINE_API_TEST_RPC_URL must be set");
    let rpc_user = env::var("MINE_API_TEST_RPC_USER").expect("MINE_API_TEST_RPC_USER must be set");
    let rpc_pass = env::var("MINE_API_TEST_RPC_PASS").expect("MINE_API_TEST_RPC_PASS must be set");

    HttpRpcClient::new(&rpc_url, Some(&rpc_user), Some(&rpc_pass), None, None)
        .expect("rpc client must construct")
}

#[tokio::test(flavor = "multi_thread")]
#[ignore = "requires local regtest bitcoind; set MINE_API_TEST_RPC_URL/USER/PASS"]
async fn regtest_wallet_lifecycle_over_rpc() {
    init_tracing();
    let rpc = regtest_client();
    let ids = WalletIdGenerator::new();

    let info = rpc
        .get_blockchain_info()
        .await
        .expect("regtest get_blockchain_info must succeed");
    assert_eq!(info.chain, "regtest");

    let miner = ids.next_id();
    let receiver = ids.next_id();
    for name in [&miner, &receiver] {
        let created = rpc.create_wallet(name).await.expect("createwallet must succeed");
        assert_eq!(&created.name, name);
    }
    let wallets = rpc.list_wallets().await.expect("listwallets must succeed");
    assert!(wallets.contains(&miner) && wallets.contains(&receiver));

    // A fresh wallet has no default-label addresses yet.
    let empty = rpc
        .get_addresses_by_label(&receiver, "")
        .await
        .expect("empty label must not be an error");
    assert!(empty.is_empty());

    let miner_address = rpc.get_new_address(&miner).await.expect("getnewaddress");
    let receiver_address = rpc.get_new_address(&receiver).await.expect("getnewaddress");

    eprintln!("[itest] mining 101 blocks to {miner_address}");
    let hashes = rpc
        .generate_to_address(101, &miner_address)
        .await
        .expect("generatetoaddress must succeed");
    assert_eq!(hashes.len(), 101);
    assert!(rpc.get_balance(&miner).await.expect("getbalance") > Amount::ZERO);

    let txid = rpc
        .send_to_address(&miner, &receiver_address, Amount::ONE_BTC)
        .await
        .expect("sendtoaddress must succeed");
    rpc.generate_to_address(1, &miner_address)
        .await
        .expect("confirming block must be mined");

    assert_eq!(
        rpc.get_balance(&receiver).await.expect("getbalance"),
        Amount::ONE_BTC
    );
    let txs = rpc
        .list_transactions(&receiver, 10)
        .await
        .expect("listtransactions must succeed");
    let received = txs
        .iter()
        .find(|tx| tx.txid == txid)
        .expect("receiver must list the incoming transaction");
    assert_eq!(received.category, "receive");
    assert!(received.confirmations >= 1);

    let wallet_info = rpc.get_wallet_info(&receiver).await.expect("getwalletinfo");
    assert_eq!(wallet_info.walletname, receiver);

    let by_address = resolve_wallet(&rpc, &receiver_address)
        .await
        .expect("resolution must succeed");
    assert_eq!(by_address.wallet(), Some(receiver.as_str()));

    let missing = resolve_wallet(&rpc, "wallet_that_does_not_exist")
        .await
        .expect("resolution must succeed");
    assert_eq!(missing, WalletResolution::NotFound);
}
