use ethers::types::{Address, TransactionRequest, U256};
use mockito::{Matcher, Server, ServerGuard};
use serde_json::json;
use std::time::Duration;
use x402_deployer::{
    error::DeployError,
    models::{Bounds, FeeQuote},
    services::{estimate_deployment, ChainClient, EstimateRequest, EthereumService},
};

const GWEI: u64 = 1_000_000_000;

async fn respond(server: &mut ServerGuard, method: &str, body: serde_json::Value) {
    server
        .mock("POST", "/")
        .match_body(Matcher::PartialJson(json!({ "method": method })))
        .with_header("content-type", "application/json")
        .with_body(body.to_string())
        .create_async()
        .await;
}

async fn rpc(server: &mut ServerGuard, method: &str, result: serde_json::Value) {
    respond(server, method, json!({ "jsonrpc": "2.0", "id": 1, "result": result })).await;
}

/// Answers `method` with a JSON-RPC error object.
async fn rpc_error(server: &mut ServerGuard, method: &str, message: &str) {
    respond(
        server,
        method,
        json!({
            "jsonrpc": "2.0",
            "id": 1,
            "error": { "code": -32601, "message": message }
        }),
    )
    .await;
}

fn hex(value: u64) -> serde_json::Value {
    json!(format!("{value:#x}"))
}

fn service(server: &ServerGuard) -> EthereumService {
    EthereumService::connect(&server.url(), Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn legacy_node_without_blocks_yields_gas_price_only() {
    let mut server = Server::new_async().await;
    rpc(&mut server, "eth_getBlockByNumber", serde_json::Value::Null).await;
    rpc(&mut server, "eth_gasPrice", hex(40 * GWEI)).await;
    rpc_error(&mut server, "eth_maxPriorityFeePerGas", "method not found").await;

    let quote = service(&server).fee_quote().await.unwrap();

    assert_eq!(
        quote,
        FeeQuote {
            base_fee_per_gas: None,
            suggested_priority_fee: None,
            max_fee_per_gas: None,
            legacy_gas_price: Some(U256::from(40 * GWEI)),
        }
    );
}

#[tokio::test]
async fn transport_failure_on_optional_field_is_an_rpc_error() {
    let mut server = Server::new_async().await;
    rpc(&mut server, "eth_getBlockByNumber", serde_json::Value::Null).await;
    server
        .mock("POST", "/")
        .match_body(Matcher::PartialJson(json!({ "method": "eth_gasPrice" })))
        .with_status(500)
        .with_body("Internal Server Error")
        .create_async()
        .await;
    rpc_error(&mut server, "eth_maxPriorityFeePerGas", "method not found").await;

    let err = service(&server).fee_quote().await.unwrap_err();

    assert!(matches!(err, DeployError::RpcError(_)), "got {err:?}");
}

#[tokio::test]
async fn reads_chain_id_and_balance() {
    let mut server = Server::new_async().await;
    rpc(&mut server, "eth_chainId", hex(80002)).await;
    rpc(&mut server, "eth_getBalance", hex(2 * GWEI)).await;

    let service = service(&server);
    assert_eq!(service.chain_id().await.unwrap(), 80002);
    assert_eq!(
        service.balance(Address::repeat_byte(0x11)).await.unwrap(),
        U256::from(2 * GWEI)
    );
}

#[tokio::test]
async fn estimates_against_a_mocked_node() {
    let mut server = Server::new_async().await;
    rpc(&mut server, "eth_chainId", hex(80002)).await;
    rpc(&mut server, "eth_getBlockByNumber", serde_json::Value::Null).await;
    rpc(&mut server, "eth_gasPrice", hex(50 * GWEI)).await;
    rpc_error(&mut server, "eth_maxPriorityFeePerGas", "method not found").await;
    rpc(&mut server, "eth_estimateGas", hex(300_000)).await;

    let tx = TransactionRequest::new()
        .from(Address::repeat_byte(0x11))
        .data(vec![0x60, 0x80])
        .into();
    let estimate = estimate_deployment(&service(&server), &tx, &EstimateRequest::default())
        .await
        .unwrap();

    assert_eq!(estimate.gas_units, U256::from(300_000));
    assert_eq!(
        estimate.cost_wei,
        Bounds::Exact(U256::from(15_000_000_000_000_000u64))
    );
    assert_eq!(estimate.upper_native(), "0.015");
    assert_eq!(estimate.native.symbol, "MATIC");
}

#[tokio::test]
async fn node_without_fee_data_is_reported() {
    let mut server = Server::new_async().await;
    rpc(&mut server, "eth_chainId", hex(999999)).await;
    rpc(&mut server, "eth_getBlockByNumber", serde_json::Value::Null).await;
    rpc_error(&mut server, "eth_gasPrice", "method not found").await;
    rpc_error(&mut server, "eth_maxPriorityFeePerGas", "method not found").await;

    let tx = TransactionRequest::new().into();
    let err = estimate_deployment(&service(&server), &tx, &EstimateRequest::default())
        .await
        .unwrap_err();

    assert!(matches!(err, DeployError::NoFeeDataAvailable));
}

#[tokio::test]
async fn failing_simulation_is_estimation_unavailable() {
    let mut server = Server::new_async().await;
    rpc(&mut server, "eth_chainId", hex(137)).await;
    rpc(&mut server, "eth_getBlockByNumber", serde_json::Value::Null).await;
    rpc(&mut server, "eth_gasPrice", hex(30 * GWEI)).await;
    rpc_error(&mut server, "eth_maxPriorityFeePerGas", "method not found").await;
    rpc_error(&mut server, "eth_estimateGas", "execution reverted").await;

    let tx = TransactionRequest::new().into();
    let err = estimate_deployment(&service(&server), &tx, &EstimateRequest::default())
        .await
        .unwrap_err();

    assert!(matches!(err, DeployError::EstimationUnavailable(ref msg) if msg.contains("execution reverted")));
}

#[tokio::test]
async fn silent_node_times_out() {
    // Accepts connections and never answers.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let holder = tokio::spawn(async move {
        let mut open = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            open.push(socket);
        }
    });

    let service =
        EthereumService::connect(&format!("http://{addr}"), Duration::from_secs(1)).unwrap();
    let err = service.chain_id().await.unwrap_err();

    assert!(
        matches!(err, DeployError::Timeout { method: "eth_chainId", secs: 1 }),
        "got {err:?}"
    );
    holder.abort();
}

#[tokio::test]
async fn unreachable_node_is_an_rpc_error() {
    // Nothing listens on port 9 (discard) on test machines.
    let service = EthereumService::connect("http://127.0.0.1:9", Duration::from_secs(5)).unwrap();
    let err = service.chain_id().await.unwrap_err();
    assert!(matches!(err, DeployError::RpcError(_) | DeployError::Timeout { .. }));
}
