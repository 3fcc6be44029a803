// Example: Granting a session key and clicking without wallet prompts
//
// This example demonstrates how to:
// 1. Connect to a wallet exposed over JSON-RPC
// 2. Grant a scoped permission to a fresh secp256r1 session key
// 3. Submit click() signed by the session key
// 4. Poll until the batch is confirmed and print the explorer link
//
// Run with WALLET_RPC_URL pointing at a wallet endpoint that supports
// wallet_grantPermissions and wallet_sendCalls.

use std::sync::Arc;

use session_keys_sdk::{ConnectorChoice, JsonRpcWallet, SessionConfig, SessionFlow};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let url = std::env::var("WALLET_RPC_URL").unwrap_or_else(|_| "http://localhost:8545".into());
    let config = SessionConfig::from_env()?;
    let flow = SessionFlow::with_wallet(config, Arc::new(JsonRpcWallet::new(url)));

    // 1. Connect
    let account = flow.connect(&ConnectorChoice::default()).await?;
    println!("Connected: {account}");

    // 2. Grant
    let grant = flow.request_permission().await?;
    println!("Permission granted:");
    println!("  Session key: {}", grant.signer.0);
    println!("  Expiry: {}", grant.expiry);

    // 3. Click
    let id = flow.submit_click().await?;
    println!("Call batch submitted: {id}");

    // 4. Confirm
    match flow.wait_for_confirmation().await? {
        Some(status) => println!("Batch finished with {:?}", status.status),
        None => println!("No batch outstanding"),
    }
    if let Some(link) = flow.explorer_link() {
        println!("View on explorer: {link}");
    }

    flow.disconnect().await?;
    Ok(())
}
