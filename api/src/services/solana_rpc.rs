use std::sync::atomic::{AtomicU64, Ordering};

use aggregator::WalletBalanceProvider;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::{json, Value};

const LAMPORTS_PER_SOL: f64 = 1_000_000_000.0;

#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct ContextValue<T> {
    value: T,
}

#[derive(Debug, Deserialize)]
struct KeyedAccount {
    account: ParsedAccount,
}

#[derive(Debug, Deserialize)]
struct ParsedAccount {
    data: ParsedData,
}

#[derive(Debug, Deserialize)]
struct ParsedData {
    parsed: ParsedInfo,
}

#[derive(Debug, Deserialize)]
struct ParsedInfo {
    info: TokenAccountInfo,
}

#[derive(Debug, Deserialize)]
struct TokenAccountInfo {
    #[serde(rename = "tokenAmount")]
    token_amount: TokenAmount,
}

#[derive(Debug, Deserialize)]
struct TokenAmount {
    #[serde(rename = "uiAmount")]
    ui_amount: Option<f64>,
}

/// Wallet balances over Solana JSON-RPC. Without an endpoint every lookup
/// fails, which the balance aggregator turns into a zero balance.
pub struct SolanaRpcClient {
    client: Client,
    rpc_url: Option<String>,
    next_id: AtomicU64,
}

impl SolanaRpcClient {
    pub fn new(client: Client, rpc_url: Option<String>) -> Self {
        Self {
            client,
            rpc_url,
            next_id: AtomicU64::new(1),
        }
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T> {
        let url = self
            .rpc_url
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("RPC_URL is not configured"))?;
        let body = json!({
            "jsonrpc": "2.0",
            "id": self.next_id.fetch_add(1, Ordering::Relaxed),
            "method": method,
            "params": params,
        });

        let response = self
            .client
            .post(url)
            .json(&body)
            .send()
            .await
            .with_context(|| format!("{method} request failed"))?;
        let status = response.status();
        if !status.is_success() {
            return Err(anyhow::anyhow!("{method} returned status {}", status));
        }

        let payload: RpcResponse<T> = response
            .json()
            .await
            .with_context(|| format!("failed to decode {method} response"))?;
        if let Some(err) = payload.error {
            return Err(anyhow::anyhow!(
                "{method} rpc error {}: {}",
                err.code,
                err.message
            ));
        }
        payload
            .result
            .ok_or_else(|| anyhow::anyhow!("{method} response has no result"))
    }
}

#[async_trait]
impl WalletBalanceProvider for SolanaRpcClient {
    async fn native_balance(&self, wallet: &str) -> Result<f64> {
        let balance: ContextValue<u64> = self.call("getBalance", json!([wallet])).await?;
        Ok(balance.value as f64 / LAMPORTS_PER_SOL)
    }

    async fn token_balance(&self, wallet: &str, mint: &str) -> Result<f64> {
        let accounts: ContextValue<Vec<KeyedAccount>> = self
            .call(
                "getTokenAccountsByOwner",
                json!([wallet, { "mint": mint }, { "encoding": "jsonParsed" }]),
            )
            .await?;
        Ok(sum_ui_amounts(&accounts.value))
    }
}

/// A wallet can hold the same mint in several token accounts.
fn sum_ui_amounts(accounts: &[KeyedAccount]) -> f64 {
    accounts
        .iter()
        .filter_map(|a| a.account.data.parsed.info.token_amount.ui_amount)
        .sum()
}
