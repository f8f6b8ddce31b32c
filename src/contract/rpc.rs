//! Thin JSON-RPC-over-HTTP client for the Ethereum endpoint
//!
//! Only the two methods the data layer consumes: `eth_call` for reads and
//! `eth_getTransactionReceipt` for confirmation tracking.

use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ClientError;

/// JSON-RPC client bound to a single endpoint URL
#[derive(Clone)]
pub struct JsonRpcClient {
    http: reqwest::Client,
    url: String,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    result: Option<Value>,
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

/// Transaction receipt fields the lifecycle tracker cares about
#[derive(Debug, Clone, Deserialize)]
pub struct TxReceipt {
    #[serde(rename = "transactionHash")]
    pub transaction_hash: String,
    /// "0x1" on success, "0x0" on revert
    pub status: Option<String>,
    #[serde(rename = "blockNumber")]
    pub block_number: Option<String>,
}

impl TxReceipt {
    pub fn succeeded(&self) -> bool {
        matches!(self.status.as_deref(), Some("0x1"))
    }
}

impl JsonRpcClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: url.into(),
        }
    }

    async fn request(&self, method: &str, params: Value) -> Result<Value, ClientError> {
        let payload = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });

        tracing::debug!(method, "sending JSON-RPC request");
        let response = self.http.post(&self.url).json(&payload).send().await?;
        let body: RpcResponse = response.json().await?;

        if let Some(err) = body.error {
            // Reverted eth_calls come back as RPC errors; surface the
            // node's reason string verbatim
            if err.code == 3 || err.message.to_lowercase().contains("revert") {
                return Err(ClientError::Execution(err.message));
            }
            return Err(ClientError::Transport(format!(
                "RPC error {}: {}",
                err.code, err.message
            )));
        }
        body.result
            .ok_or_else(|| ClientError::Transport("RPC response carried no result".to_string()))
    }

    /// Read-only contract call against the latest block
    pub async fn eth_call(&self, to: &str, data: &[u8]) -> Result<Vec<u8>, ClientError> {
        let params = json!([
            { "to": to, "data": format!("0x{}", hex::encode(data)) },
            "latest",
        ]);
        let result = self.request("eth_call", params).await?;
        let encoded = result
            .as_str()
            .ok_or_else(|| ClientError::Transport("eth_call result is not a string".to_string()))?;
        decode_hex(encoded)
    }

    /// Receipt for a broadcast transaction; `None` while still pending
    pub async fn transaction_receipt(
        &self,
        tx_hash: &str,
    ) -> Result<Option<TxReceipt>, ClientError> {
        let result = self
            .request("eth_getTransactionReceipt", json!([tx_hash]))
            .await?;
        if result.is_null() {
            return Ok(None);
        }
        let receipt: TxReceipt = serde_json::from_value(result)
            .map_err(|e| ClientError::Transport(format!("malformed receipt: {}", e)))?;
        Ok(Some(receipt))
    }
}

fn decode_hex(s: &str) -> Result<Vec<u8>, ClientError> {
    hex::decode(s.trim_start_matches("0x"))
        .map_err(|_| ClientError::Transport(format!("response is not hex: {}", s)))
}
