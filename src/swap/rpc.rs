//! Wallet provider speaking Ethereum JSON-RPC over HTTP.

use alloy_primitives::{Address, Bytes, TxHash, hex};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

use super::{ContractCall, WalletProvider};
use crate::error::WalletError;

/// EIP-1193 code for a request the user declined.
pub const USER_REJECTED_CODE: i64 = 4001;

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    code: i64,
    #[serde(default)]
    message: String,
}

/// JSON-RPC wallet endpoint, e.g. a local signer or wallet bridge.
#[derive(Debug, Clone)]
pub struct JsonRpcWallet {
    http: reqwest::Client,
    url: String,
}

impl JsonRpcWallet {
    /// Create a provider for `url`.
    pub fn new(url: impl Into<String>) -> Result<Self, WalletError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| WalletError::Provider {
                code: -32603,
                message: e.to_string(),
            })?;
        Ok(Self {
            http,
            url: url.into(),
        })
    }

    async fn request(&self, method: &str, params: Value) -> Result<Value, WalletError> {
        let id = Uuid::new_v4().to_string();
        debug!(method, %id, "Wallet request");

        let response = self
            .http
            .post(&self.url)
            .json(&json!({ "jsonrpc": "2.0", "id": id, "method": method, "params": params }))
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    WalletError::Unavailable
                } else {
                    WalletError::Provider {
                        code: -32603,
                        message: e.to_string(),
                    }
                }
            })?;

        let status = response.status();
        let body: RpcResponse = response.json().await.map_err(|e| WalletError::Provider {
            code: i64::from(status.as_u16()),
            message: e.to_string(),
        })?;

        match (body.result, body.error) {
            (_, Some(error)) if error.code == USER_REJECTED_CODE => Err(WalletError::UserRejected),
            (_, Some(error)) => Err(WalletError::Provider {
                code: error.code,
                message: error.message,
            }),
            (Some(result), None) => Ok(result),
            (None, None) => Err(WalletError::Provider {
                code: -32603,
                message: format!("{method}: empty response"),
            }),
        }
    }

    async fn request_addresses(&self, method: &str) -> Result<Vec<Address>, WalletError> {
        let result = self.request(method, json!([])).await?;
        let raw: Vec<String> = serde_json::from_value(result).map_err(|e| malformed(method, e))?;
        raw.iter()
            .map(|a| a.parse::<Address>().map_err(|e| malformed(method, e)))
            .collect()
    }
}

fn malformed(method: &str, err: impl std::fmt::Display) -> WalletError {
    WalletError::Provider {
        code: -32603,
        message: format!("{method}: malformed result: {err}"),
    }
}

fn call_object(call: &ContractCall) -> Value {
    let mut object = json!({
        "to": call.to.to_string(),
        "data": hex::encode_prefixed(&call.data),
    });
    if let Some(from) = call.from {
        object["from"] = json!(from.to_string());
    }
    if !call.value.is_zero() {
        object["value"] = json!(format!("{:#x}", call.value));
    }
    object
}

#[async_trait]
impl WalletProvider for JsonRpcWallet {
    async fn request_accounts(&self) -> Result<Vec<Address>, WalletError> {
        self.request_addresses("eth_requestAccounts").await
    }

    async fn accounts(&self) -> Result<Vec<Address>, WalletError> {
        self.request_addresses("eth_accounts").await
    }

    async fn send_transaction(&self, call: ContractCall) -> Result<TxHash, WalletError> {
        let result = self
            .request("eth_sendTransaction", json!([call_object(&call)]))
            .await?;
        result
            .as_str()
            .ok_or_else(|| malformed("eth_sendTransaction", "expected a string"))?
            .parse::<TxHash>()
            .map_err(|e| malformed("eth_sendTransaction", e))
    }

    async fn call(&self, call: ContractCall) -> Result<Bytes, WalletError> {
        let result = self
            .request("eth_call", json!([call_object(&call), "latest"]))
            .await?;
        let text = result
            .as_str()
            .ok_or_else(|| malformed("eth_call", "expected a string"))?;
        hex::decode(text)
            .map(Bytes::from)
            .map_err(|e| malformed("eth_call", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_server::serve_once;
    use alloy_primitives::{U256, address};

    #[tokio::test]
    async fn test_request_accounts() {
        let (url, server) = serve_once(
            200,
            r#"{"jsonrpc":"2.0","id":"1","result":["0x00000000000000000000000000000000000000aa"]}"#,
        )
        .await;
        let wallet = JsonRpcWallet::new(url).unwrap();
        let accounts = wallet.request_accounts().await.unwrap();
        assert_eq!(accounts, vec![address!("00000000000000000000000000000000000000aa")]);

        let request = server.await.unwrap();
        assert!(request.contains(r#""method":"eth_requestAccounts""#));
    }

    #[tokio::test]
    async fn test_user_rejection_maps_to_wallet_error() {
        let (url, _server) = serve_once(
            200,
            r#"{"jsonrpc":"2.0","id":"1","error":{"code":4001,"message":"User rejected the request."}}"#,
        )
        .await;
        let wallet = JsonRpcWallet::new(url).unwrap();
        assert_eq!(wallet.request_accounts().await, Err(WalletError::UserRejected));
    }

    #[tokio::test]
    async fn test_revert_is_provider_error() {
        let (url, _server) = serve_once(
            200,
            r#"{"jsonrpc":"2.0","id":"1","error":{"code":3,"message":"execution reverted"}}"#,
        )
        .await;
        let wallet = JsonRpcWallet::new(url).unwrap();
        let call = ContractCall::new(Address::ZERO, vec![0u8; 4]);
        assert_eq!(
            wallet.send_transaction(call).await,
            Err(WalletError::Provider {
                code: 3,
                message: "execution reverted".to_string()
            })
        );
    }

    #[tokio::test]
    async fn test_unreachable_wallet_is_unavailable() {
        let wallet = JsonRpcWallet::new("http://127.0.0.1:9").unwrap();
        assert_eq!(wallet.accounts().await, Err(WalletError::Unavailable));
    }

    #[test]
    fn test_call_object_encodes_value_as_hex() {
        let call = ContractCall::new(Address::ZERO, vec![0xab, 0xcd])
            .sender(address!("00000000000000000000000000000000000000aa"))
            .value(U256::from(255u32));
        let object = call_object(&call);
        assert_eq!(object["value"], "0xff");
        assert_eq!(object["data"], "0xabcd");
        assert!(object.get("from").is_some());
    }

    #[test]
    fn test_call_object_omits_zero_value() {
        let object = call_object(&ContractCall::new(Address::ZERO, Vec::<u8>::new()));
        assert!(object.get("value").is_none());
        assert!(object.get("from").is_none());
    }
}
