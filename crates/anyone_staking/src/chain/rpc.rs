//! JSON-RPC `eth_call` transport with rate limiting and retries.

use crate::chain::query::{ChainQuery, ChainQueryError, ContractCall};
use alloy_dyn_abi::{DynSolValue, FunctionExt, JsonAbiExt};
use alloy_json_abi::{Function, Param};
use alloy_primitives::Address;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

const DEFAULT_RPC_URL: &str = "https://ethereum-rpc.publicnode.com";
const RATE_LIMIT_MS: u64 = 200;
const MAX_RETRIES: u32 = 3;
const RETRY_BACKOFF_MS: u64 = 500;
const TIMEOUT_SECS: u64 = 30;

#[derive(Clone, Debug)]
pub struct RpcConfig {
    pub rpc_url: String,
    pub rate_limit_ms: u64,
    pub max_retries: u32,
    pub retry_backoff_ms: u64,
    pub timeout_secs: u64,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            rpc_url: DEFAULT_RPC_URL.to_string(),
            rate_limit_ms: RATE_LIMIT_MS,
            max_retries: MAX_RETRIES,
            retry_backoff_ms: RETRY_BACKOFF_MS,
            timeout_secs: TIMEOUT_SECS,
        }
    }
}

#[derive(Deserialize)]
struct RpcResponse {
    result: Option<String>,
    error: Option<RpcErrorObject>,
}

#[derive(Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

/// HTTP JSON-RPC provider implementing [`ChainQuery`] via `eth_call` at `latest`.
pub struct JsonRpcProvider {
    config: RpcConfig,
    client: reqwest::Client,
    last_request: Mutex<Option<Instant>>,
    next_id: AtomicU64,
    request_count: AtomicU64,
}

impl JsonRpcProvider {
    pub fn new(config: RpcConfig) -> Result<Self, ChainQueryError> {
        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            config,
            client,
            last_request: Mutex::new(None),
            next_id: AtomicU64::new(1),
            request_count: AtomicU64::new(0),
        })
    }

    pub fn config(&self) -> &RpcConfig {
        &self.config
    }

    async fn rate_limit(&self) {
        let sleep_ms = {
            let last = self
                .last_request
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            match *last {
                Some(prev) => {
                    let elapsed = prev.elapsed().as_millis() as u64;
                    self.config.rate_limit_ms.saturating_sub(elapsed)
                }
                None => 0,
            }
        };
        if sleep_ms > 0 {
            tokio::time::sleep(Duration::from_millis(sleep_ms)).await;
        }
        *self
            .last_request
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(Instant::now());
    }

    async fn post_json(&self, body: &Value) -> Result<String, ChainQueryError> {
        self.rate_limit().await;

        let mut last_err = None;
        for attempt in 0..=self.config.max_retries {
            match self.client.post(&self.config.rpc_url).json(body).send().await {
                Ok(r) => {
                    let status = r.status();
                    let text = r.text().await.unwrap_or_default();
                    if !status.is_success() {
                        last_err = Some(ChainQueryError::Http(status.as_u16(), text));
                        if attempt < self.config.max_retries {
                            let ms = backoff_ms(self.config.retry_backoff_ms, attempt);
                            warn!(attempt, ms, status = status.as_u16(), "retry after http status");
                            tokio::time::sleep(Duration::from_millis(ms)).await;
                        }
                        continue;
                    }
                    self.request_count.fetch_add(1, Ordering::Relaxed);
                    return Ok(text);
                }
                Err(e) => {
                    last_err = Some(ChainQueryError::Request(e));
                    if attempt < self.config.max_retries {
                        let ms = backoff_ms(self.config.retry_backoff_ms, attempt);
                        warn!(attempt, ms, "retry after error");
                        tokio::time::sleep(Duration::from_millis(ms)).await;
                    }
                }
            }
        }
        Err(last_err.unwrap_or_else(|| ChainQueryError::Transport("no attempts made".to_string())))
    }

    /// Raw `eth_call`; returns the undecoded return data.
    pub async fn eth_call(&self, to: Address, data: &[u8]) -> Result<Vec<u8>, ChainQueryError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = eth_call_body(id, to, data);
        let text = self.post_json(&body).await?;
        parse_eth_call_response(&text)
    }

    pub fn request_count(&self) -> u64 {
        self.request_count.load(Ordering::Relaxed)
    }
}

impl ChainQuery for JsonRpcProvider {
    async fn call(&self, call: &ContractCall) -> Result<Vec<Value>, ChainQueryError> {
        let data = call
            .function
            .abi_encode_input(&call.args)
            .map_err(|e| ChainQueryError::Abi(e.to_string()))?;
        debug!(contract = %call.contract, function = %call.signature(), "eth_call");
        let output = self.eth_call(call.contract, &data).await?;
        decode_output(&call.function, &output)
    }
}

/// `base * 2^attempt`, saturating at `u64::MAX`.
fn backoff_ms(base: u64, attempt: u32) -> u64 {
    base.saturating_mul(1u64.checked_shl(attempt).unwrap_or(u64::MAX))
}

fn eth_call_body(id: u64, to: Address, data: &[u8]) -> Value {
    serde_json::json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": "eth_call",
        "params": [
            { "to": to.to_checksum(None), "data": format!("0x{}", hex::encode(data)) },
            "latest"
        ]
    })
}

fn parse_eth_call_response(text: &str) -> Result<Vec<u8>, ChainQueryError> {
    let resp: RpcResponse = serde_json::from_str(text)
        .map_err(|e| ChainQueryError::BadResponse(format!("parse: {}", e)))?;
    if let Some(err) = resp.error {
        return Err(ChainQueryError::Rpc {
            code: err.code,
            message: err.message,
        });
    }
    let result = resp
        .result
        .ok_or_else(|| ChainQueryError::BadResponse("missing result".to_string()))?;
    let digits = result.strip_prefix("0x").unwrap_or(&result);
    hex::decode(digits).map_err(|e| ChainQueryError::BadResponse(format!("hex: {}", e)))
}

/// Decode ABI return data into JSON values, one per declared output.
pub fn decode_output(function: &Function, data: &[u8]) -> Result<Vec<Value>, ChainQueryError> {
    let values = function
        .abi_decode_output(data, true)
        .map_err(|e| ChainQueryError::Abi(e.to_string()))?;
    Ok(values
        .iter()
        .zip(&function.outputs)
        .map(|(v, p)| to_json(v, &p.components))
        .collect())
}

fn to_json(value: &DynSolValue, components: &[Param]) -> Value {
    match value {
        DynSolValue::Address(a) => Value::String(a.to_checksum(None)),
        DynSolValue::Uint(u, _) => Value::String(u.to_string()),
        DynSolValue::Int(i, _) => Value::String(i.to_string()),
        DynSolValue::Bool(b) => Value::Bool(*b),
        DynSolValue::String(s) => Value::String(s.clone()),
        DynSolValue::Bytes(b) => Value::String(format!("0x{}", hex::encode(b))),
        DynSolValue::FixedBytes(word, size) => {
            Value::String(format!("0x{}", hex::encode(&word[..*size])))
        }
        // Array elements share the tuple components of their parent param.
        DynSolValue::Array(items) | DynSolValue::FixedArray(items) => {
            Value::Array(items.iter().map(|i| to_json(i, components)).collect())
        }
        DynSolValue::Tuple(items) => {
            let mut map = Map::new();
            for (idx, item) in items.iter().enumerate() {
                let param = components.get(idx);
                let nested = param.map(|p| p.components.as_slice()).unwrap_or(&[]);
                let v = to_json(item, nested);
                if let Some(p) = param.filter(|p| !p.name.is_empty()) {
                    map.insert(p.name.clone(), v.clone());
                }
                map.insert(idx.to_string(), v);
            }
            Value::Object(map)
        }
        _ => Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::staking::get_stakes_function as stakes_function;
    use alloy_primitives::U256;

    #[test]
    fn decode_named_tuple_array() {
        let operator = Address::repeat_byte(0x11);
        let encoded = DynSolValue::Tuple(vec![DynSolValue::Array(vec![DynSolValue::Tuple(
            vec![
                DynSolValue::Address(operator),
                DynSolValue::Uint(U256::from(100u64), 256),
            ],
        )])])
        .abi_encode_params();

        let out = decode_output(&stakes_function(), &encoded).unwrap();
        assert_eq!(out.len(), 1);
        let stakes = out[0].as_array().unwrap();
        assert_eq!(stakes.len(), 1);
        let checksum = operator.to_checksum(None);
        assert_eq!(stakes[0]["operator"], Value::String(checksum.clone()));
        assert_eq!(stakes[0]["0"], Value::String(checksum));
        assert_eq!(stakes[0]["amount"], Value::String("100".to_string()));
        assert_eq!(stakes[0]["1"], Value::String("100".to_string()));
    }

    #[test]
    fn decode_garbage_is_abi_error() {
        let err = decode_output(&stakes_function(), &[0x01, 0x02]).unwrap_err();
        assert!(matches!(err, ChainQueryError::Abi(_)));
    }

    #[test]
    fn selector_matches_signature() {
        let f = stakes_function();
        assert_eq!(f.signature(), "getStakes(address)");
        let data = f
            .abi_encode_input(&[DynSolValue::Address(Address::ZERO)])
            .unwrap();
        assert_eq!(data.len(), 4 + 32);
        assert_eq!(&data[..4], f.selector().as_slice());
    }

    #[test]
    fn eth_call_body_shape() {
        let to = Address::repeat_byte(0xab);
        let body = eth_call_body(7, to, &[0xde, 0xad]);
        assert_eq!(body["method"], "eth_call");
        assert_eq!(body["id"], 7);
        assert_eq!(body["params"][0]["data"], "0xdead");
        assert_eq!(body["params"][0]["to"], to.to_checksum(None));
        assert_eq!(body["params"][1], "latest");
    }

    #[test]
    fn parse_response_result_and_error() {
        let ok = parse_eth_call_response(r#"{"jsonrpc":"2.0","id":1,"result":"0x0102"}"#).unwrap();
        assert_eq!(ok, vec![1, 2]);

        let err = parse_eth_call_response(
            r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32000,"message":"execution reverted"}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, ChainQueryError::Rpc { code: -32000, .. }));

        let missing = parse_eth_call_response(r#"{"jsonrpc":"2.0","id":1}"#).unwrap_err();
        assert!(matches!(missing, ChainQueryError::BadResponse(_)));
    }

    #[test]
    fn backoff_doubles_and_saturates() {
        assert_eq!(backoff_ms(500, 0), 500);
        assert_eq!(backoff_ms(500, 3), 4000);
        assert_eq!(backoff_ms(500, 64), u64::MAX);
        assert_eq!(backoff_ms(u64::MAX / 2, 2), u64::MAX);
        assert_eq!(backoff_ms(0, 100), 0);
    }

    #[test]
    fn default_config() {
        let c = RpcConfig::default();
        assert_eq!(c.max_retries, 3);
        assert!(c.rpc_url.starts_with("https://"));
    }
}
