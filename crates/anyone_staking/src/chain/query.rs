//! Read-only contract query capability consumed by the staking pipeline.

use alloy_dyn_abi::DynSolValue;
use alloy_json_abi::Function;
use alloy_primitives::Address;
use serde_json::Value;
use std::future::Future;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChainQueryError {
    #[error("request: {0}")]
    Request(#[from] reqwest::Error),
    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },
    #[error("http status {0} body {1}")]
    Http(u16, String),
    #[error("abi: {0}")]
    Abi(String),
    #[error("bad response: {0}")]
    BadResponse(String),
    #[error("transport: {0}")]
    Transport(String),
}

/// One read-only call against a contract: target, function ABI and arguments.
#[derive(Clone, Debug)]
pub struct ContractCall {
    pub contract: Address,
    pub function: Function,
    pub args: Vec<DynSolValue>,
}

impl ContractCall {
    /// Canonical signature, e.g. `getStakes(address)`.
    pub fn signature(&self) -> String {
        self.function.signature()
    }
}

/// Injected chain-query capability.
///
/// Implementations perform the call and return the decoded outputs, one JSON value
/// per declared output. Tuples come back as objects keyed by component name and by
/// positional index; addresses as checksummed strings; integers as decimal strings.
/// Timeouts, retries and cancellation belong to the implementation.
pub trait ChainQuery: Send + Sync {
    fn call(
        &self,
        call: &ContractCall,
    ) -> impl Future<Output = Result<Vec<Value>, ChainQueryError>> + Send;
}
