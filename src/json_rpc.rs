use serde::Serialize;
use serde_json::Value;

use crate::rpc_client::UpstreamError;

const DEFAULT_JSON_RPC_VERSION: &str = "2.0";

#[derive(Serialize, Debug, Clone)]
pub struct JsonRpcRequest<'a> {
    pub jsonrpc: &'static str,
    pub id: u64,
    pub method: &'a str,
    pub params: Value,
}

impl<'a> JsonRpcRequest<'a> {
    pub fn new(id: u64, method: &'a str, params: Value) -> Self {
        Self {
            jsonrpc: DEFAULT_JSON_RPC_VERSION,
            id,
            method,
            params,
        }
    }
}

/// Unwraps a decoded JSON-RPC response body into its `result`.
///
/// Any `error` member, `null` included, wins over `result` and is handed back
/// verbatim. A body that is not an object, or that carries no usable
/// `result`, is malformed.
pub fn extract_result(response: Value) -> Result<Value, UpstreamError> {
    let Value::Object(mut response) = response else {
        return Err(UpstreamError::MalformedResponse);
    };

    if let Some(error) = response.remove("error") {
        return Err(UpstreamError::Rpc(error));
    }

    match response.remove("result") {
        None | Some(Value::Null) => Err(UpstreamError::MalformedResponse),
        Some(result) => Ok(result),
    }
}
