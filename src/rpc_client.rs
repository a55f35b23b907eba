use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use serde_json::Value;
use url::Url;

use crate::json_rpc::{self, JsonRpcRequest};

pub const RPC_TIMEOUT: Duration = Duration::from_secs(8);

#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    /// The provider answered with a JSON-RPC `error` member.
    #[error("upstream rpc error: {0}")]
    Rpc(Value),

    #[error("bad upstream response")]
    MalformedResponse,

    #[error("fail to reach upstream: {0:#}")]
    Transport(anyhow::Error),
}

#[async_trait]
pub trait RpcTransport: Send + Sync {
    async fn call(&self, method: &str, params: Value, id: u64) -> Result<Value, UpstreamError>;
}

pub struct HttpRpcClient {
    client: reqwest::Client,
    rpc_url: Url,
}

impl HttpRpcClient {
    pub fn new(rpc_url: Url, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("fail to build http client")?;

        Ok(Self { client, rpc_url })
    }

    async fn do_rpc_request(&self, request: &JsonRpcRequest<'_>) -> anyhow::Result<Value> {
        let result = self
            .client
            .post(self.rpc_url.clone())
            .json(request)
            .send()
            .await?
            .json::<Value>()
            .await?;

        Ok(result)
    }
}

#[async_trait]
impl RpcTransport for HttpRpcClient {
    async fn call(&self, method: &str, params: Value, id: u64) -> Result<Value, UpstreamError> {
        let request = JsonRpcRequest::new(id, method, params);

        let response = self
            .do_rpc_request(&request)
            .await
            .map_err(UpstreamError::Transport)?;

        json_rpc::extract_result(response)
    }
}
