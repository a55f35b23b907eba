use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use url::Url;

use crate::args::Args;

pub const INFURA_MAINNET_URL_PREFIX: &str = "https://mainnet.infura.io/v3/";

/// Settings resolved once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub rpc_url: Url,
    pub cache_ttl: Duration,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing INFURA_PROJECT_ID or INFURA_URL")]
    MissingRpcEndpoint,

    #[error("Invalid RPC URL: {0}")]
    InvalidRpcUrl(#[from] url::ParseError),
}

impl Config {
    pub fn from_args(args: &Args) -> Result<Self, ConfigError> {
        let rpc_url = resolve_rpc_url(
            args.infura_url.as_deref(),
            args.infura_project_id.as_deref(),
        )?;

        Ok(Self {
            rpc_url,
            cache_ttl: Duration::from_secs(args.cache_ttl_seconds),
        })
    }
}

/// A missing `.env` file is fine, the environment may already be set. One
/// that exists but cannot be read or parsed is fatal.
pub fn load_env_file(
    loaded: Result<PathBuf, dotenvy::Error>,
) -> anyhow::Result<Option<PathBuf>> {
    match loaded {
        Ok(path) => Ok(Some(path)),
        Err(err) if err.not_found() => Ok(None),
        Err(err) => Err(err).context("fail to load .env file"),
    }
}

fn resolve_rpc_url(direct_url: Option<&str>, project_id: Option<&str>) -> Result<Url, ConfigError> {
    if let Some(direct_url) = direct_url.filter(|s| !s.is_empty()) {
        return Ok(Url::parse(direct_url)?);
    }

    match project_id.filter(|s| !s.is_empty()) {
        Some(project_id) => Ok(Url::parse(&format!("{INFURA_MAINNET_URL_PREFIX}{project_id}"))?),
        None => Err(ConfigError::MissingRpcEndpoint),
    }
}
