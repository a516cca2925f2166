//! HTTP refresh collaborator.
//!
//! One endpoint matters to the core: `GET /api/tokens`, whose response
//! replaces the token mirror wholesale. The per-token history endpoint is
//! exposed for chart presentation but treated as opaque here.

use crate::{
    error::ClientError,
    token::{HistoryResponse, TokenRecord, TokensResponse},
};
use tracing::debug;

/// Thin reqwest wrapper around the scanner REST API.
#[derive(Debug, Clone)]
pub struct RestClient {
    http: reqwest::Client,
    api_url: String,
}

impl RestClient {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url: api_url.into(),
        }
    }

    fn tokens_url(&self) -> String {
        format!("{}/api/tokens", self.api_url.trim_end_matches('/'))
    }

    fn history_url(&self, address: &str) -> String {
        format!(
            "{}/api/tokens/{}/history",
            self.api_url.trim_end_matches('/'),
            address
        )
    }

    /// Fetch the authoritative full token collection.
    ///
    /// Any failure (transport, non-2xx status, malformed body) surfaces as
    /// [`ClientError::Refresh`]; the caller keeps its previous collection.
    pub async fn fetch_tokens(&self) -> Result<Vec<TokenRecord>, ClientError> {
        let url = self.tokens_url();
        debug!(%url, "refreshing token collection");

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|error| ClientError::Refresh(error.to_string()))?;

        if !response.status().is_success() {
            return Err(ClientError::Refresh(format!(
                "unexpected status {}",
                response.status()
            )));
        }

        let body: TokensResponse = response
            .json()
            .await
            .map_err(|error| ClientError::Refresh(error.to_string()))?;

        debug!(count = body.tokens.len(), "token collection refreshed");
        Ok(body.tokens)
    }

    /// Fetch the liquidity/holder history for one token. Opaque to the core;
    /// consumed by chart presentation.
    pub async fn fetch_history(&self, address: &str) -> Result<HistoryResponse, ClientError> {
        let url = self.history_url(address);

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|error| ClientError::Refresh(error.to_string()))?;

        if !response.status().is_success() {
            return Err(ClientError::Refresh(format!(
                "unexpected status {}",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|error| ClientError::Refresh(error.to_string()))
    }
}
