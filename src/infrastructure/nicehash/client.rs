//! HTTP client for the provider stats API

use std::time::Duration;

use reqwest::Client;
use tracing::debug;

use super::envelope::{decode_response, METHOD_EX, METHOD_PAYMENTS};
use crate::core::ExportError;
use crate::domain::{AlgorithmHistory, Payment};

pub const DEFAULT_API_URL: &str = "https://api.nicehash.com/api";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Source of provider statistics
///
/// The export driver only talks to this trait, so runs can be driven from
/// canned data as well as from the live API.
#[async_trait::async_trait]
pub trait StatsSource: Send + Sync {
    /// Payments to `addr` with a timestamp at or after `since` (Unix seconds)
    async fn fetch_payments(&self, addr: &str, since: i64) -> Result<Vec<Payment>, ExportError>;

    /// Per-algorithm hashrate and balance history from `since` onward
    async fn fetch_algorithm_histories(
        &self,
        addr: &str,
        since: i64,
    ) -> Result<Vec<AlgorithmHistory>, ExportError>;
}

/// Live client issuing one GET per call, never retrying
#[derive(Debug, Clone)]
pub struct NiceHashClient {
    http: Client,
    base_url: String,
}

impl NiceHashClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ExportError> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("nhexport/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }

    /// GET the API with the given query, returning status and body text
    async fn get(&self, query: &[(&str, String)]) -> Result<(u16, String), ExportError> {
        debug!(url = %self.base_url, ?query, "requesting provider stats");

        let response = self.http.get(&self.base_url).query(query).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        debug!(status, bytes = body.len(), "received provider stats");
        Ok((status, body))
    }
}

#[async_trait::async_trait]
impl StatsSource for NiceHashClient {
    async fn fetch_payments(&self, addr: &str, since: i64) -> Result<Vec<Payment>, ExportError> {
        let query = [
            ("method", METHOD_PAYMENTS.to_string()),
            ("addr", addr.to_string()),
        ];
        let (status, body) = self.get(&query).await?;
        let stats = decode_response(status, &body, METHOD_PAYMENTS, addr)?;

        let total = stats.payments.len();
        let payments = stats.payments_since(since);
        debug!(total, kept = payments.len(), since, "filtered payments by start time");
        Ok(payments)
    }

    async fn fetch_algorithm_histories(
        &self,
        addr: &str,
        since: i64,
    ) -> Result<Vec<AlgorithmHistory>, ExportError> {
        let query = [
            ("method", METHOD_EX.to_string()),
            ("addr", addr.to_string()),
            ("from", since.to_string()),
        ];
        let (status, body) = self.get(&query).await?;
        decode_response(status, &body, METHOD_EX, addr)?.algorithm_histories()
    }
}
