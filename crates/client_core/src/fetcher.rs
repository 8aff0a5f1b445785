//! Typed calls against the benchmark HTTP API.
//!
//! Fetchers never touch the stores; callers decide what to do with results.

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use shared::{
    domain::{ExperimentId, RunId},
    error::ErrorBody,
    protocol::{CreateExperimentRequest, Experiment, HealthResponse, Run},
};
use tracing::debug;
use url::Url;

use crate::error::FetchError;

#[async_trait]
pub trait DataFetcher: Send + Sync {
    async fn list_experiments(&self) -> Result<Vec<Experiment>, FetchError>;
    async fn list_runs(&self, experiment_id: ExperimentId) -> Result<Vec<Run>, FetchError>;
    async fn create_experiment(
        &self,
        request: &CreateExperimentRequest,
    ) -> Result<Experiment, FetchError>;
    async fn trigger_run(&self, experiment_id: ExperimentId) -> Result<Run, FetchError>;
    async fn get_run(&self, run_id: RunId) -> Result<Run, FetchError>;
    async fn health(&self) -> Result<HealthResponse, FetchError>;
}

/// Required-field check applied before a create request is sent.
pub fn validate_create_request(request: &CreateExperimentRequest) -> Result<(), FetchError> {
    if request.name.trim().is_empty() {
        return Err(FetchError::Validation("experiment name is required".into()));
    }
    Ok(())
}

/// Appends path segments to `base`, keeping any path prefix it already has.
pub fn api_url(base: &Url, segments: &[&str]) -> Url {
    let mut url = base.clone();
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(segments);
    }
    url
}

pub fn report_url(base: &Url, experiment_id: ExperimentId) -> Url {
    api_url(base, &["api", "v1", "reports", &experiment_id.to_string()])
}

pub struct HttpDataFetcher {
    http: Client,
    base_url: Url,
}

impl HttpDataFetcher {
    pub fn new(base_url: &str) -> Result<Self, FetchError> {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: &str) -> Result<Self, FetchError> {
        let base_url = Url::parse(base_url.trim())
            .map_err(|e| FetchError::Validation(format!("invalid server url '{base_url}': {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(FetchError::Validation(format!(
                "server url '{base_url}' cannot carry a path"
            )));
        }
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        api_url(&self.base_url, segments)
    }
}

#[async_trait]
impl DataFetcher for HttpDataFetcher {
    async fn list_experiments(&self) -> Result<Vec<Experiment>, FetchError> {
        let url = self.endpoint(&["api", "v1", "experiments"]);
        debug!(%url, "fetch: list experiments");
        decode(self.http.get(url).send().await).await
    }

    async fn list_runs(&self, experiment_id: ExperimentId) -> Result<Vec<Run>, FetchError> {
        let url = self.endpoint(&["api", "v1", "runs"]);
        debug!(%url, experiment_id = %experiment_id, "fetch: list runs");
        decode(
            self.http
                .get(url)
                .query(&[("experiment_id", experiment_id.to_string())])
                .send()
                .await,
        )
        .await
    }

    async fn create_experiment(
        &self,
        request: &CreateExperimentRequest,
    ) -> Result<Experiment, FetchError> {
        validate_create_request(request)?;
        let url = self.endpoint(&["api", "v1", "experiments"]);
        debug!(%url, name = %request.name, "fetch: create experiment");
        decode(self.http.post(url).json(request).send().await).await
    }

    async fn trigger_run(&self, experiment_id: ExperimentId) -> Result<Run, FetchError> {
        let url = self.endpoint(&["api", "v1", "experiments", &experiment_id.to_string(), "runs"]);
        debug!(%url, experiment_id = %experiment_id, "fetch: trigger run");
        decode(self.http.post(url).send().await).await
    }

    async fn get_run(&self, run_id: RunId) -> Result<Run, FetchError> {
        let url = self.endpoint(&["api", "v1", "runs", &run_id.to_string()]);
        debug!(%url, run_id = %run_id, "fetch: get run");
        decode(self.http.get(url).send().await).await
    }

    async fn health(&self) -> Result<HealthResponse, FetchError> {
        let url = self.endpoint(&["api", "health"]);
        decode(self.http.get(url).send().await).await
    }
}

async fn decode<T: DeserializeOwned>(sent: reqwest::Result<Response>) -> Result<T, FetchError> {
    let response = sent.map_err(|e| FetchError::Network(e.to_string()))?;
    let status = response.status();
    let body = response
        .bytes()
        .await
        .map_err(|e| FetchError::Network(e.to_string()))?;

    if !status.is_success() {
        let message = serde_json::from_slice::<ErrorBody>(&body)
            .map(|error| error.message())
            .unwrap_or_else(|_| String::from_utf8_lossy(&body).trim().to_string());
        let message = if message.is_empty() {
            status.canonical_reason().unwrap_or("unknown status").to_string()
        } else {
            message
        };
        return Err(FetchError::Server {
            status: status.as_u16(),
            message,
        });
    }

    serde_json::from_slice(&body).map_err(|e| FetchError::Malformed(e.to_string()))
}

#[cfg(test)]
#[path = "tests/fetcher_tests.rs"]
mod tests;
