//! Request shaping for the simulation's REST-ish control surface.

use std::num::NonZeroU32;

use clusterviz_core::{
    AlgorithmId, AlgorithmInfo, AlgorithmParams, ResetParams, Snapshot, SnapshotError,
};
use reqwest::{Client, Response, StatusCode, Url};
use thiserror::Error;
use tracing::{debug, info};

const NO_PARAMS: [(&str, &str); 0] = [];

/// Failures talking to the simulation. None of them are retried here.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("failed to build HTTP client: {0}")]
    Http(#[source] reqwest::Error),
    #[error("invalid simulation URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("request to {endpoint} failed: {source}")]
    Request {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{endpoint} responded with {status}: {body}")]
    Status {
        endpoint: &'static str,
        status: StatusCode,
        body: String,
    },
    #[error("malformed snapshot: {0}")]
    MalformedSnapshot(#[from] SnapshotError),
    #[error("could not decode {endpoint} response: {source}")]
    Decode {
        endpoint: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Thin async wrapper around the simulation endpoints.
#[derive(Debug, Clone)]
pub struct SimulationClient {
    http: Client,
    base_url: String,
}

impl SimulationClient {
    pub const DATA: &'static str = "/data";
    pub const NEXT: &'static str = "/next";
    pub const RESET: &'static str = "/reset";
    pub const CLUSTERERS: &'static str = "/clusterers";
    pub const SET_CLUSTERER: &'static str = "/set_clusterer";

    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let http = Client::builder().build().map_err(ClientError::Http)?;
        Self::with_http(http, base_url)
    }

    /// Use a preconfigured HTTP client (proxies, TLS roots, ...).
    pub fn with_http(http: Client, base_url: &str) -> Result<Self, ClientError> {
        let base_url = base_url.trim_end_matches('/').to_string();
        Url::parse(&base_url).map_err(|err| ClientError::InvalidUrl {
            url: base_url.clone(),
            reason: err.to_string(),
        })?;
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for `endpoint` with `params` appended as a query string.
    pub fn endpoint_url<'a, I>(&self, endpoint: &'static str, params: I) -> Result<Url, ClientError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let raw = format!("{}{endpoint}", self.base_url);
        let mut url = Url::parse(&raw).map_err(|err| ClientError::InvalidUrl {
            url: raw.clone(),
            reason: err.to_string(),
        })?;
        let mut params = params.into_iter().peekable();
        if params.peek().is_some() {
            url.query_pairs_mut().extend_pairs(params);
        }
        Ok(url)
    }

    /// Fetch and validate the full simulation state.
    pub async fn fetch_snapshot(&self) -> Result<Snapshot, ClientError> {
        let response = self.get(Self::DATA, NO_PARAMS).await?;
        let body = response.bytes().await.map_err(|source| ClientError::Request {
            endpoint: Self::DATA,
            source,
        })?;
        let snapshot = Snapshot::from_json(&body)?;
        debug!(
            points = snapshot.point_count(),
            clusters = snapshot.cluster_count(),
            debug = snapshot.debug.kind(),
            "fetched snapshot"
        );
        Ok(snapshot)
    }

    /// Advance the simulation by `steps`, one request per step. Each request
    /// completes before the next is sent; a failure stops the sequence.
    pub async fn advance(&self, steps: NonZeroU32) -> Result<(), ClientError> {
        let total = steps.get();
        for step in 1..=total {
            self.get(Self::NEXT, NO_PARAMS).await?;
            debug!(step, total, "advanced simulation");
        }
        info!(steps = total, "simulation advanced");
        Ok(())
    }

    pub async fn reset(&self, params: &ResetParams) -> Result<(), ClientError> {
        let pairs = params.query_pairs();
        self.get(Self::RESET, pairs.iter().map(|(k, v)| (*k, v.as_str())))
            .await?;
        info!(
            num_elems = params.num_elems(),
            num_clusters = params.num_clusters(),
            cluster_radius = params.cluster_radius(),
            "simulation reset"
        );
        Ok(())
    }

    pub async fn list_algorithms(&self) -> Result<Vec<AlgorithmInfo>, ClientError> {
        let response = self.get(Self::CLUSTERERS, NO_PARAMS).await?;
        let body = response.bytes().await.map_err(|source| ClientError::Request {
            endpoint: Self::CLUSTERERS,
            source,
        })?;
        serde_json::from_slice(&body).map_err(|source| ClientError::Decode {
            endpoint: Self::CLUSTERERS,
            source,
        })
    }

    pub async fn select_algorithm(
        &self,
        id: &AlgorithmId,
        params: &AlgorithmParams,
    ) -> Result<(), ClientError> {
        let query = std::iter::once(("id", id.as_str())).chain(params.iter());
        self.get(Self::SET_CLUSTERER, query).await?;
        info!(%id, "selected clusterer");
        Ok(())
    }

    async fn get<'a, I>(&self, endpoint: &'static str, params: I) -> Result<Response, ClientError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let url = self.endpoint_url(endpoint, params)?;
        debug!(%url, "sending request");
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|source| ClientError::Request { endpoint, source })?;

        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unavailable>".to_string());
            Err(ClientError::Status {
                endpoint,
                status,
                body,
            })
        }
    }
}
