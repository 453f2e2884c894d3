//! Parameter types for the simulation control requests.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Errors raised while building control parameters.
#[derive(Debug, Error, PartialEq)]
pub enum ParamError {
    #[error("{name} must be a positive integer")]
    NotPositive { name: &'static str },
    #[error("{name} must be a positive finite number, got {value}")]
    NotPositiveFinite { name: &'static str, value: f64 },
}

/// Arguments for regenerating the simulated point cloud.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ResetParams {
    num_elems: u32,
    num_clusters: u32,
    cluster_radius: f64,
}

impl ResetParams {
    pub fn new(num_elems: u32, num_clusters: u32, cluster_radius: f64) -> Result<Self, ParamError> {
        if num_elems == 0 {
            return Err(ParamError::NotPositive { name: "num_elems" });
        }
        if num_clusters == 0 {
            return Err(ParamError::NotPositive {
                name: "num_clusters",
            });
        }
        if !cluster_radius.is_finite() || cluster_radius <= 0.0 {
            return Err(ParamError::NotPositiveFinite {
                name: "cluster_radius",
                value: cluster_radius,
            });
        }
        Ok(Self {
            num_elems,
            num_clusters,
            cluster_radius,
        })
    }

    pub fn num_elems(&self) -> u32 {
        self.num_elems
    }

    pub fn num_clusters(&self) -> u32 {
        self.num_clusters
    }

    pub fn cluster_radius(&self) -> f64 {
        self.cluster_radius
    }

    /// Query pairs in the order the `/reset` endpoint documents them.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("num_elems", self.num_elems.to_string()),
            ("num_clusters", self.num_clusters.to_string()),
            ("cluster_radius", self.cluster_radius.to_string()),
        ]
    }
}

/// Server-assigned clusterer identifier. The server may encode it as a JSON
/// number or string; it is carried as text either way.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct AlgorithmId(String);

impl AlgorithmId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AlgorithmId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for AlgorithmId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Integer(i64),
            Text(String),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Integer(value) => Self(value.to_string()),
            RawId::Text(value) => Self(value),
        })
    }
}

/// Entry of the `/clusterers` listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlgorithmInfo {
    pub id: AlgorithmId,
    pub name: String,
}

/// Algorithm-specific settings forwarded verbatim to `/set_clusterer`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AlgorithmParams(BTreeMap<String, String>);

impl AlgorithmParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an arbitrary key; the value is sent without validation.
    pub fn with(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.0.insert(key.into(), value.to_string());
        self
    }

    pub fn num_means(self, value: impl ToString) -> Self {
        self.with("num_means", value)
    }

    pub fn eps(self, value: impl ToString) -> Self {
        self.with("eps", value)
    }

    pub fn min_pts(self, value: impl ToString) -> Self {
        self.with("min_pts", value)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
