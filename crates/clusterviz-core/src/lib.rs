//! Snapshot data model shared by the ClusterViz client crates.
//!
//! A [`Snapshot`] is one wholesale state transfer from the remote clustering
//! simulation: the point cloud, the current cluster assignment, and an
//! algorithm-specific debug payload. Snapshots are never patched in place; every
//! fetch replaces the previous one.

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

pub mod params;

pub use params::{AlgorithmId, AlgorithmInfo, AlgorithmParams, ParamError, ResetParams};

/// Index of a point within [`Snapshot::points`].
pub type PointId = usize;

/// Member point ids of a single cluster.
pub type Cluster = Vec<PointId>;

/// A coordinate in simulation space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Algorithm-specific debug payload attached to a snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DebugState {
    #[default]
    None,
    /// One centroid per cluster index.
    KMeans { means: Vec<Point> },
    /// Affinity propagation score matrices, row-major `N * N`.
    Ap {
        availability: Vec<f64>,
        responsibility: Vec<f64>,
    },
    /// A debug tag this client does not know how to draw.
    #[serde(other)]
    Unsupported,
}

impl DebugState {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::KMeans { .. } => "k_means",
            Self::Ap { .. } => "ap",
            Self::Unsupported => "unsupported",
        }
    }
}

/// Full simulation state returned by the `/data` endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub points: Vec<Point>,
    pub clusters: Vec<Cluster>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub debug: DebugState,
}

/// Reasons a decoded snapshot cannot be drawn.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot JSON could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("cluster {cluster} references point {point_id}, but the snapshot holds {point_count} points")]
    MemberOutOfRange {
        cluster: usize,
        point_id: PointId,
        point_count: usize,
    },
    #[error("k-means debug carries {means} centroids for {clusters} clusters")]
    CentroidCountMismatch { means: usize, clusters: usize },
    #[error("{matrix} matrix holds {actual} entries, expected {expected} for {point_count} points")]
    MatrixShape {
        matrix: &'static str,
        actual: usize,
        expected: usize,
        point_count: usize,
    },
}

impl Snapshot {
    /// Decode a snapshot from JSON and check its invariants.
    pub fn from_json(bytes: &[u8]) -> Result<Self, SnapshotError> {
        let snapshot: Snapshot = serde_json::from_slice(bytes)?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    #[inline]
    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn cluster_count(&self) -> usize {
        self.clusters.len()
    }

    /// Check every cross-field invariant so renderers can index without bounds
    /// surprises.
    pub fn validate(&self) -> Result<(), SnapshotError> {
        let point_count = self.points.len();
        for (cluster, members) in self.clusters.iter().enumerate() {
            if let Some(&point_id) = members.iter().find(|&&id| id >= point_count) {
                return Err(SnapshotError::MemberOutOfRange {
                    cluster,
                    point_id,
                    point_count,
                });
            }
        }

        match &self.debug {
            DebugState::KMeans { means } => {
                if means.len() != self.clusters.len() {
                    return Err(SnapshotError::CentroidCountMismatch {
                        means: means.len(),
                        clusters: self.clusters.len(),
                    });
                }
            }
            DebugState::Ap {
                availability,
                responsibility,
            } => {
                check_matrix("availability", availability, point_count)?;
                check_matrix("responsibility", responsibility, point_count)?;
            }
            DebugState::None | DebugState::Unsupported => {}
        }
        Ok(())
    }
}

fn check_matrix(
    matrix: &'static str,
    values: &[f64],
    point_count: usize,
) -> Result<(), SnapshotError> {
    // usize overflow here means the row count can never match anyway.
    let expected = point_count.saturating_mul(point_count);
    if values.len() != expected {
        return Err(SnapshotError::MatrixShape {
            matrix,
            actual: values.len(),
            expected,
            point_count,
        });
    }
    Ok(())
}

fn null_as_default<'de, D>(deserializer: D) -> Result<DebugState, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<DebugState>::deserialize(deserializer)?.unwrap_or_default())
}
