//! Polling client and render pipeline for the ClusterViz front end.

use std::path::PathBuf;

use clusterviz_render::RenderError;
use thiserror::Error;

pub mod client;
pub mod config;
pub mod pipeline;
pub mod terminal;
pub mod viewer;

pub use client::{ClientError, SimulationClient};
pub use config::{ConfigError, ViewerConfig};
pub use pipeline::{Frames, RenderPipeline};
pub use viewer::Viewer;

/// Errors surfaced to the UI layer by [`Viewer`].
#[derive(Debug, Error)]
pub enum ViewerError {
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("no snapshot has been rendered yet")]
    NothingRendered,
}
