use std::num::NonZeroU32;
use std::path::{Path, PathBuf};

use clusterviz_core::{AlgorithmId, AlgorithmInfo, AlgorithmParams, ResetParams};
use tracing::warn;

use crate::{ClientError, Frames, RenderPipeline, SimulationClient, ViewerConfig, ViewerError};

/// Couples the simulation client with the render pipeline. Every mutating
/// request is followed by a fresh `/data` fetch and a render, so callers always
/// see the state the server settled on.
///
/// All entry points take `&mut self`: a second action cannot start while a
/// render is in flight, so requests and renders are strictly serialized.
#[derive(Debug)]
pub struct Viewer {
    client: SimulationClient,
    pipeline: RenderPipeline,
}

impl Viewer {
    pub fn new(config: &ViewerConfig) -> Result<Self, ClientError> {
        let client = SimulationClient::new(&config.base_url)?;
        Ok(Self::from_parts(client, RenderPipeline::new(config)))
    }

    pub fn from_parts(client: SimulationClient, pipeline: RenderPipeline) -> Self {
        Self { client, pipeline }
    }

    /// Fetch the current snapshot and render it. On failure the previously
    /// rendered frames stay in place.
    pub async fn refresh(&mut self) -> Result<&Frames, ViewerError> {
        let snapshot = match self.client.fetch_snapshot().await {
            Ok(snapshot) => snapshot,
            Err(err) => {
                warn!(error = %err, "snapshot fetch failed; keeping previous frames");
                return Err(err.into());
            }
        };
        Ok(self.pipeline.render(snapshot)?)
    }

    pub async fn advance(&mut self, steps: NonZeroU32) -> Result<&Frames, ViewerError> {
        self.client.advance(steps).await?;
        self.refresh().await
    }

    pub async fn reset(&mut self, params: &ResetParams) -> Result<&Frames, ViewerError> {
        self.client.reset(params).await?;
        self.refresh().await
    }

    pub async fn select_algorithm(
        &mut self,
        id: &AlgorithmId,
        params: &AlgorithmParams,
    ) -> Result<&Frames, ViewerError> {
        self.client.select_algorithm(id, params).await?;
        self.refresh().await
    }

    pub async fn list_algorithms(&self) -> Result<Vec<AlgorithmInfo>, ViewerError> {
        Ok(self.client.list_algorithms().await?)
    }

    pub fn set_focal_index(&mut self, index: usize) -> Result<usize, ViewerError> {
        Ok(self.pipeline.set_focal_index(index)?)
    }

    pub fn shift_focal(&mut self, delta: isize) -> Result<usize, ViewerError> {
        Ok(self.pipeline.shift_focal(delta)?)
    }

    pub fn pipeline(&self) -> &RenderPipeline {
        &self.pipeline
    }

    pub fn client(&self) -> &SimulationClient {
        &self.client
    }

    /// Write the last committed frames into `dir`.
    pub fn save_frames(&self, dir: &Path) -> Result<Vec<PathBuf>, ViewerError> {
        self.pipeline
            .frames()
            .ok_or(ViewerError::NothingRendered)?
            .save(dir)
    }
}
