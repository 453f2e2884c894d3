//! Render pipeline: snapshot in, committed frames out.
//!
//! A render is staged on freshly allocated surfaces and a cloned color
//! registry, and only committed once every layer has been drawn. A failing
//! render therefore leaves the frames, snapshot, palette and focal index from
//! the previous successful render in place.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clusterviz_core::{DebugState, Snapshot};
use clusterviz_render::{
    Color, ColorRegistry, Layout, MatrixKind, RasterSurface, RenderError, Theme,
    render_matrix_overlay, render_scene,
};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::{ViewerConfig, ViewerError};

/// Surfaces produced by one successful render.
#[derive(Debug, Clone, PartialEq)]
pub struct Frames {
    pub scene: RasterSurface,
    /// Present only for affinity-propagation snapshots with at least one point.
    pub availability: Option<RasterSurface>,
    pub responsibility: Option<RasterSurface>,
}

impl Frames {
    pub fn overlay(&self, kind: MatrixKind) -> Option<&RasterSurface> {
        match kind {
            MatrixKind::Availability => self.availability.as_ref(),
            MatrixKind::Responsibility => self.responsibility.as_ref(),
        }
    }

    /// Write `scene.png` plus one PNG per present overlay into `dir`, and
    /// remove overlay files this render does not carry.
    ///
    /// Every layer is encoded and staged in a temporary file next to its
    /// target before any target is replaced, so a failure while staging leaves
    /// the previous round's files untouched.
    pub fn save(&self, dir: &Path) -> Result<Vec<PathBuf>, ViewerError> {
        let io_error = |path: &Path| {
            let path = path.to_path_buf();
            move |source: io::Error| ViewerError::Io { path, source }
        };
        fs::create_dir_all(dir).map_err(io_error(dir))?;

        let layers = std::iter::once(("scene", Some(&self.scene))).chain(
            MatrixKind::ALL
                .into_iter()
                .map(|kind| (kind.label(), self.overlay(kind))),
        );

        let mut staged = Vec::with_capacity(3);
        let mut stale = Vec::new();
        for (label, surface) in layers {
            let path = dir.join(format!("{label}.png"));
            let Some(surface) = surface else {
                stale.push(path);
                continue;
            };
            let bytes = surface.encode_png()?;
            let mut file = NamedTempFile::new_in(dir).map_err(io_error(dir))?;
            file.write_all(&bytes).map_err(io_error(file.path()))?;
            staged.push((file, path));
        }

        let mut written = Vec::with_capacity(staged.len());
        for (file, path) in staged {
            file.persist(&path).map_err(|err| ViewerError::Io {
                path: path.clone(),
                source: err.error,
            })?;
            written.push(path);
        }
        for path in stale {
            match fs::remove_file(&path) {
                Ok(()) => debug!(path = %path.display(), "removed stale overlay"),
                Err(err) if err.kind() == io::ErrorKind::NotFound => {}
                Err(source) => return Err(ViewerError::Io { path, source }),
            }
        }
        debug!(files = written.len(), dir = %dir.display(), "saved frames");
        Ok(written)
    }
}

/// Clamp a focal selection into `[0, point_count - 1]`.
pub fn clamp_focal(index: usize, point_count: usize) -> usize {
    index.min(point_count.saturating_sub(1))
}

/// Owns every piece of cross-snapshot state: palette, focal point, the last
/// rendered snapshot and its frames.
#[derive(Debug)]
pub struct RenderPipeline {
    registry: ColorRegistry,
    layout: Layout,
    theme: Theme,
    canvas: (u32, u32),
    focal_index: usize,
    snapshot: Option<Snapshot>,
    frames: Option<Frames>,
}

impl RenderPipeline {
    pub fn new(config: &ViewerConfig) -> Self {
        let registry = match config.palette_seed {
            Some(seed) => ColorRegistry::with_seed(seed),
            None => ColorRegistry::new(),
        };
        Self::with_registry(registry, config)
    }

    pub fn with_registry(registry: ColorRegistry, config: &ViewerConfig) -> Self {
        Self {
            registry,
            layout: config.layout,
            theme: config.theme,
            canvas: (config.canvas_width, config.canvas_height),
            focal_index: 0,
            snapshot: None,
            frames: None,
        }
    }

    /// Render `snapshot` and commit the result.
    pub fn render(&mut self, snapshot: Snapshot) -> Result<&Frames, RenderError> {
        snapshot.validate()?;
        self.layout.validate()?;

        let focal = clamp_focal(self.focal_index, snapshot.point_count());
        let mut registry = self.registry.clone();
        let colors = registry.reconcile(snapshot.cluster_count()).to_vec();

        let mut scene = self.blank_surface();
        render_scene(&mut scene, &snapshot, &colors, &self.layout, &self.theme)?;
        let availability = self.render_overlay(&snapshot, MatrixKind::Availability, focal)?;
        let responsibility = self.render_overlay(&snapshot, MatrixKind::Responsibility, focal)?;

        if matches!(snapshot.debug, DebugState::Unsupported) {
            warn!("snapshot carries an unsupported debug payload; drawing base scene only");
        }
        info!(
            points = snapshot.point_count(),
            clusters = snapshot.cluster_count(),
            debug = snapshot.debug.kind(),
            focal,
            palette_generation = registry.generation(),
            "rendered snapshot"
        );

        self.registry = registry;
        self.focal_index = focal;
        self.snapshot = Some(snapshot);
        let frames: &Frames = self.frames.insert(Frames {
            scene,
            availability,
            responsibility,
        });
        Ok(frames)
    }

    /// Select the focal point for the matrix overlays. The index is clamped to
    /// the current snapshot and only the overlays are redrawn. Before the first
    /// render the raw index is kept and clamped on the next render.
    pub fn set_focal_index(&mut self, index: usize) -> Result<usize, RenderError> {
        let Some(snapshot) = self.snapshot.as_ref() else {
            self.focal_index = index;
            return Ok(index);
        };

        let focal = clamp_focal(index, snapshot.point_count());
        let availability = self.render_overlay(snapshot, MatrixKind::Availability, focal)?;
        let responsibility = self.render_overlay(snapshot, MatrixKind::Responsibility, focal)?;

        if let Some(frames) = self.frames.as_mut() {
            frames.availability = availability;
            frames.responsibility = responsibility;
        }
        self.focal_index = focal;
        debug!(focal, "focal point updated");
        Ok(focal)
    }

    /// Move the focal point by `delta`, saturating at both ends.
    pub fn shift_focal(&mut self, delta: isize) -> Result<usize, RenderError> {
        self.set_focal_index(self.focal_index.saturating_add_signed(delta))
    }

    pub fn focal_index(&self) -> usize {
        self.focal_index
    }

    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.snapshot.as_ref()
    }

    pub fn frames(&self) -> Option<&Frames> {
        self.frames.as_ref()
    }

    /// Colors of the last committed render, index-aligned to its clusters.
    pub fn colors(&self) -> &[Color] {
        self.registry.colors()
    }

    pub fn palette_generation(&self) -> u64 {
        self.registry.generation()
    }

    fn blank_surface(&self) -> RasterSurface {
        RasterSurface::new(self.canvas.0, self.canvas.1)
    }

    fn render_overlay(
        &self,
        snapshot: &Snapshot,
        kind: MatrixKind,
        focal: usize,
    ) -> Result<Option<RasterSurface>, RenderError> {
        let Some(matrix) = kind.select(&snapshot.debug) else {
            return Ok(None);
        };
        if snapshot.points.is_empty() {
            return Ok(None);
        }
        let mut surface = self.blank_surface();
        render_matrix_overlay(
            &mut surface,
            &snapshot.points,
            matrix,
            focal,
            &self.layout,
            &self.theme,
        )?;
        Ok(Some(surface))
    }
}
