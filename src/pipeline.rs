//! Top-level orchestration of one visualization sweep.

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod pipeline_test;

use crate::errors::*;
use crate::plot::{GridComposer, RenderContext};
use crate::sampler;
use crate::settings::{FieldSpec, Settings};
use crate::snapshot::Snapshot;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Runs the sweep for an ordered list of field keys.
///
/// The field registry is fixed and checked when the pipeline is built;
/// render time never discovers keys or ranks on its own. One frame sample
/// serves all field keys of a run.
pub struct EvolutionPipeline {
    registry: Vec<FieldSpec>,
    total_frames: usize,
    ctx: RenderContext,
    snapshot_dir: PathBuf,
    output_dir: PathBuf,
}

impl EvolutionPipeline {
    pub fn new(
        settings: &Settings,
        snapshot_dir: &Path,
        output_dir: &Path,
    ) -> Result<EvolutionPipeline> {
        if settings.fields.is_empty() {
            bail!("no field specifications in the parameter file");
        }

        let mut seen = BTreeSet::new();
        for spec in &settings.fields {
            if spec.key.is_empty() {
                bail!("empty field key in the parameter file");
            }
            if !seen.insert(spec.key.as_str()) {
                bail!("duplicate field key '{}' in the parameter file", spec.key);
            }
        }

        Ok(EvolutionPipeline {
            registry: settings.fields.clone(),
            total_frames: settings.simulation.total_frames,
            ctx: RenderContext::new(&settings.sampling, &settings.image),
            snapshot_dir: snapshot_dir.to_path_buf(),
            output_dir: output_dir.to_path_buf(),
        })
    }

    /// Checks every registered key against the first sampled frame, so a
    /// misnamed quantity or a wrong render mode fails the run before any
    /// composite is drawn.
    fn preflight(&self, frames: &[usize]) -> Result<()> {
        let first = frames[0];
        let snapshot = Snapshot::read(&self.snapshot_dir, first)?;
        debug!(
            "fields present in frame {}: {:?}",
            first,
            snapshot.field_keys()
        );

        for spec in &self.registry {
            let data = snapshot
                .field(&spec.key)
                .ok_or_else(|| ErrorKind::FieldNotFound(spec.key.clone(), first))?;
            if !spec.mode.accepts_rank(data.ndim()) {
                bail!(ErrorKind::ShapeMismatch(
                    spec.key.clone(),
                    spec.mode,
                    data.ndim()
                ));
            }
        }

        Ok(())
    }

    /// Renders one composite per registered field key, in registry order.
    /// The first failure aborts the whole run.
    pub fn run(&self) -> Result<Vec<PathBuf>> {
        let frames = sampler::sample_frames(self.total_frames, self.ctx.capacity())?;
        debug!("sampled frames: {:?}", frames);

        self.preflight(&frames)?;

        let composer = GridComposer::new(self.ctx, &self.snapshot_dir, &self.output_dir);
        let mut outputs = Vec::with_capacity(self.registry.len());

        for spec in &self.registry {
            info!("plotting: {}", spec.key);
            let path = composer.compose(&spec.key, &frames, spec.mode)?;
            outputs.push(path);
        }

        Ok(outputs)
    }
}
