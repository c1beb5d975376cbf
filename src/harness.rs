//! Boundary around the external simulation run.
//!
//! The simulation is built and executed by an external command inside its
//! own working directory. Everything here is scoped: the directory change
//! is undone on every exit path, and a failing build keeps the pipeline
//! from ever starting.

#[cfg(test)]
#[path = "harness_test.rs"]
mod harness_test;

use crate::errors::*;
use crate::pipeline::EvolutionPipeline;
use crate::settings::Settings;
use std::env;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Restores the previous working directory when dropped.
struct DirGuard {
    previous: PathBuf,
}

impl DirGuard {
    fn change_into(target: &Path) -> Result<DirGuard> {
        let previous =
            env::current_dir().chain_err(|| "cannot determine current working directory")?;
        env::set_current_dir(target)
            .chain_err(|| format!("cannot change into '{}'", target.display()))?;

        Ok(DirGuard { previous })
    }
}

impl Drop for DirGuard {
    fn drop(&mut self) {
        if let Err(e) = env::set_current_dir(&self.previous) {
            warn!(
                "cannot restore working directory '{}': {}",
                self.previous.display(),
                e
            );
        }
    }
}

/// Runs the external build command in the current working directory and
/// fails on any non-zero exit status.
fn run_build(command: &str) -> Result<()> {
    info!("running external build: {}", command);

    let status = Command::new("sh")
        .arg("-c")
        .arg(command)
        .status()
        .chain_err(|| format!("cannot invoke build command '{}'", command))?;

    if !status.success() {
        // a signal termination carries no code; report it as -1
        bail!(ErrorKind::BuildFailure(status.code().unwrap_or(-1)));
    }

    Ok(())
}

/// Builds the external simulation and, on success, sweeps its snapshots.
///
/// The whole sequence runs inside the simulation directory, so snapshot
/// files are read and composites are written right next to the run. The
/// prior working directory is restored unconditionally, also on failure.
pub fn run(settings: &Settings) -> Result<Vec<PathBuf>> {
    let _guard = DirGuard::change_into(Path::new(&settings.simulation.directory))?;

    run_build(&settings.simulation.build_command)?;

    let here = Path::new(".");
    let pipeline = EvolutionPipeline::new(settings, here, here)?;
    pipeline.run()
}
