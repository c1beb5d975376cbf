//! Reading of the numbered snapshot files the simulation dumps.
//!
//! One CBOR file per frame, named by the 4-digit zero-padded frame index.
//! Only the dump time and the per-key field arrays are consumed here; the
//! simulation owns the files and this module never deletes or rewrites them.

#[cfg(test)]
#[path = "snapshot_test.rs"]
mod snapshot_test;

use crate::errors::*;
use ndarray::ArrayD;
use serde_cbor;
use std::collections::BTreeMap;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

/// Fixed file extension of snapshot dumps.
pub const SNAPSHOT_EXTENSION: &str = "cbor";

/// Per-dump metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Header {
    /// Simulation time of the dump in seconds.
    pub time: f64,
    /// Timestep counter at dump time.
    pub step: usize,
}

/// One timestamped dump of simulation state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub header: Header,
    /// Field data keyed by hierarchical quantity name, e.g. `"Electric Field/Ex"`.
    pub fields: BTreeMap<String, ArrayD<f64>>,
}

impl Snapshot {
    /// File name of the dump for `frame`, e.g. `0007.cbor`.
    pub fn filename(frame: usize) -> String {
        format!("{:04}.{}", frame, SNAPSHOT_EXTENSION)
    }

    /// Reads the dump for `frame` from `dir`.
    pub fn read(dir: &Path, frame: usize) -> Result<Snapshot> {
        let path = dir.join(Snapshot::filename(frame));

        let file = File::open(&path).map_err(|e| -> Error {
            if e.kind() == io::ErrorKind::NotFound {
                ErrorKind::FrameNotFound(frame).into()
            } else {
                Error::with_chain(e, format!("cannot open snapshot file '{}'", path.display()))
            }
        })?;

        serde_cbor::from_reader(file)
            .chain_err(|| format!("cannot decode snapshot file '{}'", path.display()))
    }

    /// Writes the dump for `frame` into `dir`, mirroring the simulation's
    /// file naming. Used by tooling and tests that fabricate runs.
    pub fn write(&self, dir: &Path, frame: usize) -> Result<PathBuf> {
        let path = dir.join(Snapshot::filename(frame));

        let file = File::create(&path)
            .chain_err(|| format!("cannot create snapshot file '{}'", path.display()))?;
        serde_cbor::to_writer(file, self)
            .chain_err(|| format!("cannot encode snapshot file '{}'", path.display()))?;

        Ok(path)
    }

    /// The array stored under `key`, if any.
    pub fn field(&self, key: &str) -> Option<&ArrayD<f64>> {
        self.fields.get(key)
    }

    /// All field keys present in this dump, in map order.
    pub fn field_keys(&self) -> Vec<&str> {
        self.fields.keys().map(|k| k.as_str()).collect()
    }
}

/// Returns the dump time and the raw array stored under `key` in `frame`.
pub fn extract(dir: &Path, frame: usize, key: &str) -> Result<(f64, ArrayD<f64>)> {
    let snapshot = Snapshot::read(dir, frame)?;
    let data = snapshot
        .field(key)
        .ok_or_else(|| ErrorKind::FieldNotFound(key.to_string(), frame))?;

    Ok((snapshot.header.time, data.clone()))
}
