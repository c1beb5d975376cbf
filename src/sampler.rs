//! Selection of the snapshot frames that fill the panel grid.

use crate::errors::*;

/// Returns `capacity` evenly strided frame indices covering `0..total_frames`.
///
/// The stride is `(total_frames - 1) / (capacity - 1)` with integer
/// truncation, so the first index is always 0 and the last one never exceeds
/// `total_frames - 1`. When the universe cannot fill the grid at that stride
/// the sweep fails with `InsufficientFrames` instead of padding.
pub fn sample_frames(total_frames: usize, capacity: usize) -> Result<Vec<usize>> {
    if total_frames == 0 || capacity < 2 {
        bail!(ErrorKind::InsufficientFrames(capacity, total_frames));
    }

    let stride = (total_frames - 1) / (capacity - 1);
    if stride == 0 {
        bail!(ErrorKind::InsufficientFrames(capacity, total_frames));
    }

    let mut frames = Vec::with_capacity(capacity);
    let mut index = 0;

    while index <= total_frames - 1 && frames.len() < capacity {
        frames.push(index);
        index += stride;
    }

    if frames.len() < capacity {
        bail!(ErrorKind::InsufficientFrames(capacity, frames.len()));
    }

    Ok(frames)
}
