//! Snapshot-sweep visualization of a particle-in-cell simulation run.
//!
//! The external simulation dumps one numbered snapshot file per output
//! step. This crate samples a fixed number of those frames, extracts a
//! named field from each one and composes the results into a labeled
//! panel grid, one composite image per field key. The `harness` module
//! wraps the whole thing around the external build of the simulation.

#[macro_use]
extern crate error_chain;
#[macro_use]
extern crate log;
#[macro_use]
extern crate serde_derive;

#[cfg(test)]
#[macro_use]
extern crate quickcheck;

pub mod harness;
pub mod pipeline;
pub mod plot;
pub mod sampler;
pub mod settings;
pub mod snapshot;

/// Version of this crate, taken from Cargo metadata.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod errors {
    //! Crate-wide error chain.

    error_chain! {
        links {
            Settings(crate::settings::Error, crate::settings::ErrorKind);
        }

        foreign_links {
            Io(::std::io::Error);
        }

        errors {
            /// The external simulation build returned a non-zero status.
            BuildFailure(code: i32) {
                description("external build failed")
                display("external build exited with status code {}", code)
            }

            /// No snapshot file exists for the requested frame index.
            FrameNotFound(frame: usize) {
                description("snapshot frame not found")
                display("no snapshot file for frame {}", frame)
            }

            /// A snapshot does not contain the requested field key.
            FieldNotFound(key: String, frame: usize) {
                description("field key not found in snapshot")
                display("field '{}' not present in frame {}", key, frame)
            }

            /// The array rank of a field does not fit the requested render mode.
            ShapeMismatch(key: String, mode: crate::settings::RenderMode, rank: usize) {
                description("field rank does not match render mode")
                display("field '{}' has rank {} which cannot be drawn in {:?} mode", key, rank, mode)
            }

            /// The frame universe cannot fill the panel grid at the computed stride.
            InsufficientFrames(capacity: usize, available: usize) {
                description("not enough frames to fill the panel grid")
                display("grid needs {} frames but only {} are available", capacity, available)
            }

            /// The plotting backend failed while drawing or saving a composite.
            Render(detail: String) {
                description("rendering failed")
                display("rendering failed: {}", detail)
            }
        }
    }
}
