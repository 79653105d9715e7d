#![cfg_attr(not(feature = "std"), no_std)]

// Test helpers use std paths even when the library itself is no_std.
#[cfg(all(test, not(feature = "std")))]
extern crate std;

extern crate alloc;

pub mod common;
pub mod fixed;
pub mod pipeline;
pub mod verify;

#[cfg(feature = "std")]
pub mod memfile;

pub use common::{FftError, FftProcess};
pub use fixed::{ReferenceFft, Sample, TwiddleTable};
pub use pipeline::{ControlInputs, FftCore, PipelineConfig, PortPriority, RunStats};
