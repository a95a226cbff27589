//! Validated value types used across the pipeline.

mod dest_dir;

pub use dest_dir::DestDir;
