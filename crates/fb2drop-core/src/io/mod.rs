//! I/O helpers for guarded extraction.

mod bounded;

pub use bounded::BoundedWriter;
