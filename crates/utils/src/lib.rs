//! Shared utilities for ocflstore
//!
//! File system helpers used by every storage tier, the default storage
//! location, and tracing subscriber setup for hosts and tests.

pub mod atomic_file;
pub mod fs;
pub mod tracing;
pub mod xdg;

pub use atomic_file::*;
pub use fs::*;
pub use xdg::*;
