//! Error handling for the storage tiers
//!
//! Every variant carries a recovery hint so callers can decide between
//! retrying, recreating state, or giving up.

mod conversions;
mod display;
mod recovery;
mod types;

pub use types::*;
