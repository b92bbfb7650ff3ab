//! Core domain types and errors for the `ocflstore` storage subsystem.
//!
//! The storage crates only need a small vocabulary from the surrounding
//! repository: how content is identified, how a file inside a versioned
//! object is addressed, and whether a write transaction is in flight.
//!
//! ## Key Components
//!
//! - **`errors`**: the core `Error` enum and `Result` alias.
//! - **`types`**: `Digest`, `FileInfo`, `VersionedPath` and the
//!   `TransactionContext` seam.
//! - **`hashing`**: the `DigestCalculator` trait and its SHA-2 implementation.

pub mod constants;
pub mod errors;
pub mod hashing;
pub mod types;

pub use self::{
    constants::*,
    errors::{Error, Result},
    hashing::{DigestCalculator, Sha2Calculator},
    types::*,
};
