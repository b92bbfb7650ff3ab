//! Domain types shared by the storage crates

mod digest;
mod files;
mod path;
mod transaction;

pub use digest::{Digest, DigestAlgorithm};
pub use files::FileInfo;
pub use path::{VersionNumber, VersionedPath};
pub use transaction::{
    NoTransaction, SharedTransactionContext, ThreadTransactionContext, TransactionContext,
    TransactionId,
};
