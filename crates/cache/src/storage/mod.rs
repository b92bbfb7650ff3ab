//! Temp file storage tiers
//!
//! - [`LocalTempFileStorage`]: plain `root/owner/version/path` layout
//! - [`TransactionalTempFileStorage`]: one isolated overlay per transaction
//! - [`RollingCacheStorage`]: size-bounded LRU over recently used files
//! - [`HybridTempFileStorage`]: overlay first, rolling cache otherwise

mod attributes;
mod channel;
mod hybrid;
mod local;
mod options;
mod physical;
mod rolling;
mod traits;
mod transactional;

pub use attributes::FileAttributes;
pub use channel::ByteChannel;
pub use hybrid::HybridTempFileStorage;
pub use local::LocalTempFileStorage;
pub use options::{CopyOptions, OpenOptionSet};
pub use rolling::RollingCacheStorage;
pub use traits::TempFileStorage;
pub use transactional::TransactionalTempFileStorage;
