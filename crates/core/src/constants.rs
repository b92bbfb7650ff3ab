//! Shared constants

/// Buffer size used when streaming file content through a hasher or a copy
pub const IO_BUFFER_SIZE: usize = 8192;

/// Number of leading hex characters used to shard content-addressed files
pub const SHARD_PREFIX_LEN: usize = 3;

/// Prefix of the environment variables read by the configuration loader
pub const ENV_PREFIX: &str = "OCFLSTORE";
