use crate::error::Error;

/// Result alias used across the rowkv crates.
pub type Result<T> = std::result::Result<T, Error>;
