//! Error types and result definitions for the rowkv engine.
//!
//! This crate provides the unified error type ([`Error`]) and result type
//! alias ([`Result<T>`]) used throughout the rowkv crates. All operations
//! that can fail return `Result<T>`; structural invariant violations inside
//! the storage layer are programming errors and abort via panic instead of
//! flowing through this type.

pub mod error;
pub mod result;

pub use error::Error;
pub use result::Result;
