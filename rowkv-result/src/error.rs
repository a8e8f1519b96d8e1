use thiserror::Error;

/// Unified error type for all rowkv operations.
///
/// Errors propagate upward through the call stack with the `?` operator.
/// Internal code can match on specific variants for fine-grained handling;
/// API boundaries typically surface the message as-is.
///
/// The set is deliberately small. A point lookup that finds nothing is an
/// empty result, not an error, and structural invariant violations inside
/// the tree are programming errors that abort via panic, so neither shows
/// up here.
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid user input or API parameter.
    ///
    /// Covers every schema-validation failure: empty schemas, empty
    /// column-name lists, unknown or duplicate column names, rows whose
    /// length or field kinds do not match the target schema.
    ///
    /// These errors are recoverable: fix the input and retry.
    #[error("Invalid argument: {0}")]
    InvalidArgumentError(String),

    /// Data constraint violation.
    ///
    /// Raised when an insert would store a second row under a primary key
    /// that already maps to a different row. Expected during normal
    /// operation; callers should handle it and inform the user.
    #[error("Constraint Error: {0}")]
    ConstraintError(String),
}
