/// Rows per batch for paginated table operations unless a caller says
/// otherwise.
pub const DEFAULT_BATCH_SIZE: usize = 5;
