//! Convenience result type alias for VoxRelay.

use crate::error::AppError;

/// A specialized `Result` type for VoxRelay operations.
pub type AppResult<T> = Result<T, AppError>;
