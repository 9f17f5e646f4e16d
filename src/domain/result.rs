//! Result type alias for cinesync
//!
//! This module provides a convenient Result type alias that uses
//! CinesyncError as the error type.

use super::errors::CinesyncError;

/// Result type alias for cinesync operations
///
/// # Examples
///
/// ```
/// use cinesync::domain::result::Result;
/// use cinesync::domain::errors::CinesyncError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(CinesyncError::Configuration("invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, CinesyncError>;
