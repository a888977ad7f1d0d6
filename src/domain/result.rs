//! Crate-wide result alias

use super::errors::TabulaError;

/// Result of any fallible export step
///
/// ```
/// use tabula::domain::errors::TabulaError;
/// use tabula::domain::result::Result;
///
/// fn primary_code(codes: &[&str]) -> Result<String> {
///     codes
///         .first()
///         .map(|code| code.to_string())
///         .ok_or_else(|| TabulaError::malformed("no codes"))
/// }
///
/// assert!(primary_code(&[]).is_err());
/// ```
pub type Result<T> = std::result::Result<T, TabulaError>;
