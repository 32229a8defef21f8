//! Small column conversion helpers shared by the repositories.

use rust_decimal::Decimal;

use crate::errors::StorageError;

/// Parses a TEXT-stored decimal column; a non-parsing value is corrupt
/// data, never silently defaulted.
pub(crate) fn parse_decimal(raw: &str, column: &str) -> Result<Decimal, StorageError> {
    Decimal::from_str_exact(raw)
        .map_err(|e| StorageError::CorruptValue(format!("{column}='{raw}': {e}")))
}
