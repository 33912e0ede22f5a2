/// All backend primary keys are integers.
pub type DbId = i64;

/// Parse a user-supplied id (e.g. a path segment or CLI argument).
///
/// Only strictly positive integers are valid identifiers.
pub fn parse_id(raw: &str) -> Result<DbId, crate::error::CoreError> {
    match raw.trim().parse::<DbId>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(crate::error::CoreError::InvalidId(raw.to_string())),
    }
}
