use super::ApiError;

/// Parses a path id. Anything that is not a positive integer cannot name a
/// row, so it reads as not found.
pub fn parse_id(resource: &str, raw: &str) -> Result<i32, ApiError> {
    match raw.trim().parse::<i32>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(ApiError::not_found(resource, raw)),
    }
}
