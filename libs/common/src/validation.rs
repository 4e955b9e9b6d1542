//! Input validation utilities
//!
//! Client-side checks are limited to required fields: anything else is left
//! to the server, whose `detail` message is shown verbatim.

/// Draft payloads that can be checked before a request is issued
pub trait Validate {
    /// Return the first problem found, if any
    fn validate(&self) -> Result<(), String>;
}

/// Require a non-blank value for `field`
pub fn require(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{} is required", field));
    }

    Ok(())
}
