//! Argument validation for host-facing operations
//!
//! Every operation validates its raw string arguments before touching
//! the store. The rules are uniform: IDs and names must be non-empty,
//! at most 32 characters, and free of control characters; token counts
//! must be decimal digit strings that fit in a u64.

use crate::{Error, Result};

/// Maximum length for ID, name, and numeric arguments, in characters
pub const MAX_ARG_CHARS: usize = 32;

/// Validate an ID or name argument
pub fn require_arg(field: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(Error::InvalidArgument(format!(
            "{} must be a non-empty string",
            field
        )));
    }
    check_text(field, value)
}

/// Validate a range bound.
///
/// Bounds follow the usual text rules but may be empty, which callers
/// treat as an open end of the range.
pub fn check_bound(field: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Ok(());
    }
    check_text(field, value)
}

fn check_text(field: &str, value: &str) -> Result<()> {
    // Lengths are counted in characters, not bytes
    let chars = value.chars().count();
    if chars > MAX_ARG_CHARS {
        return Err(Error::InvalidArgument(format!(
            "{} must be at most {} characters, got {}",
            field, MAX_ARG_CHARS, chars
        )));
    }

    if let Some(ch) = value.chars().find(|c| c.is_control()) {
        return Err(Error::InvalidArgument(format!(
            "{} contains forbidden character {:?}",
            field, ch
        )));
    }

    Ok(())
}

/// Parse a non-negative token count argument
pub fn parse_token_count(field: &str, value: &str) -> Result<u64> {
    require_arg(field, value)?;

    if !value.chars().all(|c| c.is_ascii_digit()) {
        return Err(Error::InvalidArgument(format!(
            "{} must be an unsigned integer, got {:?}",
            field, value
        )));
    }

    value
        .parse::<u64>()
        .map_err(|_| Error::InvalidArgument(format!("{} is out of range", field)))
}

/// Parse a transfer amount argument, which must be positive
pub fn parse_transfer_amount(field: &str, value: &str) -> Result<u64> {
    let amount = parse_token_count(field, value)?;
    if amount == 0 {
        return Err(Error::InvalidArgument(format!(
            "{} must be greater than zero",
            field
        )));
    }
    Ok(amount)
}
