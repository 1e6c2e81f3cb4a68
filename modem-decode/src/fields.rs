//! Value extraction from information responses
//!
//! An information response looks like `+CPSMS: 1,,,"01100000","00000000"`
//! followed by the final `OK`. Values are located by their prefix and split
//! on commas; quoting is left in place so callers can tell an empty value
//! from an empty string.

use crate::{ModemError, ModemResult};
use std::str::FromStr;

const LINE_END: [char; 3] = ['\r', '\n', ' '];

/// Strip the trailing `OK` result code and line endings
pub fn strip_final_ok(response: &str) -> &str {
    let body = response.trim_end_matches(LINE_END);
    body.strip_suffix("OK")
        .unwrap_or(body)
        .trim_end_matches(LINE_END)
}

/// Split the values that follow the last occurrence of `prefix`
///
/// Each value is trimmed of surrounding whitespace.
///
/// # Errors
///
/// Returns `ModemError::Decode` if `prefix` does not occur in the response.
pub fn extract_fields(response: &str, prefix: &str) -> ModemResult<Vec<String>> {
    let body = strip_final_ok(response);
    let start = body.rfind(prefix).ok_or_else(|| {
        ModemError::decode(format!(
            "prefix {:?} not found in response {:?}",
            prefix,
            response.trim()
        ))
    })? + prefix.len();

    Ok(body[start..]
        .split(',')
        .map(|value| value.trim().to_string())
        .collect())
}

/// Value at `index`, or a decode error if the response was too short
pub fn field(fields: &[String], index: usize) -> ModemResult<&str> {
    fields.get(index).map(String::as_str).ok_or_else(|| {
        ModemError::decode(format!(
            "field {} out of range ({} values)",
            index,
            fields.len()
        ))
    })
}

/// Remove surrounding double quotes
pub fn unquote(value: &str) -> &str {
    value.trim().trim_matches('"')
}

/// Parse a quoted binary string such as `"01100000"` into a byte
pub fn parse_bits(value: &str) -> ModemResult<u8> {
    let bits = unquote(value);
    u8::from_str_radix(bits, 2)
        .map_err(|e| ModemError::decode(format!("invalid bit string {:?}: {}", value, e)))
}

/// Parse a (possibly quoted) decimal value
pub fn parse_int<T>(value: &str) -> ModemResult<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let digits = unquote(value);
    digits
        .parse()
        .map_err(|e| ModemError::decode(format!("invalid number {:?}: {}", value, e)))
}
