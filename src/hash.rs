//! String hashing used to derive cache keys.
//!
//! The digest is the classic base-31 polynomial hash over UTF-16 code
//! units, truncated to a signed 32-bit integer (the same values Java's
//! `String::hashCode` produces). It has no seed, so keys are stable across
//! processes.

use serde_json::Value;

/// Hash a string into a signed 32-bit digest.
///
/// Returns `0` for the empty string.
///
/// ```rust
/// # use herald::hash::hash_code;
/// assert_eq!(hash_code(""), 0);
/// assert_eq!(hash_code("a"), 97);
/// assert_eq!(hash_code("hello"), 99_162_322);
/// ```
pub fn hash_code(value: &str) -> i32 {
    value
        .encode_utf16()
        .fold(0i32, |hash, unit| {
            hash.wrapping_mul(31).wrapping_add(i32::from(unit))
        })
}

/// Hash a dynamic JSON value.
///
/// Only strings have a digest; every other value yields `None`.
pub fn hash_value(value: &Value) -> Option<i32> {
    value.as_str().map(hash_code)
}
