//! Byte-level helpers for tab-separated records

use atoi::{FromRadix10Checked, FromRadix10SignedChecked};

/// Split a line into its tab-separated fields.
///
/// An empty line yields a single empty field, like `str::split`.
#[inline]
pub fn split_fields(line: &[u8]) -> impl Iterator<Item = &[u8]> {
    let mut start = 0;
    let mut ends = memchr::memchr_iter(b'\t', line).chain(std::iter::once(line.len()));
    std::iter::from_fn(move || {
        let end = ends.next()?;
        let field = &line[start..end];
        start = end + 1;
        Some(field)
    })
}

/// Parse a node identifier field.
///
/// Surrounding ASCII whitespace and a leading `+` are tolerated; anything
/// else must be decimal digits that fit in a `u32`.
#[inline]
pub fn parse_id(field: &[u8]) -> Option<u32> {
    let field = field.trim_ascii();
    let digits = field.strip_prefix(b"+").unwrap_or(field);
    if digits.is_empty() {
        return None;
    }

    let (value, used) = u32::from_radix_10_checked(digits);
    if used != digits.len() {
        return None;
    }
    value
}

/// Parse a head field, which may be signed.
///
/// Same whitespace tolerance as [`parse_id`]; at least one digit is
/// required and the value must fit in an `i64`.
#[inline]
pub fn parse_head(field: &[u8]) -> Option<i64> {
    let field = field.trim_ascii();
    if !field.iter().any(u8::is_ascii_digit) {
        return None;
    }

    let (value, used) = i64::from_radix_10_signed_checked(field);
    if used != field.len() {
        return None;
    }
    value
}
