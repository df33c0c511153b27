// SPDX-FileCopyrightText: 2026 Smsbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Partial masking of sender numbers for display.

/// Returned for numbers with fewer than five digits.
pub const MASK_PLACEHOLDER: &str = "xx xx xx xx xx";

/// Mask the middle digits of a phone number.
///
/// Non-digits are dropped. With five or more digits, the first three and last
/// two survive and everything between becomes `x`, grouped in pairs:
/// `"+33612345678"` becomes `"336 xx xx xx 78"`.
pub fn mask_number(number: &str) -> String {
    let digits: String = number.chars().filter(char::is_ascii_digit).collect();
    if digits.len() < 5 {
        return MASK_PLACEHOLDER.to_string();
    }

    // ASCII only from here, so byte slicing is safe.
    let head = &digits[..3];
    let tail = &digits[digits.len() - 2..];
    let hidden = digits.len() - 5;

    let mut groups = vec!["xx"; hidden / 2];
    if hidden % 2 == 1 {
        groups.push("x");
    }

    let mut parts = Vec::with_capacity(groups.len() + 2);
    parts.push(head);
    parts.extend(groups);
    parts.push(tail);
    parts.join(" ")
}
