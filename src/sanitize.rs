// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Unconditional field sanitization.
//!
//! Submission fields end up inside an HTML email body, so every field is
//! cleaned before validation: surrounding whitespace trimmed, angle-bracket
//! content removed, length capped.

use crate::config::SanitizeConfig;

/// Sanitize a single field value.
///
/// Tag removal drops everything from a `<` through the matching `>`; a
/// dangling `<` with no closing bracket drops the remainder of the string,
/// and stray `>` characters are removed. The result never contains `<` or
/// `>`. Truncation to `max_field_len` happens last, on a char boundary.
pub fn sanitize_field(raw: &str, config: &SanitizeConfig) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut in_tag = false;

    for c in raw.trim().chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if in_tag => {}
            _ => out.push(c),
        }
    }

    // Re-trim: tag stripping can expose surrounding whitespace
    let trimmed = out.trim();
    trimmed.chars().take(config.max_field_len).collect()
}
