//! Bill-number normalization.
//!
//! Worksheet cells may carry the number inside a `=HYPERLINK("url","text")`
//! formula, and upstream master lists sometimes prepend a session token
//! (`X<digits>`) that sheet-entered numbers lack. The matching path must
//! tolerate both.

/// Extract the display text from a hyperlink formula cell.
///
/// Returns the second quoted string of `=HYPERLINK("url","text")`, or the
/// input unchanged when it is not a hyperlink formula.
pub fn extract_display_number(value: &str) -> &str {
    let trimmed = value.trim();
    let Some(rest) = trimmed.strip_prefix("=HYPERLINK(") else {
        return trimmed;
    };
    // Quoted segments sit at odd indices when splitting on '"'.
    let quoted: Vec<&str> = rest
        .split('"')
        .enumerate()
        .filter(|(i, _)| i % 2 == 1)
        .map(|(_, s)| s)
        .collect();
    match quoted.last() {
        Some(display) if quoted.len() >= 2 => display,
        _ => trimmed,
    }
}

/// Canonical comparison form of a bill number: display text, alphanumerics
/// only, uppercased.
pub fn normalize_bill_number(value: &str) -> String {
    extract_display_number(value)
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_uppercase()
}

/// Strip a leading session-prefix token (`X<digits>`) from a normalized
/// number, e.g. `X2HB68` → `HB68`.
pub fn strip_session_prefix(normalized: &str) -> &str {
    let Some(rest) = normalized.strip_prefix('X') else {
        return normalized;
    };
    let digits = rest.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits == 0 {
        return normalized;
    }
    &rest[digits..]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_numbers_pass_through() {
        assert_eq!(extract_display_number(" HB68 "), "HB68");
        assert_eq!(normalize_bill_number("hb 68"), "HB68");
    }

    #[test]
    fn hyperlink_formula_yields_display_text() {
        let cell = r#"=HYPERLINK("https://legiscan.com/OH/bill/HB68","HB68")"#;
        assert_eq!(extract_display_number(cell), "HB68");
        assert_eq!(normalize_bill_number(cell), "HB68");
    }

    #[test]
    fn malformed_hyperlink_falls_back_to_raw() {
        let cell = "=HYPERLINK(broken";
        assert_eq!(extract_display_number(cell), cell);
    }

    #[test]
    fn session_prefix_stripped_only_when_present() {
        assert_eq!(strip_session_prefix("X2HB68"), "HB68");
        assert_eq!(strip_session_prefix("X12SB5"), "SB5");
        assert_eq!(strip_session_prefix("HB68"), "HB68");
        // An X not followed by digits is part of the number.
        assert_eq!(strip_session_prefix("XYZ1"), "XYZ1");
    }

    #[test]
    fn normalization_drops_punctuation() {
        assert_eq!(normalize_bill_number("H.B. 68"), "HB68");
        assert_eq!(normalize_bill_number("sb-12"), "SB12");
    }
}
