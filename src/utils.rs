//! Small helpers shared across modules.

use regex::Regex;

/// Compiles a regex at static init; panics on invalid pattern.
pub(crate) fn compile_static_regex(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid static regex '{pattern}': {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_static_regex_accepts_valid_pattern() {
        assert!(compile_static_regex(r"^\d+$").is_match("42"));
    }

    #[test]
    #[should_panic(expected = "invalid static regex")]
    fn test_compile_static_regex_panics_on_invalid_pattern() {
        let _ = compile_static_regex("(unclosed");
    }
}
