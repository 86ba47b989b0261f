//! Best-effort recovery of an error line number from free-form validator messages.

use regex::Regex;
use std::sync::OnceLock;

fn line_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        // `\d` would also match non-ASCII digits, which never parse as usize.
        Regex::new(r"(?i)line\s*:?\s*([0-9]+)").expect("line pattern compiles")
    })
}

/// Extracts the number following the first `line` token in `message`.
///
/// Matching is case-insensitive and tolerates whitespace and a colon between
/// the word and the digits (`line 7`, `Line:7`, `LINE : 7`). Returns `0` when
/// no such token exists or the digits overflow.
pub fn extract_line_number(message: &str) -> usize {
    line_pattern()
        .captures(message)
        .and_then(|captures| captures.get(1))
        .and_then(|digits| digits.as_str().parse().ok())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Parse error on line 7:\nA-->\n---^", 7)]
    #[case("error at LINE 12", 12)]
    #[case("Line:3 unexpected token", 3)]
    #[case("line : 41", 41)]
    #[case("line\t9", 9)]
    #[case("Lexical error on line 2. Unrecognized text.", 2)]
    #[case("first line 4 then line 9", 4)]
    #[case("No diagram type detected matching given configuration for text: ", 0)]
    #[case("Trying to inactivate an inactive participant (Bob)", 0)]
    #[case("line without digits", 0)]
    #[case("", 0)]
    #[case("line 99999999999999999999999999", 0)]
    #[case("line 5\u{0663}", 5)]
    #[case("line \u{0663} then line 5", 5)]
    fn extracts_first_line_number(#[case] message: &str, #[case] expected: usize) {
        assert_eq!(extract_line_number(message), expected);
    }

    #[test]
    fn ignores_surrounding_unicode() {
        assert_eq!(extract_line_number("Ошибка: line 5 — ✗"), 5);
    }
}
