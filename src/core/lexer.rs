//! Purpose: Anchored literal matchers for basic-type value text, plus string unescaping.
//! Exports: `LiteralKind`, `lex`, `unescape`.
//! Role: Leaf of the value parser; decides how many bytes of text a scalar occupies.
//! Invariants: Matching starts exactly at offset 0 (no whitespace skipping) and returns
//! the longest match for the requested grammar.
//! Invariants: Quoted strings accept only escapes of the delimiter, backslash, and `bfnrt`;
//! anything `lex` accepts, `unescape` decodes completely.

use crate::core::error::{Error, ErrorKind};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LiteralKind {
    /// `true`, `false`, `1` or `0`.
    Boolean,
    /// Optional `-` then decimal digits.
    SignedInteger,
    /// Decimal digits only.
    UnsignedInteger,
    /// Signed integer, optional `.digits`, optional `e[+-]digits`.
    Double,
    /// `"..."` or `'...'` with backslash escapes.
    QuotedString,
}

impl LiteralKind {
    fn describe(self) -> &'static str {
        match self {
            LiteralKind::Boolean => "a boolean (true, false, 1, 0)",
            LiteralKind::SignedInteger => "a signed integer",
            LiteralKind::UnsignedInteger => "an unsigned integer",
            LiteralKind::Double => "a number",
            LiteralKind::QuotedString => "a quoted string",
        }
    }
}

/// Length in bytes of the literal of `kind` that starts at the beginning of `text`.
pub fn lex(kind: LiteralKind, text: &str) -> Result<usize, Error> {
    let bytes = text.as_bytes();
    let matched = match kind {
        LiteralKind::Boolean => match_boolean(bytes),
        LiteralKind::SignedInteger => match_signed(bytes),
        LiteralKind::UnsignedInteger => match_digits(bytes),
        LiteralKind::Double => match_double(bytes),
        LiteralKind::QuotedString => return match_quoted(text),
    };
    matched.ok_or_else(|| {
        Error::new(ErrorKind::Literal)
            .with_message(format!("expected {}", kind.describe()))
            .with_text_offset(0)
    })
}

/// Strip the surrounding quotes of a lexed string literal and decode its escapes.
pub fn unescape(literal: &str) -> String {
    let inner = if literal.len() >= 2 {
        &literal[1..literal.len() - 1]
    } else {
        ""
    };
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('"') => out.push('"'),
            Some('\'') => out.push('\''),
            Some('\\') => out.push('\\'),
            Some('b') => out.push('\u{8}'),
            Some('f') => out.push('\u{c}'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            // Only reachable for text that did not come through `lex`.
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

fn match_boolean(bytes: &[u8]) -> Option<usize> {
    ["true", "false", "1", "0"]
        .iter()
        .find(|word| bytes.starts_with(word.as_bytes()))
        .map(|word| word.len())
}

fn match_digits(bytes: &[u8]) -> Option<usize> {
    let len = bytes.iter().take_while(|b| b.is_ascii_digit()).count();
    (len > 0).then_some(len)
}

fn match_signed(bytes: &[u8]) -> Option<usize> {
    let sign = usize::from(bytes.first() == Some(&b'-'));
    match_digits(&bytes[sign..]).map(|digits| sign + digits)
}

fn match_double(bytes: &[u8]) -> Option<usize> {
    let mut len = match_signed(bytes)?;
    if bytes.get(len) == Some(&b'.') {
        if let Some(frac) = match_digits(&bytes[len + 1..]) {
            len += 1 + frac;
        }
    }
    if matches!(bytes.get(len), Some(b'e' | b'E')) {
        let mut exp = len + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        if let Some(digits) = match_digits(&bytes[exp..]) {
            len = exp + digits;
        }
    }
    Some(len)
}

fn match_quoted(text: &str) -> Result<usize, Error> {
    let mut chars = text.char_indices();
    let quote = match chars.next() {
        Some((_, q @ ('"' | '\''))) => q,
        _ => {
            return Err(Error::new(ErrorKind::Literal)
                .with_message("expected a quoted string")
                .with_hint("Quote string values with \"...\" or '...'.")
                .with_text_offset(0));
        }
    };
    while let Some((idx, c)) = chars.next() {
        if c == quote {
            return Ok(idx + c.len_utf8());
        }
        if c == '\\' {
            match chars.next() {
                Some((_, e)) if e == quote || matches!(e, '\\' | 'b' | 'f' | 'n' | 'r' | 't') => {}
                Some((at, _)) => {
                    return Err(Error::new(ErrorKind::Literal)
                        .with_message("unsupported escape sequence in string")
                        .with_hint(format!(
                            "Supported escapes: \\{quote} \\\\ \\b \\f \\n \\r \\t"
                        ))
                        .with_text_offset(at));
                }
                None => break,
            }
            continue;
        }
        if c.is_ascii_control() && c != '\u{7f}' {
            return Err(Error::new(ErrorKind::Literal)
                .with_message("control character in string")
                .with_hint("Use \\n, \\t, \\r, \\b or \\f escapes.")
                .with_text_offset(idx));
        }
    }
    Err(Error::new(ErrorKind::Literal)
        .with_message("unterminated string")
        .with_text_offset(text.len()))
}

#[cfg(test)]
mod tests {
    use super::{LiteralKind, lex, unescape};
    use crate::core::error::ErrorKind;

    #[test]
    fn booleans_match_words_and_digits() {
        assert_eq!(lex(LiteralKind::Boolean, "true,").expect("true"), 4);
        assert_eq!(lex(LiteralKind::Boolean, "false]").expect("false"), 5);
        assert_eq!(lex(LiteralKind::Boolean, "1").expect("one"), 1);
        assert_eq!(lex(LiteralKind::Boolean, "0)").expect("zero"), 1);
        assert!(lex(LiteralKind::Boolean, "yes").is_err());
        assert!(lex(LiteralKind::Boolean, " true").is_err());
    }

    #[test]
    fn integers_are_greedy_and_anchored() {
        assert_eq!(lex(LiteralKind::SignedInteger, "-42,").expect("signed"), 3);
        assert_eq!(lex(LiteralKind::UnsignedInteger, "0042]").expect("unsigned"), 4);
        assert!(lex(LiteralKind::UnsignedInteger, "-1").is_err());
        assert!(lex(LiteralKind::SignedInteger, "-").is_err());
        assert!(lex(LiteralKind::SignedInteger, "+1").is_err());
    }

    #[test]
    fn doubles_take_the_longest_form() {
        assert_eq!(lex(LiteralKind::Double, "1").expect("int"), 1);
        assert_eq!(lex(LiteralKind::Double, "-1.25,").expect("frac"), 5);
        assert_eq!(lex(LiteralKind::Double, "6e23").expect("exp"), 4);
        assert_eq!(lex(LiteralKind::Double, "1.5E-3]").expect("frac+exp"), 6);
        assert_eq!(lex(LiteralKind::Double, "1.").expect("dangling dot"), 1);
        assert_eq!(lex(LiteralKind::Double, "2e+").expect("dangling exponent"), 1);
        assert!(lex(LiteralKind::Double, ".5").is_err());
    }

    #[test]
    fn quoted_strings_in_both_styles() {
        assert_eq!(lex(LiteralKind::QuotedString, r#""hi",1"#).expect("dq"), 4);
        assert_eq!(lex(LiteralKind::QuotedString, "'it''").expect("sq"), 4);
        assert_eq!(lex(LiteralKind::QuotedString, r#""a\"b""#).expect("escaped dq"), 6);
        assert_eq!(lex(LiteralKind::QuotedString, r#""it's""#).expect("sq inside dq"), 6);
        assert_eq!(lex(LiteralKind::QuotedString, "\"h\u{e9}j\"").expect("utf8"), 6);
    }

    #[test]
    fn quoted_string_failures_are_literal_errors() {
        let err = lex(LiteralKind::QuotedString, "\"open").expect_err("unterminated");
        assert_eq!(err.kind(), ErrorKind::Literal);
        assert_eq!(err.text_offset(), Some(5));

        let err = lex(LiteralKind::QuotedString, r#""bad\x""#).expect_err("escape");
        assert_eq!(err.text_offset(), Some(5));

        assert!(lex(LiteralKind::QuotedString, r#""it\'s""#).is_err());
        assert!(lex(LiteralKind::QuotedString, "\"a\nb\"").is_err());
        assert!(lex(LiteralKind::QuotedString, "bare").is_err());
    }

    #[test]
    fn unescape_decodes_every_supported_escape() {
        assert_eq!(unescape(r#""plain""#), "plain");
        assert_eq!(unescape(r#""q\"\\\b\f\n\r\t""#), "q\"\\\u{8}\u{c}\n\r\t");
        assert_eq!(unescape(r"'it\'s'"), "it's");
        assert_eq!(unescape("\"\""), "");
    }
}
