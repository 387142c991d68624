//! Purpose: Recursive-descent parser from (type signature, value text) to a typed `Value`.
//! Exports: `parse_value`, `Parsed`, `Consumed`, `MAX_VALUE_DEPTH`.
//! Role: Core of argument handling; the CLI layer wraps it with whole-input checks.
//! Invariants: Pure function of its inputs; two cursors (signature, text) are threaded
//! through return values, never stored.
//! Invariants: Any failure aborts the whole parse; no partial value is ever returned.
//! Invariants: Nesting deeper than `MAX_VALUE_DEPTH` fails instead of growing the stack.

use crate::core::error::{Error, ErrorKind};
use crate::core::lexer::{LiteralKind, lex, unescape};
use crate::core::names::ObjectPath;
use crate::core::signature::{BasicKind, Signature, signature_prefix_length, validate_signature};
use crate::core::value::{BasicValue, Value};

pub const MAX_VALUE_DEPTH: usize = 64;

/// Bytes used from the signature and from the value text by one parse step.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Consumed {
    pub signature: usize,
    pub text: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Parsed {
    pub value: Value,
    pub consumed: Consumed,
}

/// Parse the value text at the start of `text` against the first complete type of `signature`.
///
/// Trailing signature or text is left for the caller; see `Parsed::consumed`.
pub fn parse_value(signature: &str, text: &str) -> Result<Parsed, Error> {
    parse_at(signature, text, false, 0)
}

fn parse_at(signature: &str, text: &str, allow_dict_entry: bool, depth: usize) -> Result<Parsed, Error> {
    if depth > MAX_VALUE_DEPTH {
        return Err(structural("value nesting exceeds 64 levels", 0));
    }
    let sig_len = signature_prefix_length(signature, allow_dict_entry);
    if sig_len == 0 {
        return Err(invalid_signature(signature, allow_dict_entry));
    }
    let sig = &signature[..sig_len];
    let lead = sig.as_bytes()[0];

    if let Some(kind) = BasicKind::from_code(lead) {
        let (value, len) = parse_basic(kind, text)?;
        return Ok(Parsed {
            value: Value::Basic(value),
            consumed: Consumed {
                signature: 1,
                text: len,
            },
        });
    }
    match lead {
        b'a' => parse_array(sig, text, depth),
        b'(' => parse_struct(sig, text, depth),
        b'v' => parse_variant(text, depth),
        b'{' => parse_dict_entry(sig, text, depth),
        _ => Err(Error::new(ErrorKind::Internal)
            .with_message("validated signature has an unexpected leading code")
            .with_signature_offset(0)),
    }
}

fn parse_basic(kind: BasicKind, text: &str) -> Result<(BasicValue, usize), Error> {
    let literal_kind = match kind {
        BasicKind::Byte
        | BasicKind::Uint16
        | BasicKind::Uint32
        | BasicKind::Uint64
        | BasicKind::UnixFd => LiteralKind::UnsignedInteger,
        BasicKind::Int16 | BasicKind::Int32 | BasicKind::Int64 => LiteralKind::SignedInteger,
        BasicKind::Double => LiteralKind::Double,
        BasicKind::Boolean => LiteralKind::Boolean,
        BasicKind::String | BasicKind::ObjectPath | BasicKind::Signature => {
            LiteralKind::QuotedString
        }
    };
    let len = lex(literal_kind, text)?;
    let literal = &text[..len];

    let value = match kind {
        BasicKind::Byte => BasicValue::Byte(integer(literal, kind)?),
        BasicKind::Boolean => BasicValue::Boolean(literal == "true" || literal == "1"),
        BasicKind::Int16 => BasicValue::Int16(integer(literal, kind)?),
        BasicKind::Uint16 => BasicValue::Uint16(integer(literal, kind)?),
        BasicKind::Int32 => BasicValue::Int32(integer(literal, kind)?),
        BasicKind::Uint32 => BasicValue::Uint32(integer(literal, kind)?),
        BasicKind::Int64 => BasicValue::Int64(integer(literal, kind)?),
        BasicKind::Uint64 => BasicValue::Uint64(integer(literal, kind)?),
        BasicKind::UnixFd => BasicValue::UnixFd(integer(literal, kind)?),
        BasicKind::Double => BasicValue::Double(
            literal
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .ok_or_else(|| out_of_range(kind))?,
        ),
        BasicKind::String => BasicValue::String(unescape(literal)),
        BasicKind::ObjectPath => BasicValue::ObjectPath(
            ObjectPath::new(unescape(literal)).map_err(|err| err.with_text_offset(0))?,
        ),
        BasicKind::Signature => {
            BasicValue::Signature(Signature::new(unescape(literal)).map_err(|err| {
                let message = format!(
                    "signature value is not a valid signature: {}",
                    err.message().unwrap_or("invalid")
                );
                Error::new(ErrorKind::Semantic)
                    .with_message(message)
                    .with_text_offset(0)
                    .with_source(err)
            })?)
        }
    };
    Ok((value, len))
}

fn integer<T: std::str::FromStr>(literal: &str, kind: BasicKind) -> Result<T, Error> {
    // The lexer guarantees decimal digits, so the only failure left is overflow.
    literal.parse::<T>().map_err(|_| out_of_range(kind))
}

fn parse_array(sig: &str, text: &str, depth: usize) -> Result<Parsed, Error> {
    let element_signature = &sig[1..];
    let bytes = text.as_bytes();
    if bytes.first() != Some(&b'[') {
        return Err(structural("expected '[' to open an array", 0));
    }
    let mut pos = 1;
    let mut items = Vec::new();

    if bytes.get(pos) == Some(&b']') {
        pos += 1;
    } else {
        loop {
            let element = parse_at(element_signature, &text[pos..], true, depth + 1)
                .map_err(|err| err.shifted(1, pos))?;
            items.push(element.value);
            pos += element.consumed.text;
            match bytes.get(pos) {
                Some(b',') => pos += 1,
                Some(b']') => {
                    pos += 1;
                    break;
                }
                _ => return Err(structural("expected ',' or ']' after array element", pos)),
            }
        }
    }

    Ok(Parsed {
        value: Value::Array {
            element_signature: element_signature.to_string(),
            items,
        },
        consumed: Consumed {
            signature: sig.len(),
            text: pos,
        },
    })
}

fn parse_struct(sig: &str, text: &str, depth: usize) -> Result<Parsed, Error> {
    let bytes = text.as_bytes();
    if bytes.first() != Some(&b'(') {
        return Err(structural("expected '(' to open a struct", 0));
    }
    let mut sig_pos = 1;
    let mut pos = 1;
    let mut fields = Vec::new();

    while sig.as_bytes().get(sig_pos).is_some_and(|code| *code != b')') {
        if !fields.is_empty() {
            if bytes.get(pos) != Some(&b',') {
                return Err(structural("expected ',' between struct fields", pos)
                    .with_signature_offset(sig_pos));
            }
            pos += 1;
        }
        let field = parse_at(&sig[sig_pos..], &text[pos..], false, depth + 1)
            .map_err(|err| err.shifted(sig_pos, pos))?;
        fields.push(field.value);
        pos += field.consumed.text;
        sig_pos += field.consumed.signature;
    }

    if bytes.get(pos) != Some(&b')') {
        return Err(structural("expected ')' to close the struct", pos).with_signature_offset(sig_pos));
    }
    pos += 1;

    Ok(Parsed {
        value: Value::Struct(fields),
        consumed: Consumed {
            signature: sig.len(),
            text: pos,
        },
    })
}

/// Variant text is `<signature>_<value>`, e.g. `i_32`, `s_"hi"`, `av_[i_1,s_"x"]`.
fn parse_variant(text: &str, depth: usize) -> Result<Parsed, Error> {
    let embedded_len = signature_prefix_length(text, false);
    if embedded_len == 0 {
        return Err(Error::new(ErrorKind::Signature)
            .with_message("variant value must start with a type signature")
            .with_hint("Write variants as <signature>_<value>, e.g. i_32 or s_\"hi\".")
            .with_text_offset(0));
    }
    if text.as_bytes().get(embedded_len) != Some(&b'_') {
        return Err(structural("expected '_' after the variant's signature", embedded_len)
            .with_hint("Write variants as <signature>_<value>, e.g. i_32 or s_\"hi\"."));
    }
    let start = embedded_len + 1;
    let inner = parse_at(&text[..embedded_len], &text[start..], false, depth + 1)
        .map_err(|err| err.with_signature_offset(0).shifted(0, start))?;

    Ok(Parsed {
        value: Value::Variant(Box::new(inner.value)),
        consumed: Consumed {
            signature: 1,
            text: start + inner.consumed.text,
        },
    })
}

fn parse_dict_entry(sig: &str, text: &str, depth: usize) -> Result<Parsed, Error> {
    let bytes = text.as_bytes();
    let key_kind = sig
        .as_bytes()
        .get(1)
        .copied()
        .and_then(BasicKind::from_code)
        .ok_or_else(|| {
            Error::new(ErrorKind::Signature)
                .with_message("dict entry key must be a basic type")
                .with_signature_offset(1)
        })?;
    if bytes.first() != Some(&b'{') {
        return Err(structural("expected '{' to open a dict entry", 0));
    }

    let (key, key_len) = parse_basic(key_kind, &text[1..]).map_err(|err| err.shifted(1, 1))?;
    let mut pos = 1 + key_len;
    if bytes.get(pos) != Some(&b',') {
        return Err(structural("expected ',' between dict entry key and value", pos));
    }
    pos += 1;

    let value_signature = &sig[2..sig.len() - 1];
    let value = parse_at(value_signature, &text[pos..], false, depth + 1)
        .map_err(|err| err.shifted(2, pos))?;
    pos += value.consumed.text;
    if bytes.get(pos) != Some(&b'}') {
        return Err(structural("expected '}' to close the dict entry", pos));
    }
    pos += 1;

    Ok(Parsed {
        value: Value::DictEntry {
            key,
            value: Box::new(value.value),
        },
        consumed: Consumed {
            signature: sig.len(),
            text: pos,
        },
    })
}

fn invalid_signature(signature: &str, allow_dict_entry: bool) -> Error {
    if signature.is_empty() {
        return Error::new(ErrorKind::Signature)
            .with_message("empty signature")
            .with_signature_offset(0);
    }
    if allow_dict_entry && signature.starts_with('{') {
        return Error::new(ErrorKind::Signature)
            .with_message("invalid dict entry signature")
            .with_hint("Dict entries take one basic key type and one value type, e.g. {sv}.")
            .with_signature_offset(0);
    }
    match validate_signature(signature) {
        Err(err) => err,
        Ok(()) => Error::new(ErrorKind::Signature)
            .with_message("invalid signature")
            .with_signature_offset(0),
    }
}

fn structural(message: &str, offset: usize) -> Error {
    Error::new(ErrorKind::Structural)
        .with_message(message)
        .with_text_offset(offset)
}

fn out_of_range(kind: BasicKind) -> Error {
    Error::new(ErrorKind::Literal)
        .with_message(format!("value out of range for {}", kind.name()))
        .with_text_offset(0)
}

#[cfg(test)]
mod tests {
    use super::{Consumed, MAX_VALUE_DEPTH, parse_value};
    use crate::core::error::ErrorKind;
    use crate::core::value::{BasicValue, Value};

    fn ints(values: &[i32]) -> Value {
        Value::Array {
            element_signature: "i".to_string(),
            items: values.iter().copied().map(Value::from).collect(),
        }
    }

    #[test]
    fn int32_consumes_its_digits() {
        let parsed = parse_value("i", "42").expect("parse");
        assert_eq!(parsed.value, Value::from(42));
        assert_eq!(
            parsed.consumed,
            Consumed {
                signature: 1,
                text: 2
            }
        );
    }

    #[test]
    fn every_basic_kind_parses() {
        let cases = [
            ("y", "255", BasicValue::Byte(255)),
            ("b", "false", BasicValue::Boolean(false)),
            ("b", "1", BasicValue::Boolean(true)),
            ("n", "-32768", BasicValue::Int16(-32768)),
            ("q", "65535", BasicValue::Uint16(65535)),
            ("u", "7", BasicValue::Uint32(7)),
            ("x", "-9000000000", BasicValue::Int64(-9_000_000_000)),
            ("t", "18446744073709551615", BasicValue::Uint64(u64::MAX)),
            ("d", "-2.5e2", BasicValue::Double(-250.0)),
            ("h", "3", BasicValue::UnixFd(3)),
            ("s", "'single'", BasicValue::String("single".to_string())),
        ];
        for (sig, text, expected) in cases {
            let parsed = parse_value(sig, text).expect(sig);
            assert_eq!(parsed.value, Value::Basic(expected), "{sig} {text}");
            assert_eq!(parsed.consumed.text, text.len(), "{sig} {text}");
        }
    }

    #[test]
    fn integers_are_decimal_and_range_checked() {
        assert_eq!(parse_value("i", "010").expect("leading zero").value, Value::from(10));
        let hex = parse_value("i", "0x10").expect("stops at x");
        assert_eq!(hex.consumed.text, 1);

        let err = parse_value("y", "256").expect_err("overflow");
        assert_eq!(err.kind(), ErrorKind::Literal);
        assert!(parse_value("n", "40000").is_err());
        assert!(parse_value("u", "-1").is_err());
    }

    #[test]
    fn object_paths_and_signatures_are_checked() {
        let parsed = parse_value("o", r#""/org/example""#).expect("path");
        assert_eq!(parsed.value.signature(), "o");
        let err = parse_value("o", r#""not/a/path""#).expect_err("bad path");
        assert_eq!(err.kind(), ErrorKind::Semantic);

        let parsed = parse_value("g", r#""a{sv}""#).expect("sig");
        assert_eq!(parsed.value.to_string(), r#""a{sv}""#);
        let err = parse_value("g", r#""a{""#).expect_err("bad sig");
        assert_eq!(err.kind(), ErrorKind::Semantic);
    }

    #[test]
    fn arrays() {
        let parsed = parse_value("ai", "[1,2,3]").expect("array");
        assert_eq!(parsed.value, ints(&[1, 2, 3]));
        assert_eq!(parsed.consumed.signature, 2);
        assert_eq!(parsed.consumed.text, 7);

        let empty = parse_value("as", "[]").expect("empty");
        assert_eq!(
            empty.value,
            Value::Array {
                element_signature: "s".to_string(),
                items: Vec::new()
            }
        );

        let nested = parse_value("aai", "[[1],[],[2,3]]").expect("nested");
        assert_eq!(nested.consumed.text, 14);
    }

    #[test]
    fn array_failures_are_structural() {
        let err = parse_value("ai", "[1,2").expect_err("unterminated");
        assert_eq!(err.kind(), ErrorKind::Structural);
        assert_eq!(err.text_offset(), Some(4));

        assert!(parse_value("ai", "[").is_err());
        assert!(parse_value("ai", "1,2]").is_err());
        assert!(parse_value("ai", "[1;2]").is_err());
        assert!(parse_value("ai", "[1,]").is_err());

        let err = parse_value("ai", "[1,x]").expect_err("bad element");
        assert_eq!(err.kind(), ErrorKind::Literal);
        assert_eq!(err.text_offset(), Some(3));
    }

    #[test]
    fn structs() {
        let parsed = parse_value("(is)", r#"(1,"a")"#).expect("struct");
        assert_eq!(parsed.value, Value::Struct(vec![Value::from(1), Value::from("a")]));
        assert_eq!(parsed.consumed.signature, 4);
        assert_eq!(parsed.consumed.text, 7);

        let nested = parse_value("(i(sb)ad)", r#"(1,("x",true),[1.5])"#).expect("nested");
        assert_eq!(nested.value.signature(), "(i(sb)ad)");

        assert!(parse_value("(is)", r#"(1 "a")"#).is_err());
        assert!(parse_value("(is)", r#"(1,"a""#).is_err());
        assert!(parse_value("(is)", "(1)").is_err());
        assert!(parse_value("(i)", "(1,2)").is_err());
    }

    #[test]
    fn variants_carry_their_own_signature() {
        let parsed = parse_value("v", r#"s_"hi""#).expect("variant");
        assert_eq!(parsed.value, Value::Variant(Box::new(Value::from("hi"))));
        assert_eq!(
            parsed.consumed,
            Consumed {
                signature: 1,
                text: 6
            }
        );

        let parsed = parse_value("v", "ai_[1,2,3]").expect("array variant");
        assert_eq!(parsed.value, Value::Variant(Box::new(ints(&[1, 2, 3]))));

        let parsed = parse_value("av", r#"[i_1,s_"x",ai_[1]]"#).expect("variants");
        assert_eq!(parsed.value.to_string(), r#"[i_1,s_"x",ai_[1]]"#);
    }

    #[test]
    fn variant_failures() {
        assert_eq!(parse_value("v", "_1").expect_err("no sig").kind(), ErrorKind::Signature);
        assert_eq!(parse_value("v", "i32").expect_err("no underscore").kind(), ErrorKind::Structural);
        assert_eq!(parse_value("v", "i_x").expect_err("bad inner").kind(), ErrorKind::Literal);
        assert!(parse_value("v", "{sv}_{\"k\",i_1}").is_err());
    }

    #[test]
    fn dict_entries_model_maps() {
        let parsed = parse_value("a{sv}", r#"[{"k",i_1}]"#).expect("dict");
        assert_eq!(
            parsed.value,
            Value::Array {
                element_signature: "{sv}".to_string(),
                items: vec![Value::DictEntry {
                    key: BasicValue::String("k".to_string()),
                    value: Box::new(Value::Variant(Box::new(Value::from(1)))),
                }],
            }
        );

        let parsed = parse_value("a{ias}", r#"[{1,["a"]},{2,[]}]"#).expect("int keys");
        assert_eq!(parsed.consumed.text, 18);

        assert!(parse_value("a{sv}", r#"[{"k" i_1}]"#).is_err());
        assert!(parse_value("a{sv}", r#"[{"k",i_1]"#).is_err());
        assert!(parse_value("a{sv}", r#"[("k",i_1)]"#).is_err());
    }

    #[test]
    fn invalid_signatures_fail_before_text() {
        let err = parse_value("a{(i)v}", "[]").expect_err("non-basic key");
        assert_eq!(err.kind(), ErrorKind::Signature);
        assert_eq!(parse_value("{sv}", r#"{"k",i_1}"#).expect_err("bare dict").kind(), ErrorKind::Signature);
        assert_eq!(parse_value("", "1").expect_err("empty").kind(), ErrorKind::Signature);
        assert_eq!(parse_value("z", "1").expect_err("unknown").kind(), ErrorKind::Signature);
    }

    #[test]
    fn failures_never_consume() {
        let err = parse_value("i", "abc").expect_err("literal");
        assert_eq!(err.kind(), ErrorKind::Literal);
        assert_eq!(err.text_offset(), Some(0));
    }

    #[test]
    fn only_the_first_complete_type_is_used() {
        let parsed = parse_value("is", "1").expect("prefix");
        assert_eq!(parsed.consumed.signature, 1);
        let parsed = parse_value("i", "12abc").expect("prefix text");
        assert_eq!(parsed.consumed.text, 2);
    }

    #[test]
    fn error_offsets_point_into_nested_text() {
        let err = parse_value("(ia{sv})", r#"(1,[{"k",i_x}])"#).expect_err("deep literal");
        assert_eq!(err.kind(), ErrorKind::Literal);
        assert_eq!(err.text_offset(), Some(11));
    }

    #[test]
    fn deep_variant_nesting_is_capped() {
        let ok = format!("{}i_1", "v_".repeat(MAX_VALUE_DEPTH - 1));
        assert!(parse_value("v", &ok).is_ok());

        let deep = format!("{}i_1", "v_".repeat(MAX_VALUE_DEPTH + 1));
        let err = parse_value("v", &deep).expect_err("too deep");
        assert_eq!(err.kind(), ErrorKind::Structural);
    }
}
