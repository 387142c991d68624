//! Purpose: Command-line argument conventions on top of the core value parser.
//! Exports: `parse_argument`, `bare_argument`, `parse_argument_list`.
//! Role: Turns user `signature value` tokens into typed values for outgoing messages.
//! Invariants: A pair must use its whole signature (one complete type) and its whole text.
//! Invariants: A single token uses the bare shorthand: boolean, decimal int32, else string.

use tracing::debug;

use crate::core::error::{Error, ErrorKind};
use crate::core::parser::parse_value;
use crate::core::value::Value;

pub fn parse_argument(signature: &str, text: &str) -> Result<Value, Error> {
    let parsed = parse_value(signature, text)?;
    if parsed.consumed.signature != signature.len() {
        return Err(Error::new(ErrorKind::Signature)
            .with_message("signature must be a single complete type")
            .with_hint("Pass one signature/value pair per argument, e.g. `i 42 s '\"x\"'`.")
            .with_signature_offset(parsed.consumed.signature));
    }
    if parsed.consumed.text != text.len() {
        return Err(Error::new(ErrorKind::Structural)
            .with_message("unexpected text after value")
            .with_text_offset(parsed.consumed.text));
    }
    Ok(parsed.value)
}

/// Value for a lone argument given without a signature.
pub fn bare_argument(text: &str) -> Value {
    match text {
        "true" => Value::from(true),
        "false" => Value::from(false),
        _ => match text.parse::<i32>() {
            Ok(number) => Value::from(number),
            Err(_) => Value::from(text),
        },
    }
}

/// Parse the trailing arguments of `call`/`signal`.
///
/// Exactly one token uses `bare_argument`; otherwise tokens are `signature value` pairs.
pub fn parse_argument_list(tokens: &[String]) -> Result<Vec<Value>, Error> {
    match tokens {
        [] => Ok(Vec::new()),
        [single] => {
            let value = bare_argument(single);
            debug!(signature = %value.signature(), "bare argument");
            Ok(vec![value])
        }
        _ if tokens.len() % 2 == 1 => Err(Error::new(ErrorKind::Usage)
            .with_message("Invalid argument format, missing signature or value.")
            .with_hint("Arguments are `signature value` pairs, e.g. `s '\"hi\"' ai '[1,2]'`.")),
        _ => tokens
            .chunks(2)
            .enumerate()
            .map(|(index, pair)| {
                let value = parse_pair(index, &pair[0], &pair[1])?;
                debug!(index, signature = %pair[0], "parsed argument");
                Ok(value)
            })
            .collect(),
    }
}

/// A pair token list for commands that take exactly one value (`set`).
pub fn parse_single_value(tokens: &[String]) -> Result<Value, Error> {
    match tokens {
        [single] => Ok(bare_argument(single)),
        [signature, text] => parse_pair(0, signature, text),
        _ => Err(Error::new(ErrorKind::Usage)
            .with_message("expected `[signature] value`")
            .with_hint("Give a value, optionally preceded by its signature, e.g. `u 42`.")),
    }
}

fn parse_pair(index: usize, signature: &str, text: &str) -> Result<Value, Error> {
    parse_argument(signature, text).map_err(|err| {
        let detail = err.message().unwrap_or("parse failed").to_string();
        let mut wrapped = Error::new(err.kind())
            .with_message("Invalid argument format.")
            .with_hint(format!(
                "Argument {} (`{signature}` `{text}`): {detail}.",
                index + 1
            ));
        if let Some(offset) = err.signature_offset() {
            wrapped = wrapped.with_signature_offset(offset);
        }
        if let Some(offset) = err.text_offset() {
            wrapped = wrapped.with_text_offset(offset);
        }
        wrapped.with_source(err)
    })
}
