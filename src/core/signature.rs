//! Purpose: Type-signature grammar: basic type codes, full validation, prefix measurement.
//! Exports: `BasicKind`, `Signature`, `validate_signature`, `is_valid_signature`,
//! `signature_prefix_length`.
//! Role: Leaf of the argument parser; every container parse starts by measuring a signature here.
//! Invariants: A signature accepted here is balanced, within D-Bus length/depth limits,
//! and reducible to a sequence of complete types.
//! Invariants: Dict-entries are only complete types directly after `a`, unless a caller
//! explicitly measures a bare dict-entry prefix.

use std::fmt;

use crate::core::error::{Error, ErrorKind};

pub const MAX_SIGNATURE_LEN: usize = 255;
pub const MAX_ARRAY_DEPTH: usize = 32;
pub const MAX_STRUCT_DEPTH: usize = 32;

/// The fixed, non-container scalar types of the bus type system.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum BasicKind {
    Byte,
    Boolean,
    Int16,
    Uint16,
    Int32,
    Uint32,
    Int64,
    Uint64,
    Double,
    UnixFd,
    String,
    ObjectPath,
    Signature,
}

impl BasicKind {
    pub const ALL: [BasicKind; 13] = [
        BasicKind::Byte,
        BasicKind::Boolean,
        BasicKind::Int16,
        BasicKind::Uint16,
        BasicKind::Int32,
        BasicKind::Uint32,
        BasicKind::Int64,
        BasicKind::Uint64,
        BasicKind::Double,
        BasicKind::UnixFd,
        BasicKind::String,
        BasicKind::ObjectPath,
        BasicKind::Signature,
    ];

    pub fn from_code(code: u8) -> Option<Self> {
        let kind = match code {
            b'y' => BasicKind::Byte,
            b'b' => BasicKind::Boolean,
            b'n' => BasicKind::Int16,
            b'q' => BasicKind::Uint16,
            b'i' => BasicKind::Int32,
            b'u' => BasicKind::Uint32,
            b'x' => BasicKind::Int64,
            b't' => BasicKind::Uint64,
            b'd' => BasicKind::Double,
            b'h' => BasicKind::UnixFd,
            b's' => BasicKind::String,
            b'o' => BasicKind::ObjectPath,
            b'g' => BasicKind::Signature,
            _ => return None,
        };
        Some(kind)
    }

    pub fn code(self) -> char {
        match self {
            BasicKind::Byte => 'y',
            BasicKind::Boolean => 'b',
            BasicKind::Int16 => 'n',
            BasicKind::Uint16 => 'q',
            BasicKind::Int32 => 'i',
            BasicKind::Uint32 => 'u',
            BasicKind::Int64 => 'x',
            BasicKind::Uint64 => 't',
            BasicKind::Double => 'd',
            BasicKind::UnixFd => 'h',
            BasicKind::String => 's',
            BasicKind::ObjectPath => 'o',
            BasicKind::Signature => 'g',
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            BasicKind::Byte => "byte",
            BasicKind::Boolean => "boolean",
            BasicKind::Int16 => "int16",
            BasicKind::Uint16 => "uint16",
            BasicKind::Int32 => "int32",
            BasicKind::Uint32 => "uint32",
            BasicKind::Int64 => "int64",
            BasicKind::Uint64 => "uint64",
            BasicKind::Double => "double",
            BasicKind::UnixFd => "unix_fd",
            BasicKind::String => "string",
            BasicKind::ObjectPath => "object_path",
            BasicKind::Signature => "signature",
        }
    }
}

/// A validated type signature, as carried by signature-typed (`g`) values.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Default)]
pub struct Signature(String);

impl Signature {
    pub fn new(text: impl Into<String>) -> Result<Self, Error> {
        let text = text.into();
        validate_signature(&text)?;
        Ok(Self(text))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub fn is_valid_signature(text: &str) -> bool {
    validate_signature(text).is_ok()
}

/// Validate a full signature: zero or more complete types, nothing left over.
pub fn validate_signature(text: &str) -> Result<(), Error> {
    validate_bytes(text.as_bytes())
}

/// Length of the shortest prefix of `text` that is a valid signature, or 0.
///
/// With `allow_dict_entry`, a leading `{` is measured as a dict-entry: one basic key
/// code, one complete value type, then `}`.
pub fn signature_prefix_length(text: &str, allow_dict_entry: bool) -> usize {
    prefix_length(text.as_bytes(), allow_dict_entry)
}

fn prefix_length(sig: &[u8], allow_dict_entry: bool) -> usize {
    if allow_dict_entry && sig.first() == Some(&b'{') {
        let inner = &sig[1..];
        let key_len = prefix_length(inner, false);
        if key_len != 1 || BasicKind::from_code(inner[0]).is_none() {
            return 0;
        }
        let value_len = prefix_length(&inner[key_len..], false);
        if value_len == 0 || inner.get(key_len + value_len) != Some(&b'}') {
            return 0;
        }
        return 1 + key_len + value_len + 1;
    }

    // Every extension of an over-long prefix is over-long too.
    let limit = sig.len().min(MAX_SIGNATURE_LEN);
    (1..=limit)
        .find(|&end| validate_bytes(&sig[..end]).is_ok())
        .unwrap_or(0)
}

fn validate_bytes(sig: &[u8]) -> Result<(), Error> {
    if sig.len() > MAX_SIGNATURE_LEN {
        return Err(signature_error("signature exceeds 255 characters", MAX_SIGNATURE_LEN));
    }
    let mut pos = 0;
    while pos < sig.len() {
        pos = scan_complete_type(sig, pos, 0, 0)?;
    }
    Ok(())
}

fn scan_complete_type(sig: &[u8], pos: usize, arrays: usize, structs: usize) -> Result<usize, Error> {
    let Some(&code) = sig.get(pos) else {
        return Err(signature_error("incomplete type signature", pos));
    };
    if code == b'v' || BasicKind::from_code(code).is_some() {
        return Ok(pos + 1);
    }
    match code {
        b'a' => {
            if arrays >= MAX_ARRAY_DEPTH {
                return Err(signature_error("array nesting exceeds 32 levels", pos));
            }
            if sig.get(pos + 1) == Some(&b'{') {
                scan_dict_entry(sig, pos + 1, arrays + 1, structs)
            } else {
                scan_complete_type(sig, pos + 1, arrays + 1, structs)
            }
        }
        b'(' => {
            if structs >= MAX_STRUCT_DEPTH {
                return Err(signature_error("struct nesting exceeds 32 levels", pos));
            }
            let mut cur = pos + 1;
            if sig.get(cur) == Some(&b')') {
                return Err(signature_error("struct has no fields", cur));
            }
            loop {
                if sig.get(cur) == Some(&b')') {
                    return Ok(cur + 1);
                }
                cur = scan_complete_type(sig, cur, arrays, structs + 1)?;
            }
        }
        b'{' => Err(signature_error("dict entry outside an array", pos)),
        b')' | b'}' => Err(signature_error("unbalanced closing delimiter", pos)),
        _ => Err(signature_error("unknown type code", pos)),
    }
}

fn scan_dict_entry(sig: &[u8], open: usize, arrays: usize, structs: usize) -> Result<usize, Error> {
    if structs >= MAX_STRUCT_DEPTH {
        return Err(signature_error("struct nesting exceeds 32 levels", open));
    }
    let key_pos = open + 1;
    match sig.get(key_pos) {
        Some(&code) if BasicKind::from_code(code).is_some() => {}
        Some(_) => return Err(signature_error("dict entry key must be a basic type", key_pos)),
        None => return Err(signature_error("incomplete dict entry", key_pos)),
    }
    if sig.get(key_pos + 1) == Some(&b'}') {
        return Err(signature_error("dict entry has no value type", key_pos + 1));
    }
    let end = scan_complete_type(sig, key_pos + 1, arrays, structs + 1)?;
    if sig.get(end) != Some(&b'}') {
        return Err(signature_error(
            "dict entry must hold exactly one key and one value type",
            end,
        ));
    }
    Ok(end + 1)
}

fn signature_error(message: &str, offset: usize) -> Error {
    Error::new(ErrorKind::Signature)
        .with_message(message)
        .with_signature_offset(offset)
}
