//! Purpose: Typed value tree produced by the argument parser.
//! Exports: `BasicValue`, `Value`.
//! Role: Hand-off type between text parsing and the outgoing-message layer.
//! Invariants: Array items conform to the recorded element signature; dict-entry keys are basic.
//! Invariants: `Display` renders text that parses back to an equal value under `signature()`
//! (finite doubles only).

use std::fmt::{self, Write as _};

use crate::core::names::ObjectPath;
use crate::core::signature::{BasicKind, Signature};

#[derive(Clone, Debug, PartialEq)]
pub enum BasicValue {
    Byte(u8),
    Boolean(bool),
    Int16(i16),
    Uint16(u16),
    Int32(i32),
    Uint32(u32),
    Int64(i64),
    Uint64(u64),
    Double(f64),
    UnixFd(u32),
    String(String),
    ObjectPath(ObjectPath),
    Signature(Signature),
}

impl BasicValue {
    pub fn kind(&self) -> BasicKind {
        match self {
            BasicValue::Byte(_) => BasicKind::Byte,
            BasicValue::Boolean(_) => BasicKind::Boolean,
            BasicValue::Int16(_) => BasicKind::Int16,
            BasicValue::Uint16(_) => BasicKind::Uint16,
            BasicValue::Int32(_) => BasicKind::Int32,
            BasicValue::Uint32(_) => BasicKind::Uint32,
            BasicValue::Int64(_) => BasicKind::Int64,
            BasicValue::Uint64(_) => BasicKind::Uint64,
            BasicValue::Double(_) => BasicKind::Double,
            BasicValue::UnixFd(_) => BasicKind::UnixFd,
            BasicValue::String(_) => BasicKind::String,
            BasicValue::ObjectPath(_) => BasicKind::ObjectPath,
            BasicValue::Signature(_) => BasicKind::Signature,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Basic(BasicValue),
    Array {
        element_signature: String,
        items: Vec<Value>,
    },
    Struct(Vec<Value>),
    Variant(Box<Value>),
    DictEntry {
        key: BasicValue,
        value: Box<Value>,
    },
}

impl Value {
    /// The single complete type signature describing this value.
    pub fn signature(&self) -> String {
        let mut out = String::new();
        self.write_signature(&mut out);
        out
    }

    fn write_signature(&self, out: &mut String) {
        match self {
            Value::Basic(basic) => out.push(basic.kind().code()),
            Value::Array {
                element_signature, ..
            } => {
                out.push('a');
                out.push_str(element_signature);
            }
            Value::Struct(fields) => {
                out.push('(');
                for field in fields {
                    field.write_signature(out);
                }
                out.push(')');
            }
            Value::Variant(_) => out.push('v'),
            Value::DictEntry { key, value } => {
                out.push('{');
                out.push(key.kind().code());
                value.write_signature(out);
                out.push('}');
            }
        }
    }

    pub fn as_basic(&self) -> Option<&BasicValue> {
        match self {
            Value::Basic(basic) => Some(basic),
            _ => None,
        }
    }
}

impl From<BasicValue> for Value {
    fn from(value: BasicValue) -> Self {
        Value::Basic(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Basic(BasicValue::Boolean(value))
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Basic(BasicValue::Int32(value))
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Basic(BasicValue::String(value.to_string()))
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Basic(BasicValue::String(value))
    }
}

impl fmt::Display for BasicValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BasicValue::Byte(v) => write!(f, "{v}"),
            BasicValue::Boolean(v) => write!(f, "{v}"),
            BasicValue::Int16(v) => write!(f, "{v}"),
            BasicValue::Uint16(v) => write!(f, "{v}"),
            BasicValue::Int32(v) => write!(f, "{v}"),
            BasicValue::Uint32(v) => write!(f, "{v}"),
            BasicValue::Int64(v) => write!(f, "{v}"),
            BasicValue::Uint64(v) => write!(f, "{v}"),
            BasicValue::Double(v) => write!(f, "{v}"),
            BasicValue::UnixFd(v) => write!(f, "{v}"),
            BasicValue::String(v) => write_quoted(f, v),
            BasicValue::ObjectPath(v) => write_quoted(f, v.as_str()),
            BasicValue::Signature(v) => write_quoted(f, v.as_str()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Basic(basic) => write!(f, "{basic}"),
            Value::Array { items, .. } => {
                f.write_char('[')?;
                for (idx, item) in items.iter().enumerate() {
                    if idx > 0 {
                        f.write_char(',')?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_char(']')
            }
            Value::Struct(fields) => {
                f.write_char('(')?;
                for (idx, field) in fields.iter().enumerate() {
                    if idx > 0 {
                        f.write_char(',')?;
                    }
                    write!(f, "{field}")?;
                }
                f.write_char(')')
            }
            Value::Variant(inner) => write!(f, "{}_{inner}", inner.signature()),
            Value::DictEntry { key, value } => write!(f, "{{{key},{value}}}"),
        }
    }
}

fn write_quoted(f: &mut fmt::Formatter<'_>, text: &str) -> fmt::Result {
    f.write_char('"')?;
    for c in text.chars() {
        match c {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\u{8}' => f.write_str("\\b")?,
            '\u{c}' => f.write_str("\\f")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            '\t' => f.write_str("\\t")?,
            other => f.write_char(other)?,
        }
    }
    f.write_char('"')
}

#[cfg(test)]
mod tests {
    use super::{BasicValue, Value};
    use crate::core::names::ObjectPath;

    fn props() -> Value {
        Value::Array {
            element_signature: "{sv}".to_string(),
            items: vec![Value::DictEntry {
                key: BasicValue::String("k".to_string()),
                value: Box::new(Value::Variant(Box::new(Value::from(1)))),
            }],
        }
    }

    #[test]
    fn signature_is_derived_from_structure() {
        assert_eq!(Value::from(true).signature(), "b");
        assert_eq!(props().signature(), "a{sv}");
        let s = Value::Struct(vec![
            Value::from(1),
            Value::Basic(BasicValue::ObjectPath(ObjectPath::root())),
            props(),
        ]);
        assert_eq!(s.signature(), "(ioa{sv})");
    }

    #[test]
    fn display_renders_parser_text() {
        assert_eq!(props().to_string(), r#"[{"k",i_1}]"#);
        let s = Value::Struct(vec![Value::from(-3), Value::from("a\"b\n")]);
        assert_eq!(s.to_string(), r#"(-3,"a\"b\n")"#);
        assert_eq!(Value::Basic(BasicValue::Double(0.5)).to_string(), "0.5");
        let empty = Value::Array {
            element_signature: "s".to_string(),
            items: Vec::new(),
        };
        assert_eq!(empty.to_string(), "[]");
        assert_eq!(empty.signature(), "as");
    }

    #[test]
    fn nested_variant_renders_its_inner_signature() {
        let inner = Value::Array {
            element_signature: "i".to_string(),
            items: vec![Value::from(1), Value::from(2)],
        };
        let v = Value::Variant(Box::new(Value::Variant(Box::new(inner))));
        assert_eq!(v.to_string(), "v_ai_[1,2]");
    }
}
