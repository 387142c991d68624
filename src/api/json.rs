//! Purpose: JSON envelopes for parsed values and outgoing messages.
//! Exports: `value_json`, `message_json`, `parsed_json`.
//! Role: Keep the machine-readable shapes identical across CLI commands and sinks.
//! Invariants: Every node carries a `type`; basic nodes carry their payload in `value`.
//! Invariants: Key names are additive-only once published.

use serde_json::{Map, Value as Json, json};

use crate::api::message::{BusOptions, Message};
use crate::core::parser::Parsed;
use crate::core::value::{BasicValue, Value};

pub fn value_json(value: &Value) -> Json {
    match value {
        Value::Basic(basic) => basic_json(basic),
        Value::Array {
            element_signature,
            items,
        } => json!({
            "type": "array",
            "element_signature": element_signature,
            "items": items.iter().map(value_json).collect::<Vec<_>>(),
        }),
        Value::Struct(fields) => json!({
            "type": "struct",
            "fields": fields.iter().map(value_json).collect::<Vec<_>>(),
        }),
        Value::Variant(inner) => json!({
            "type": "variant",
            "signature": inner.signature(),
            "value": value_json(inner),
        }),
        Value::DictEntry { key, value } => json!({
            "type": "dict_entry",
            "key": basic_json(key),
            "value": value_json(value),
        }),
    }
}

fn basic_json(basic: &BasicValue) -> Json {
    let payload = match basic {
        BasicValue::Byte(v) => json!(v),
        BasicValue::Boolean(v) => json!(v),
        BasicValue::Int16(v) => json!(v),
        BasicValue::Uint16(v) => json!(v),
        BasicValue::Int32(v) => json!(v),
        BasicValue::Uint32(v) => json!(v),
        BasicValue::Int64(v) => json!(v),
        BasicValue::Uint64(v) => json!(v),
        BasicValue::Double(v) => json!(v),
        BasicValue::UnixFd(v) => json!(v),
        BasicValue::String(v) => json!(v),
        BasicValue::ObjectPath(v) => json!(v.as_str()),
        BasicValue::Signature(v) => json!(v.as_str()),
    };
    json!({ "type": basic.kind().name(), "value": payload })
}

pub fn parsed_json(signature: &str, text: &str, parsed: &Parsed) -> Json {
    let mut inner = Map::new();
    inner.insert("signature".to_string(), json!(parsed.value.signature()));
    inner.insert("value".to_string(), value_json(&parsed.value));
    inner.insert("text".to_string(), json!(parsed.value.to_string()));
    inner.insert(
        "consumed".to_string(),
        json!({
            "signature": parsed.consumed.signature,
            "text": parsed.consumed.text,
        }),
    );
    let rest_sig = &signature[parsed.consumed.signature..];
    let rest_text = &text[parsed.consumed.text..];
    if !rest_sig.is_empty() || !rest_text.is_empty() {
        inner.insert(
            "remaining".to_string(),
            json!({ "signature": rest_sig, "text": rest_text }),
        );
    }

    let mut outer = Map::new();
    outer.insert("parsed".to_string(), Json::Object(inner));
    Json::Object(outer)
}

pub fn message_json(options: &BusOptions, message: &Message) -> Json {
    let mut inner = Map::new();
    inner.insert("type".to_string(), json!(message.kind));
    inner.insert("bus".to_string(), json!(options.bus));
    if let Some(timeout) = options.timeout_ms {
        inner.insert("timeout_ms".to_string(), json!(timeout));
    }
    if let Some(destination) = &message.destination {
        inner.insert("destination".to_string(), json!(destination));
    }
    if let Some(sender) = &message.sender_name {
        inner.insert("sender_name".to_string(), json!(sender));
    }
    inner.insert("path".to_string(), json!(message.path.as_str()));
    inner.insert("interface".to_string(), json!(message.interface));
    inner.insert("member".to_string(), json!(message.member));
    inner.insert("signature".to_string(), json!(message.signature()));
    inner.insert(
        "args".to_string(),
        Json::Array(message.args.iter().map(value_json).collect()),
    );

    let mut outer = Map::new();
    outer.insert("message".to_string(), Json::Object(inner));
    Json::Object(outer)
}
