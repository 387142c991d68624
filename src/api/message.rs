//! Purpose: Define the outgoing message envelope built from parsed CLI arguments.
//! Exports: `Message`, `MessageKind`, `BusSelection`, `BusOptions`, `MessageSink`,
//! `PROPERTIES_INTERFACE`.
//! Role: Boundary to the bus transport; the transport consumes these and never
//! re-parses argument text.
//! Invariants: Names in a built `Message` are validated (path, interface, member, bus name).
//! Invariants: A property-set is a plain `Properties.Set(s, s, v)` method call.

use serde::Serialize;

use crate::core::error::Error;
use crate::core::names::{
    ObjectPath, validate_bus_name, validate_interface_name, validate_member_name,
};
use crate::core::value::Value;

pub const PROPERTIES_INTERFACE: &str = "org.freedesktop.DBus.Properties";

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    MethodCall,
    Signal,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BusSelection {
    Session,
    System,
    Address { address: String },
}

/// Connection settings handed through to the transport untouched.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct BusOptions {
    pub bus: BusSelection,
    pub timeout_ms: Option<u32>,
}

impl Default for BusOptions {
    fn default() -> Self {
        Self {
            bus: BusSelection::Session,
            timeout_ms: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Message {
    pub kind: MessageKind,
    /// Bus name the call is addressed to; signals are broadcast and have none.
    pub destination: Option<String>,
    /// Well-known name the sender owns while emitting a signal.
    pub sender_name: Option<String>,
    pub path: ObjectPath,
    pub interface: String,
    pub member: String,
    pub args: Vec<Value>,
}

impl Message {
    pub fn method_call(
        destination: &str,
        path: &str,
        interface: &str,
        method: &str,
    ) -> Result<Self, Error> {
        validate_bus_name(destination)?;
        Ok(Self {
            kind: MessageKind::MethodCall,
            destination: Some(destination.to_string()),
            sender_name: None,
            ..Self::header(path, interface, method)?
        })
    }

    pub fn signal(sender_name: &str, path: &str, interface: &str, name: &str) -> Result<Self, Error> {
        validate_bus_name(sender_name)?;
        Ok(Self {
            kind: MessageKind::Signal,
            destination: None,
            sender_name: Some(sender_name.to_string()),
            ..Self::header(path, interface, name)?
        })
    }

    /// `org.freedesktop.DBus.Properties.Set(interface, property, variant(value))`.
    pub fn property_set(
        destination: &str,
        path: &str,
        interface: &str,
        property: &str,
        value: Value,
    ) -> Result<Self, Error> {
        validate_interface_name(interface)?;
        validate_member_name(property)?;
        let message = Self::method_call(destination, path, PROPERTIES_INTERFACE, "Set")?;
        Ok(message.with_args(vec![
            Value::from(interface),
            Value::from(property),
            Value::Variant(Box::new(value)),
        ]))
    }

    fn header(path: &str, interface: &str, member: &str) -> Result<Self, Error> {
        let path = ObjectPath::new(path)
            .map_err(|err| err.with_hint(format!("Object paths look like /org/example; got `{path}`.")))?;
        validate_interface_name(interface)?;
        validate_member_name(member)?;
        Ok(Self {
            kind: MessageKind::MethodCall,
            destination: None,
            sender_name: None,
            path,
            interface: interface.to_string(),
            member: member.to_string(),
            args: Vec::new(),
        })
    }

    pub fn with_args(mut self, args: Vec<Value>) -> Self {
        self.args = args;
        self
    }

    /// Concatenated signature of all arguments, in order.
    pub fn signature(&self) -> String {
        self.args.iter().map(Value::signature).collect()
    }
}

/// Receives finished messages; implemented by the transport (or an offline writer).
pub trait MessageSink {
    fn deliver(&mut self, options: &BusOptions, message: &Message) -> Result<(), Error>;
}

#[cfg(test)]
mod tests {
    use super::{Message, MessageKind, PROPERTIES_INTERFACE};
    use crate::core::error::ErrorKind;
    use crate::core::value::Value;

    #[test]
    fn method_call_validates_names() {
        let msg = Message::method_call("org.example.App", "/org/example", "org.example.Iface", "Ping")
            .expect("valid call");
        assert_eq!(msg.kind, MessageKind::MethodCall);
        assert_eq!(msg.destination.as_deref(), Some("org.example.App"));
        assert_eq!(msg.path.as_str(), "/org/example");

        let err = Message::method_call("org.example.App", "org/example", "org.example.Iface", "Ping")
            .expect_err("bad path");
        assert_eq!(err.kind(), ErrorKind::Semantic);
        assert!(Message::method_call("org", "/", "org.example.Iface", "Ping").is_err());
        assert!(Message::method_call("org.example.App", "/", "iface", "Ping").is_err());
        assert!(Message::method_call("org.example.App", "/", "org.example.Iface", "1Ping").is_err());
    }

    #[test]
    fn signal_has_sender_but_no_destination() {
        let msg = Message::signal("org.example.App", "/", "org.example.Iface", "Changed")
            .expect("valid signal")
            .with_args(vec![Value::from(1), Value::from("x")]);
        assert_eq!(msg.kind, MessageKind::Signal);
        assert!(msg.destination.is_none());
        assert_eq!(msg.sender_name.as_deref(), Some("org.example.App"));
        assert_eq!(msg.signature(), "is");
    }

    #[test]
    fn property_set_wraps_value_in_variant() {
        let msg = Message::property_set("org.example.App", "/", "org.example.Iface", "Volume", Value::from(7))
            .expect("valid set");
        assert_eq!(msg.interface, PROPERTIES_INTERFACE);
        assert_eq!(msg.member, "Set");
        assert_eq!(msg.signature(), "ssv");
        assert_eq!(msg.args[2], Value::Variant(Box::new(Value::from(7))));
    }
}
