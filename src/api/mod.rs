//! Purpose: Define the stable public Rust API boundary for dbus-tool.
//! Exports: Value model, parser entry points, argument conventions, message envelope.
//! Role: Public, additive-only surface used by the CLI binary and integration tests.
//! Invariants: The binary reaches core functionality only through this module.
//! Invariants: Nothing here performs bus I/O; transports plug in via `MessageSink`.

mod args;
mod json;
mod message;

#[doc(hidden)]
pub use crate::core::error::to_exit_code;
pub use crate::core::error::{Error, ErrorKind};
pub use crate::core::names::{
    ObjectPath, validate_bus_name, validate_interface_name, validate_member_name,
    validate_object_path,
};
pub use crate::core::parser::{Consumed, MAX_VALUE_DEPTH, Parsed, parse_value};
pub use crate::core::signature::{
    BasicKind, Signature, is_valid_signature, signature_prefix_length, validate_signature,
};
pub use crate::core::value::{BasicValue, Value};
pub use args::{bare_argument, parse_argument, parse_argument_list, parse_single_value};
pub use json::{message_json, parsed_json, value_json};
pub use message::{
    BusOptions, BusSelection, Message, MessageKind, MessageSink, PROPERTIES_INTERFACE,
};
