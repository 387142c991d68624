// Name rules for object paths, interfaces, members and bus names.
// Object paths are also a basic value type, so `ObjectPath` lives here.
use std::fmt;

use crate::core::error::{Error, ErrorKind};

const MAX_NAME_LEN: usize = 255;

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct ObjectPath(String);

impl ObjectPath {
    pub fn new(text: impl Into<String>) -> Result<Self, Error> {
        let text = text.into();
        validate_object_path(&text)?;
        Ok(Self(text))
    }

    pub fn root() -> Self {
        Self("/".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub fn validate_object_path(path: &str) -> Result<(), Error> {
    let Some(rest) = path.strip_prefix('/') else {
        return Err(semantic("object path must start with '/'", path));
    };
    if rest.is_empty() {
        return Ok(());
    }
    for element in rest.split('/') {
        if element.is_empty() {
            return Err(semantic("object path has an empty element", path));
        }
        if !element.bytes().all(is_name_byte) {
            return Err(semantic(
                "object path elements may only contain [A-Za-z0-9_]",
                path,
            ));
        }
    }
    Ok(())
}

pub fn validate_interface_name(name: &str) -> Result<(), Error> {
    check_len(name)?;
    let elements: Vec<&str> = name.split('.').collect();
    if elements.len() < 2 {
        return Err(semantic("interface name needs at least two elements", name));
    }
    if !elements.iter().all(|element| is_identifier(element, false)) {
        return Err(semantic("invalid interface name element", name));
    }
    Ok(())
}

pub fn validate_member_name(name: &str) -> Result<(), Error> {
    check_len(name)?;
    if !is_identifier(name, false) {
        return Err(semantic("member names may only contain [A-Za-z0-9_] and must not start with a digit", name));
    }
    Ok(())
}

/// Accepts unique names (`:1.42`) and well-known names (`org.example.App`).
pub fn validate_bus_name(name: &str) -> Result<(), Error> {
    check_len(name)?;
    let (unique, body) = match name.strip_prefix(':') {
        Some(body) => (true, body),
        None => (false, name),
    };
    let elements: Vec<&str> = body.split('.').collect();
    if elements.len() < 2 {
        return Err(semantic("bus name needs at least two elements", name));
    }
    let valid = elements.iter().all(|element| {
        if unique {
            !element.is_empty() && element.bytes().all(|b| is_name_byte(b) || b == b'-')
        } else {
            is_identifier(element, true)
        }
    });
    if !valid {
        return Err(semantic("invalid bus name element", name));
    }
    Ok(())
}

fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

fn is_identifier(element: &str, allow_hyphen: bool) -> bool {
    let allowed = |b: u8| is_name_byte(b) || (allow_hyphen && b == b'-');
    match element.as_bytes().split_first() {
        Some((first, rest)) => !first.is_ascii_digit() && allowed(*first) && rest.iter().all(|b| allowed(*b)),
        None => false,
    }
}

fn check_len(name: &str) -> Result<(), Error> {
    if name.is_empty() || name.len() > MAX_NAME_LEN {
        return Err(semantic("name must be 1 to 255 characters", name));
    }
    Ok(())
}

fn semantic(message: &str, name: &str) -> Error {
    Error::new(ErrorKind::Semantic)
        .with_message(message)
        .with_hint(format!("Got `{name}`."))
}
