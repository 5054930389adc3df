//! In-memory model of a self-describing dbus message body.
//!
//! A received message is a flat sequence of top-level arguments, each of which
//! may be a container. Navigation over it happens through [`Cursor`], which
//! only ever walks containers positionally.

mod convert;
mod cursor;

pub use convert::{message_args, value_to_message};
pub use cursor::{Cursor, Shape, Step};

/// The kind of value found under a cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    /// Past the end of a container, or an empty position.
    Invalid,
    String,
    ObjectPath,
    Array,
    DictEntry,
    Variant,
    /// Any other value. Never carries readable text.
    Opaque,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MessageValue {
    Invalid,
    String(String),
    ObjectPath(String),
    /// An array together with the signature of its elements, so that an
    /// empty array still has a full signature.
    Array {
        element_signature: String,
        items: Vec<MessageValue>,
    },
    /// Key and value, stored contiguously so a cursor can walk them.
    DictEntry(Box<[MessageValue; 2]>),
    Variant(Box<MessageValue>),
    Opaque(String),
}

impl MessageValue {
    pub fn string(value: impl Into<String>) -> Self {
        MessageValue::String(value.into())
    }

    pub fn variant(inner: MessageValue) -> Self {
        MessageValue::Variant(Box::new(inner))
    }

    pub fn entry(key: MessageValue, value: MessageValue) -> Self {
        MessageValue::DictEntry(Box::new([key, value]))
    }

    pub fn array(element_signature: impl Into<String>, items: Vec<MessageValue>) -> Self {
        MessageValue::Array {
            element_signature: element_signature.into(),
            items,
        }
    }

    /// Builds an `a{sv}` dictionary from `(key, value)` pairs, wrapping every
    /// value in a variant.
    pub fn string_dict<K>(pairs: impl IntoIterator<Item = (K, MessageValue)>) -> Self
    where
        K: Into<String>,
    {
        let items = pairs
            .into_iter()
            .map(|(key, value)| {
                MessageValue::entry(MessageValue::string(key), MessageValue::variant(value))
            })
            .collect();
        MessageValue::array("{sv}", items)
    }

    pub fn value_type(&self) -> ValueType {
        match self {
            MessageValue::Invalid => ValueType::Invalid,
            MessageValue::String(_) => ValueType::String,
            MessageValue::ObjectPath(_) => ValueType::ObjectPath,
            MessageValue::Array { .. } => ValueType::Array,
            MessageValue::DictEntry(_) => ValueType::DictEntry,
            MessageValue::Variant(_) => ValueType::Variant,
            MessageValue::Opaque(_) => ValueType::Opaque,
        }
    }

    /// The full dbus type signature of this value, e.g. `a{sv}`.
    pub fn signature(&self) -> String {
        match self {
            MessageValue::Invalid => String::new(),
            MessageValue::String(_) => "s".to_string(),
            MessageValue::ObjectPath(_) => "o".to_string(),
            MessageValue::Array {
                element_signature, ..
            } => format!("a{element_signature}"),
            MessageValue::DictEntry(pair) => {
                format!("{{{}{}}}", pair[0].signature(), pair[1].signature())
            }
            MessageValue::Variant(_) => "v".to_string(),
            MessageValue::Opaque(signature) => signature.clone(),
        }
    }

    /// Children of a container, in order. Leaves have none.
    pub(crate) fn children(&self) -> Option<&[MessageValue]> {
        match self {
            MessageValue::Array { items, .. } => Some(items),
            MessageValue::DictEntry(pair) => Some(&pair[..]),
            MessageValue::Variant(inner) => Some(std::slice::from_ref(&**inner)),
            _ => None,
        }
    }
}
