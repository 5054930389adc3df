use zbus::zvariant::{Structure, Value};
use zbus::Message;

use super::MessageValue;
use crate::error::App;

/// Converts the body of a received message into its top-level arguments.
pub fn message_args(message: &Message) -> Result<Vec<MessageValue>, App> {
    let body = message.body();
    let structure: Structure<'_> = body.deserialize()?;
    Ok(structure.fields().iter().map(value_to_message).collect())
}

pub fn value_to_message(value: &Value<'_>) -> MessageValue {
    match value {
        Value::Str(s) => MessageValue::String(s.as_str().to_string()),
        Value::ObjectPath(path) => MessageValue::ObjectPath(path.as_str().to_string()),
        Value::Value(inner) => MessageValue::variant(value_to_message(inner)),
        Value::Array(array) => MessageValue::array(
            array.element_signature().to_string(),
            array.iter().map(value_to_message).collect(),
        ),
        Value::Dict(dict) => {
            let signature = value.value_signature().to_string();
            let element_signature = signature.strip_prefix('a').unwrap_or(&signature);
            MessageValue::array(
                element_signature,
                dict.iter()
                    .map(|(key, value)| {
                        MessageValue::entry(value_to_message(key), value_to_message(value))
                    })
                    .collect(),
            )
        }
        other => MessageValue::Opaque(other.value_signature().to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use crate::message::{Cursor, Step, ValueType};

    #[test]
    fn strings_and_paths_keep_their_kind() {
        assert_eq!(
            value_to_message(&Value::from("Playing")),
            MessageValue::string("Playing")
        );
        let path = zbus::zvariant::ObjectPath::try_from("/com/spotify/track/1").unwrap();
        assert_eq!(
            value_to_message(&Value::from(path)),
            MessageValue::ObjectPath("/com/spotify/track/1".into())
        );
    }

    #[test]
    fn variant_wrapped_string_array() {
        let artists = Value::from(vec!["Eminem", "Dido"]);
        let wrapped = Value::Value(Box::new(artists));
        let converted = value_to_message(&wrapped);
        assert_eq!(converted.signature(), "v");

        let values = [converted];
        let mut cursor = Cursor::new(&values);
        assert!(cursor.step_into_type(ValueType::Variant));
        assert!(cursor.step_into_signature("as"));
        assert_eq!(cursor.read_string(), Some("Eminem"));
    }

    #[test]
    fn metadata_dict_keeps_its_entry_signature() {
        let mut metadata = HashMap::new();
        metadata.insert("xesam:title", Value::from("Stan"));
        let wrapped = Value::Value(Box::new(Value::from(metadata)));

        let converted = value_to_message(&wrapped);
        let MessageValue::Variant(inner) = &converted else {
            panic!("expected a variant, got {converted:?}");
        };
        let MessageValue::Array {
            element_signature, ..
        } = inner.as_ref()
        else {
            panic!("expected an array, got {inner:?}");
        };
        assert_eq!(element_signature, "{sv}");

        let values = [converted];
        let title = Cursor::new(&values)
            .follow(&[
                Step::Type(ValueType::Variant),
                Step::Signature("a{sv}"),
                Step::Key("xesam:title"),
                Step::Type(ValueType::Variant),
            ])
            .and_then(|cursor| cursor.read_string());
        assert_eq!(title, Some("Stan"));
    }

    #[test]
    fn numbers_become_opaque() {
        assert_eq!(
            value_to_message(&Value::from(125_996_000_u64)),
            MessageValue::Opaque("t".into())
        );
        assert_eq!(
            value_to_message(&Value::from(0.56_f64)),
            MessageValue::Opaque("d".into())
        );
    }
}
