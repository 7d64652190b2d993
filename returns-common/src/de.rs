//! Lenient deserializers for carrier and form payloads.
//!
//! The carrier sends `null` where a string is expected, and form clients send
//! numbers where the form holds text. Both are folded into plain values here
//! so the rest of the code can work with `String` fields.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Treat an explicit `null` the same as a missing field.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accept a string, number or bool and keep it as text. `null` becomes "".
pub fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Null => String::new(),
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Probe {
        #[serde(default, deserialize_with = "lenient_string")]
        text: String,
        #[serde(default, deserialize_with = "null_as_default")]
        items: Vec<u32>,
    }

    #[test]
    fn test_lenient_string_accepts_numbers() {
        let p: Probe = serde_json::from_str(r#"{"text": 12.5, "items": null}"#).unwrap();
        assert_eq!(p.text, "12.5");
        assert!(p.items.is_empty());
    }

    #[test]
    fn test_missing_and_null_fields() {
        let p: Probe = serde_json::from_str(r#"{"text": null}"#).unwrap();
        assert_eq!(p.text, "");
        let p: Probe = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(p.text, "");
    }
}
