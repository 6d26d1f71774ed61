//! Inbound messages and outbound commands.
//!
//! Both are plain immutable values. A [`Message`] drives one state
//! transition; a [`Command`] asks the host to perform a side effect outside
//! the pure core. Action tags are open strings here because this is the
//! wire boundary; applications decode them into closed intent enums.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::RuntimeError;

// Bounds of the floats that convert to i64 exactly: [-2^63, 2^63).
const I64_LOWER: f64 = -9_223_372_036_854_775_808.0;
const I64_UPPER: f64 = 9_223_372_036_854_775_808.0;

/// Structured payload carried by messages and commands.
pub type Payload = serde_json::Map<String, Value>;

/// Scalar value attached to a message (typically an input's value).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Scalar {
    /// Borrow the value as text, if it is text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Scalar::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Interpret the value as an integer.
    ///
    /// Browser inputs deliver numbers as strings, so numeric text is accepted.
    /// Floats are accepted only when they have no fractional part.
    pub fn to_i64(&self) -> Option<i64> {
        match self {
            Scalar::Int(value) => Some(*value),
            // `as` saturates, so out-of-range floats must be refused first.
            Scalar::Float(value)
                if value.fract() == 0.0 && *value >= I64_LOWER && *value < I64_UPPER =>
            {
                Some(*value as i64)
            }
            Scalar::Text(text) => text.trim().parse().ok(),
            _ => None,
        }
    }

    /// Interpret the value as a float. Numeric text is accepted.
    pub fn to_f64(&self) -> Option<f64> {
        match self {
            Scalar::Int(value) => Some(*value as f64),
            Scalar::Float(value) => Some(*value),
            Scalar::Text(text) => text.trim().parse().ok(),
            Scalar::Bool(_) => None,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Bool(value) => write!(f, "{}", value),
            Scalar::Int(value) => write!(f, "{}", value),
            Scalar::Float(value) => write!(f, "{}", value),
            Scalar::Text(value) => f.write_str(value),
        }
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Scalar::Bool(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Int(value)
    }
}

impl From<i32> for Scalar {
    fn from(value: i32) -> Self {
        Scalar::Int(i64::from(value))
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Scalar::Float(value)
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Text(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::Text(value)
    }
}

/// One inbound event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Action tag. Defaults to empty on decode so the runtime, not the JSON
    /// decoder, reports the missing tag.
    #[serde(default)]
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Payload>,
}

impl Message {
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            value: None,
            payload: None,
        }
    }

    pub fn with_value(mut self, value: impl Into<Scalar>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_payload(mut self, payload: Payload) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Look up a single payload field.
    pub fn payload_field(&self, key: &str) -> Option<&Value> {
        self.payload.as_ref().and_then(|payload| payload.get(key))
    }

    /// Reject messages that must never reach a reducer.
    pub fn validate(&self) -> Result<(), RuntimeError> {
        if self.action.trim().is_empty() {
            return Err(RuntimeError::MalformedMessage {
                reason: "action tag is empty".to_string(),
            });
        }
        Ok(())
    }
}

/// One outbound side-effect request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Command {
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Payload>,
}

impl Command {
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            payload: None,
        }
    }

    pub fn with_payload(mut self, payload: Payload) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Attach a single payload field, creating the payload if needed.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.payload
            .get_or_insert_with(Payload::new)
            .insert(key.into(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn scalar_decodes_json_numbers_and_text() {
        let message: Message =
            serde_json::from_value(json!({"action": "PlaceBet", "value": 25})).unwrap();
        assert_eq!(message.value, Some(Scalar::Int(25)));

        let message: Message =
            serde_json::from_value(json!({"action": "changeSpeed", "value": 1.5})).unwrap();
        assert_eq!(message.value, Some(Scalar::Float(1.5)));

        let message: Message =
            serde_json::from_value(json!({"action": "setTime", "value": "12:00"})).unwrap();
        assert_eq!(message.value, Some(Scalar::Text("12:00".into())));
    }

    #[test]
    fn numeric_text_is_accepted() {
        assert_eq!(Scalar::from("25").to_i64(), Some(25));
        assert_eq!(Scalar::from(" 2.5 ").to_f64(), Some(2.5));
        assert_eq!(Scalar::from("abc").to_i64(), None);
        assert_eq!(Scalar::Float(3.0).to_i64(), Some(3));
        assert_eq!(Scalar::Float(3.5).to_i64(), None);
        assert_eq!(Scalar::Float(-3.0).to_i64(), Some(-3));
        assert_eq!(Scalar::Bool(true).to_f64(), None);
    }

    #[test]
    fn out_of_range_floats_are_not_integers() {
        assert_eq!(Scalar::Float(1e20).to_i64(), None);
        assert_eq!(Scalar::Float(-1e20).to_i64(), None);
        assert_eq!(Scalar::Float(9_223_372_036_854_775_808.0).to_i64(), None);
        assert_eq!(Scalar::Float(f64::INFINITY).to_i64(), None);
        assert_eq!(Scalar::Float(f64::NAN).to_i64(), None);
        assert_eq!(Scalar::Float(-9_223_372_036_854_775_808.0).to_i64(), Some(i64::MIN));
    }

    #[test]
    fn missing_action_decodes_but_fails_validation() {
        let message: Message = serde_json::from_value(json!({"value": 1})).unwrap();
        assert!(message.action.is_empty());
        assert!(matches!(
            message.validate(),
            Err(RuntimeError::MalformedMessage { .. })
        ));
    }

    #[test]
    fn whitespace_action_is_malformed() {
        assert!(Message::new("   ").validate().is_err());
        assert!(Message::new("Deal").validate().is_ok());
    }

    #[test]
    fn command_fields_build_payload() {
        let command = Command::new("setColor").with_field("color", "#00ff00");
        assert_eq!(
            command.payload.as_ref().and_then(|p| p.get("color")),
            Some(&json!("#00ff00"))
        );
    }

    #[test]
    fn absent_optionals_are_not_serialized() {
        let encoded = serde_json::to_value(Command::new("getTime")).unwrap();
        assert_eq!(encoded, json!({"action": "getTime"}));
    }
}
