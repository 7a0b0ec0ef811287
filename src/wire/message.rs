//! Message envelope
//!
//! Every message crossing the transport is exactly a two-element list:
//! `[tag (string), payload (list)]`. Anything else is a protocol-fatal
//! violation that tears the session down.

use super::value::Value;

/// A decoded `(tag, payload)` message envelope
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub tag: String,
    pub payload: Vec<Value>,
}

impl Message {
    pub fn new(tag: impl Into<String>, payload: Vec<Value>) -> Self {
        Self {
            tag: tag.into(),
            payload,
        }
    }

    /// Validate and unpack a raw wire value into an envelope.
    ///
    /// Returns `None` if the value is not exactly `[Str, List]`.
    pub fn from_value(value: Value) -> Option<Self> {
        let Value::List(items) = value else {
            return None;
        };
        let Ok([tag, payload]) = <[Value; 2]>::try_from(items) else {
            return None;
        };
        match (tag, payload) {
            (Value::Str(tag), Value::List(payload)) => Some(Self { tag, payload }),
            _ => None,
        }
    }

    /// Pack the envelope back into a raw wire value
    pub fn into_value(self) -> Value {
        Value::List(vec![Value::Str(self.tag), Value::List(self.payload)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip() {
        let msg = Message::new("break", vec![]);
        let unpacked = Message::from_value(msg.clone().into_value()).unwrap();
        assert_eq!(unpacked, msg);
    }

    #[test]
    fn rejects_bad_envelopes() {
        assert!(Message::from_value(Value::Int(1)).is_none());
        assert!(Message::from_value(Value::List(vec![Value::Str("x".into())])).is_none());
        assert!(Message::from_value(Value::List(vec![
            Value::Int(1),
            Value::List(vec![]),
        ]))
        .is_none());
        assert!(Message::from_value(Value::List(vec![
            Value::Str("x".into()),
            Value::Str("not a list".into()),
        ]))
        .is_none());
    }
}
