//! Encoding of a message sequence into its storage slot

use serde_json::Value;

use super::message::ChatMessage;

/// Serialize the full sequence as a JSON array
pub fn encode(messages: &[ChatMessage]) -> crate::Result<String> {
    Ok(serde_json::to_string(messages)?)
}

/// Parse a stored sequence
///
/// An empty array is rejected like any malformed value: an empty session
/// is indistinguishable from no session at all.
pub fn decode(raw: &str) -> crate::Result<Vec<ChatMessage>> {
    let value: Value = serde_json::from_str(raw)
        .map_err(|e| crate::Error::Decode(format!("invalid JSON: {}", e)))?;

    let items = match value {
        Value::Array(items) => items,
        other => {
            return Err(crate::Error::Decode(format!(
                "expected an array, found {}",
                json_kind(&other)
            )))
        }
    };

    if items.is_empty() {
        return Err(crate::Error::Decode("empty message sequence".to_string()));
    }

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            serde_json::from_value::<ChatMessage>(item)
                .map_err(|e| crate::Error::Decode(format!("message {}: {}", index, e)))
        })
        .collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::message::Role;
    use proptest::prelude::*;

    fn arb_message() -> impl Strategy<Value = ChatMessage> {
        (
            any::<String>(),
            prop_oneof![Just(Role::User), Just(Role::Assistant)],
            any::<String>(),
            any::<i64>(),
        )
            .prop_map(|(id, role, content, timestamp)| ChatMessage {
                id,
                role,
                content,
                timestamp,
            })
    }

    proptest! {
        #[test]
        fn test_roundtrip_arbitrary_sequences(
            messages in prop::collection::vec(arb_message(), 1..16)
        ) {
            let decoded = decode(&encode(&messages).unwrap()).unwrap();
            prop_assert_eq!(decoded, messages);
        }
    }

    fn sample() -> Vec<ChatMessage> {
        vec![
            ChatMessage {
                id: "welcome".to_string(),
                role: Role::Assistant,
                content: "Hello!".to_string(),
                timestamp: 1_700_000_000_000,
            },
            ChatMessage {
                id: "u1".to_string(),
                role: Role::User,
                content: "Показать кампании 📈 \"quoted\"\nnext line".to_string(),
                timestamp: 1_700_000_000_123,
            },
        ]
    }

    #[test]
    fn test_roundtrip_preserves_every_field() {
        let messages = sample();
        let decoded = decode(&encode(&messages).unwrap()).unwrap();
        assert_eq!(decoded, messages);
    }

    #[test]
    fn test_encode_layout() {
        let encoded = encode(&sample()[..1]).unwrap();
        assert_eq!(
            encoded,
            r#"[{"id":"welcome","role":"assistant","content":"Hello!","timestamp":1700000000000}]"#
        );
    }

    #[test]
    fn test_decode_rejects_invalid_json() {
        let err = decode("not json").unwrap_err();
        assert!(matches!(err, crate::Error::Decode(_)));
    }

    #[test]
    fn test_decode_rejects_non_array() {
        let err = decode(r#"{"id":"x"}"#).unwrap_err();
        assert!(err.to_string().contains("expected an array"));
    }

    #[test]
    fn test_decode_rejects_empty_array() {
        let err = decode("[]").unwrap_err();
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn test_decode_rejects_malformed_element() {
        let raw = r#"[{"id":"a","role":"user","content":"hi","timestamp":1},{"id":"b"}]"#;
        let err = decode(raw).unwrap_err();
        assert!(err.to_string().contains("message 1"));
    }

    #[test]
    fn test_decode_rejects_unknown_role() {
        let raw = r#"[{"id":"a","role":"system","content":"hi","timestamp":1}]"#;
        assert!(decode(raw).is_err());
    }
}
