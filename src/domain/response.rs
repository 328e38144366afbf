use serde::ser::{Serialize, SerializeMap, Serializer};

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// Key of a PHP array: integers or byte strings.
pub enum PhpKey {
    Int(i64),
    Str(Vec<u8>),
}

#[derive(Debug, Clone, PartialEq)]
/// A value in PHP `serialize()` format.
///
/// Arrays keep their serialized order.
pub enum PhpValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(Vec<u8>),
    Array(Vec<(PhpKey, PhpValue)>),
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// Top-level key of a decoded gateway response.
pub enum ResponseKey {
    Int(i64),
    Text(String),
    /// Byte-string key that is not valid UTF-8.
    Bytes(Vec<u8>),
}

#[derive(Debug, Clone, PartialEq)]
/// Top-level value of a decoded gateway response.
pub enum ResponseValue {
    /// Byte string that decoded as UTF-8.
    Text(String),
    /// Anything else, exactly as parsed.
    Raw(PhpValue),
}

impl ResponseValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Raw(_) => None,
        }
    }

    /// Integer value, also accepting numeric text (`"100"`).
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Text(text) => text.trim().parse().ok(),
            Self::Raw(PhpValue::Int(value)) => Some(*value),
            Self::Raw(_) => None,
        }
    }

    pub fn as_raw(&self) -> Option<&PhpValue> {
        match self {
            Self::Text(_) => None,
            Self::Raw(value) => Some(value),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
/// Decoded gateway response.
///
/// The gateway returns one PHP-serialized array per call; no field is
/// interpreted here, so checking for application-level errors is up to the
/// caller. Entries keep the order the gateway serialized them in.
pub struct GatewayResponse {
    entries: Vec<(ResponseKey, ResponseValue)>,
}

impl GatewayResponse {
    /// Later duplicates of a key replace the earlier value in its position.
    pub(crate) fn from_entries(
        items: impl IntoIterator<Item = (ResponseKey, ResponseValue)>,
    ) -> Self {
        let mut entries: Vec<(ResponseKey, ResponseValue)> = Vec::new();
        for (key, value) in items {
            match entries.iter_mut().find(|(existing, _)| *existing == key) {
                Some(slot) => slot.1 = value,
                None => entries.push((key, value)),
            }
        }
        Self { entries }
    }

    /// Look up a text key.
    pub fn get(&self, key: &str) -> Option<&ResponseValue> {
        self.entries
            .iter()
            .find(|(k, _)| matches!(k, ResponseKey::Text(text) if text == key))
            .map(|(_, v)| v)
    }

    /// Look up a text key whose value is text.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(ResponseValue::as_str)
    }

    pub fn get_key(&self, key: &ResponseKey) -> Option<&ResponseValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Entries in serialized order.
    pub fn entries(&self) -> &[(ResponseKey, ResponseValue)] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<(ResponseKey, ResponseValue)> {
        self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// Serialization flattens everything into JSON-friendly shapes: keys become
// strings, UTF-8 byte strings become strings, other bytes become sequences.

struct BytesRepr<'a>(&'a [u8]);

impl Serialize for BytesRepr<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match std::str::from_utf8(self.0) {
            Ok(text) => serializer.serialize_str(text),
            Err(_) => self.0.serialize(serializer),
        }
    }
}

fn key_string(key: &PhpKey) -> String {
    match key {
        PhpKey::Int(value) => value.to_string(),
        PhpKey::Str(bytes) => String::from_utf8_lossy(bytes).into_owned(),
    }
}

impl Serialize for PhpValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(value) => serializer.serialize_bool(*value),
            Self::Int(value) => serializer.serialize_i64(*value),
            Self::Float(value) => serializer.serialize_f64(*value),
            Self::Str(bytes) => BytesRepr(bytes).serialize(serializer),
            Self::Array(items) => {
                let mut map = serializer.serialize_map(Some(items.len()))?;
                for (key, value) in items {
                    map.serialize_entry(&key_string(key), value)?;
                }
                map.end()
            }
        }
    }
}

impl Serialize for ResponseKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Int(value) => serializer.collect_str(value),
            Self::Text(text) => serializer.serialize_str(text),
            Self::Bytes(bytes) => serializer.serialize_str(&String::from_utf8_lossy(bytes)),
        }
    }
}

impl Serialize for ResponseValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Text(text) => serializer.serialize_str(text),
            Self::Raw(value) => value.serialize(serializer),
        }
    }
}

impl Serialize for GatewayResponse {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn sample() -> GatewayResponse {
        GatewayResponse::from_entries(vec![
            (
                ResponseKey::Text("status".to_owned()),
                ResponseValue::Text("success".to_owned()),
            ),
            (
                ResponseKey::Text("count".to_owned()),
                ResponseValue::Raw(PhpValue::Int(3)),
            ),
            (
                ResponseKey::Text("code".to_owned()),
                ResponseValue::Text(" 100 ".to_owned()),
            ),
            (
                ResponseKey::Int(0),
                ResponseValue::Raw(PhpValue::Str(vec![0xb9, 0xae])),
            ),
            (
                ResponseKey::Text("list".to_owned()),
                ResponseValue::Raw(PhpValue::Array(vec![
                    (PhpKey::Int(0), PhpValue::Str(b"a".to_vec())),
                    (PhpKey::Str(b"ok".to_vec()), PhpValue::Bool(true)),
                ])),
            ),
        ])
    }

    #[test]
    fn entries_keep_serialized_order() {
        let binding = sample();
        let keys: Vec<&ResponseKey> = binding.entries().iter().map(|(k, _)| k).collect();
        assert_eq!(
            keys,
            vec![
                &ResponseKey::Text("status".to_owned()),
                &ResponseKey::Text("count".to_owned()),
                &ResponseKey::Text("code".to_owned()),
                &ResponseKey::Int(0),
                &ResponseKey::Text("list".to_owned()),
            ]
        );
    }

    #[test]
    fn duplicate_key_replaces_value_in_place() {
        let response = GatewayResponse::from_entries(vec![
            (ResponseKey::Text("a".to_owned()), ResponseValue::Text("1".to_owned())),
            (ResponseKey::Text("b".to_owned()), ResponseValue::Text("2".to_owned())),
            (ResponseKey::Text("a".to_owned()), ResponseValue::Text("3".to_owned())),
        ]);
        assert_eq!(response.len(), 2);
        assert_eq!(response.entries()[0].0, ResponseKey::Text("a".to_owned()));
        assert_eq!(response.get_str("a"), Some("3"));
    }

    #[test]
    fn accessors_find_text_keys() {
        let response = sample();
        assert_eq!(response.len(), 5);
        assert_eq!(response.get_str("status"), Some("success"));
        assert_eq!(response.get("count").and_then(ResponseValue::as_i64), Some(3));
        assert_eq!(response.get("code").and_then(ResponseValue::as_i64), Some(100));
        assert_eq!(response.get_str("count"), None);
        assert!(response.get("missing").is_none());
        assert_eq!(
            response
                .get_key(&ResponseKey::Int(0))
                .and_then(ResponseValue::as_raw),
            Some(&PhpValue::Str(vec![0xb9, 0xae]))
        );
    }

    #[test]
    fn serializes_to_json_with_string_keys() {
        let value = serde_json::to_value(sample()).unwrap();
        assert_eq!(
            value,
            json!({
                "0": [185, 174],
                "code": " 100 ",
                "count": 3,
                "list": { "0": "a", "ok": true },
                "status": "success",
            })
        );
    }
}
