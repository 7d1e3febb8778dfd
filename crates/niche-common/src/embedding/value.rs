use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// 埋め込みの受け取り形式: 数値配列 or JSON 文字列
///
/// Deserialization never fails: anything that is neither an array of numbers
/// nor a string becomes [`EmbeddingValue::Invalid`] so that one bad row can be
/// dropped without rejecting the whole payload.
#[derive(Debug, Clone, PartialEq)]
pub enum EmbeddingValue {
    Numbers(Vec<f64>),
    Encoded(String),
    Invalid,
}

impl EmbeddingValue {
    /// Decodes to a non-empty numeric vector, or `None` when the value is
    /// unusable.
    pub fn decode(&self) -> Option<Vec<f64>> {
        let vector = match self {
            Self::Numbers(values) => values.clone(),
            Self::Encoded(raw) => serde_json::from_str::<Vec<f64>>(raw.trim()).ok()?,
            Self::Invalid => return None,
        };

        if vector.is_empty() || vector.iter().any(|v| !v.is_finite()) {
            return None;
        }
        Some(vector)
    }

    fn from_json(value: Value) -> Self {
        match value {
            Value::String(raw) => Self::Encoded(raw),
            Value::Array(items) => items
                .iter()
                .map(Value::as_f64)
                .collect::<Option<Vec<f64>>>()
                .map(Self::Numbers)
                .unwrap_or(Self::Invalid),
            _ => Self::Invalid,
        }
    }
}

impl From<Vec<f64>> for EmbeddingValue {
    fn from(values: Vec<f64>) -> Self {
        Self::Numbers(values)
    }
}

impl From<&str> for EmbeddingValue {
    fn from(raw: &str) -> Self {
        Self::Encoded(raw.to_string())
    }
}

impl<'de> Deserialize<'de> for EmbeddingValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Value::deserialize(deserializer).map(Self::from_json)
    }
}

impl Serialize for EmbeddingValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Numbers(values) => values.serialize(serializer),
            Self::Encoded(raw) => serializer.serialize_str(raw),
            Self::Invalid => serializer.serialize_none(),
        }
    }
}

/// 1 行分の埋め込み（例: リポジトリ単位）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingRow {
    pub subscriber_id: i64,
    #[serde(default)]
    pub embedding: Option<EmbeddingValue>,
}

impl EmbeddingRow {
    pub fn new(subscriber_id: i64, embedding: impl Into<EmbeddingValue>) -> Self {
        Self {
            subscriber_id,
            embedding: Some(embedding.into()),
        }
    }

    pub fn decode(&self) -> Option<Vec<f64>> {
        self.embedding.as_ref().and_then(EmbeddingValue::decode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn encoded_string_matches_native_array() {
        let native = EmbeddingValue::from(vec![0.1, 0.2, 0.3]);
        let encoded = EmbeddingValue::from("[0.1,0.2,0.3]");
        assert_eq!(native.decode(), encoded.decode());
        assert_eq!(native.decode(), Some(vec![0.1, 0.2, 0.3]));
    }

    #[test]
    fn rejects_unusable_values() {
        assert_eq!(EmbeddingValue::from("not-json").decode(), None);
        assert_eq!(EmbeddingValue::from("{\"a\":1}").decode(), None);
        assert_eq!(EmbeddingValue::from("[1, \"x\"]").decode(), None);
        assert_eq!(EmbeddingValue::from("[]").decode(), None);
        assert_eq!(EmbeddingValue::Numbers(Vec::new()).decode(), None);
        assert_eq!(EmbeddingValue::Invalid.decode(), None);
    }

    #[test]
    fn deserializes_rows_without_failing_on_bad_values() {
        let rows: Vec<EmbeddingRow> = serde_json::from_value(json!([
            {"subscriber_id": 1, "embedding": [0.5, 0.5]},
            {"subscriber_id": 2, "embedding": "[0.5, 0.5]"},
            {"subscriber_id": 3, "embedding": null},
            {"subscriber_id": 4, "embedding": [1, "two"]},
            {"subscriber_id": 5, "embedding": 42},
            {"subscriber_id": 6}
        ]))
        .expect("rows deserialize");

        let decoded: Vec<Option<Vec<f64>>> = rows.iter().map(EmbeddingRow::decode).collect();
        assert_eq!(decoded[0], Some(vec![0.5, 0.5]));
        assert_eq!(decoded[1], Some(vec![0.5, 0.5]));
        assert!(decoded[2..].iter().all(Option::is_none));
    }

    #[test]
    fn serializes_back_to_wire_shape() {
        assert_eq!(
            serde_json::to_value(EmbeddingValue::from(vec![1.0, 2.0])).expect("serialize"),
            json!([1.0, 2.0])
        );
        assert_eq!(
            serde_json::to_value(EmbeddingValue::from("[1]")).expect("serialize"),
            json!("[1]")
        );
        assert_eq!(
            serde_json::to_value(EmbeddingValue::Invalid).expect("serialize"),
            Value::Null
        );
    }
}
