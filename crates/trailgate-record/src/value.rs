//! Host-native record values and their normalization.

use serde_json::{Map, Number, Value};
use std::fmt;
use thiserror::Error;

/// A normalized record: string keys, JSON-compatible values, no raw bytes.
pub type NormalizedRecord = Map<String, Value>;

/// An untyped value as delivered by the host pipeline.
///
/// Maps keep the host's pair order and allow keys of any variant; only
/// text-like keys survive [`normalize`].
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    /// Absent value.
    Null,
    /// Boolean.
    Bool(bool),
    /// Signed integer.
    Int(i64),
    /// Unsigned integer.
    Uint(u64),
    /// Floating point number.
    Float(f64),
    /// Text.
    Text(String),
    /// Raw byte sequence.
    Bytes(Vec<u8>),
    /// Ordered list.
    List(Vec<RawValue>),
    /// Nested key/value structure.
    Map(Vec<(RawValue, RawValue)>),
}

impl RawValue {
    /// Build a map from text keys.
    pub fn map<K, I>(pairs: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, RawValue)>,
    {
        Self::Map(
            pairs
                .into_iter()
                .map(|(k, v)| (Self::Text(k.into()), v))
                .collect(),
        )
    }

    /// Short name of the variant, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Uint(_) => "uint",
            Self::Float(_) => "float",
            Self::Text(_) => "text",
            Self::Bytes(_) => "bytes",
            Self::List(_) => "list",
            Self::Map(_) => "map",
        }
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Bool(b) => write!(f, "{}", b),
            Self::Int(n) => write!(f, "{}", n),
            Self::Uint(n) => write!(f, "{}", n),
            Self::Float(n) => write!(f, "{}", n),
            Self::Text(s) => write!(f, "{:?}", s),
            Self::Bytes(bytes) => write!(f, "{:?}", String::from_utf8_lossy(bytes)),
            Self::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Self::Map(pairs) => {
                write!(f, "{{")?;
                for (i, (k, v)) in pairs.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", k, v)?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for RawValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<Vec<u8>> for RawValue {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}

impl From<bool> for RawValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for RawValue {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<u64> for RawValue {
    fn from(n: u64) -> Self {
        Self::Uint(n)
    }
}

impl From<f64> for RawValue {
    fn from(n: f64) -> Self {
        Self::Float(n)
    }
}

impl From<Value> for RawValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => {
                if let Some(u) = n.as_u64() {
                    Self::Uint(u)
                } else if let Some(i) = n.as_i64() {
                    Self::Int(i)
                } else {
                    Self::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            Value::String(s) => Self::Text(s),
            Value::Array(items) => Self::List(items.into_iter().map(Self::from).collect()),
            Value::Object(map) => Self::Map(
                map.into_iter()
                    .map(|(k, v)| (Self::Text(k), Self::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<NormalizedRecord> for RawValue {
    fn from(record: NormalizedRecord) -> Self {
        Self::from(Value::Object(record))
    }
}

/// Normalization errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    /// The top-level value handed over as a record is not a map.
    #[error("record is not a map (got {kind})")]
    NotAMap { kind: &'static str },

    /// A map key could not be coerced to text.
    #[error("non-text key of type {kind} at '{path}'")]
    NonTextKey { path: String, kind: &'static str },
}

/// Normalize a host record into a string-keyed map.
///
/// Byte sequences become text through a direct UTF-8 reading (invalid
/// sequences are replaced, never escaped or base64 encoded). Nested maps
/// and lists are normalized recursively.
pub fn normalize(raw: &RawValue) -> Result<NormalizedRecord, NormalizeError> {
    match raw {
        RawValue::Map(pairs) => normalize_map(pairs, &mut Path::default()),
        other => Err(NormalizeError::NotAMap { kind: other.kind() }),
    }
}

fn normalize_map(
    pairs: &[(RawValue, RawValue)],
    path: &mut Path,
) -> Result<NormalizedRecord, NormalizeError> {
    let mut out = Map::new();
    for (key, value) in pairs {
        let key = key_text(key, path)?;
        path.push(key.clone());
        let value = normalize_value(value, path)?;
        path.pop();
        out.insert(key, value);
    }
    Ok(out)
}

fn normalize_value(value: &RawValue, path: &mut Path) -> Result<Value, NormalizeError> {
    Ok(match value {
        RawValue::Null => Value::Null,
        RawValue::Bool(b) => Value::Bool(*b),
        RawValue::Int(n) => Value::Number((*n).into()),
        RawValue::Uint(n) => Value::Number((*n).into()),
        // NaN and infinities have no JSON number form
        RawValue::Float(n) => Number::from_f64(*n).map(Value::Number).unwrap_or(Value::Null),
        RawValue::Text(s) => Value::String(s.clone()),
        RawValue::Bytes(bytes) => Value::String(String::from_utf8_lossy(bytes).into_owned()),
        RawValue::List(items) => {
            let mut out = Vec::with_capacity(items.len());
            for (i, item) in items.iter().enumerate() {
                path.push(i.to_string());
                out.push(normalize_value(item, path)?);
                path.pop();
            }
            Value::Array(out)
        }
        RawValue::Map(pairs) => Value::Object(normalize_map(pairs, path)?),
    })
}

fn key_text(key: &RawValue, path: &Path) -> Result<String, NormalizeError> {
    match key {
        RawValue::Text(s) => Ok(s.clone()),
        RawValue::Bytes(bytes) => Ok(String::from_utf8_lossy(bytes).into_owned()),
        other => Err(NormalizeError::NonTextKey {
            path: path.to_string(),
            kind: other.kind(),
        }),
    }
}

/// Dotted location inside a record, for error messages.
#[derive(Debug, Default)]
struct Path(Vec<String>);

impl Path {
    fn push(&mut self, segment: String) {
        self.0.push(segment);
    }

    fn pop(&mut self) {
        self.0.pop();
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            write!(f, "<root>")
        } else {
            write!(f, "{}", self.0.join("."))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bytes_become_plain_text() {
        let raw = RawValue::map([("log", RawValue::Bytes(b"hello world".to_vec()))]);
        let record = normalize(&raw).unwrap();
        assert_eq!(record["log"], json!("hello world"));
    }

    #[test]
    fn test_nested_maps_are_normalized() {
        let raw = RawValue::map([(
            "kubernetes",
            RawValue::map([
                ("pod", RawValue::Bytes(b"api-0".to_vec())),
                ("labels", RawValue::map([("app", RawValue::from("api"))])),
            ]),
        )]);
        let record = normalize(&raw).unwrap();
        assert_eq!(
            Value::Object(record),
            json!({"kubernetes": {"pod": "api-0", "labels": {"app": "api"}}})
        );
    }

    #[test]
    fn test_bytes_inside_lists_become_text() {
        let raw = RawValue::map([(
            "lines",
            RawValue::List(vec![RawValue::Bytes(b"a".to_vec()), RawValue::Int(-3)]),
        )]);
        let record = normalize(&raw).unwrap();
        assert_eq!(record["lines"], json!(["a", -3]));
    }

    #[test]
    fn test_scalars_pass_through() {
        let raw = RawValue::map([
            ("flag", RawValue::Bool(true)),
            ("count", RawValue::Uint(7)),
            ("delta", RawValue::Int(-2)),
            ("ratio", RawValue::Float(0.5)),
            ("none", RawValue::Null),
        ]);
        let record = normalize(&raw).unwrap();
        assert_eq!(
            Value::Object(record),
            json!({"flag": true, "count": 7, "delta": -2, "ratio": 0.5, "none": null})
        );
    }

    #[test]
    fn test_non_finite_float_becomes_null() {
        let raw = RawValue::map([("x", RawValue::Float(f64::NAN))]);
        assert_eq!(normalize(&raw).unwrap()["x"], Value::Null);
    }

    #[test]
    fn test_byte_keys_are_read_as_text() {
        let raw = RawValue::Map(vec![(RawValue::Bytes(b"k".to_vec()), RawValue::from("v"))]);
        assert_eq!(normalize(&raw).unwrap()["k"], json!("v"));
    }

    #[test]
    fn test_non_text_key_is_rejected_with_path() {
        let raw = RawValue::map([(
            "outer",
            RawValue::Map(vec![(RawValue::Int(1), RawValue::from("v"))]),
        )]);
        let err = normalize(&raw).unwrap_err();
        assert_eq!(
            err,
            NormalizeError::NonTextKey {
                path: "outer".to_string(),
                kind: "int",
            }
        );
    }

    #[test]
    fn test_top_level_must_be_map() {
        let err = normalize(&RawValue::from("line")).unwrap_err();
        assert_eq!(err, NormalizeError::NotAMap { kind: "text" });
    }

    #[test]
    fn test_display_reads_bytes_as_text() {
        let raw = RawValue::map([
            ("log", RawValue::Bytes(b"GET /".to_vec())),
            ("tags", RawValue::List(vec![RawValue::Uint(1), RawValue::Null])),
        ]);
        assert_eq!(raw.to_string(), r#"{"log": "GET /", "tags": [1, null]}"#);
    }

    #[test]
    fn test_json_conversion_prefers_unsigned() {
        assert_eq!(RawValue::from(json!(5)), RawValue::Uint(5));
        assert_eq!(RawValue::from(json!(-5)), RawValue::Int(-5));
        assert_eq!(RawValue::from(json!(1.5)), RawValue::Float(1.5));
    }
}
