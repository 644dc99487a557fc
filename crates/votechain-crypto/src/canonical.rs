use serde::Serialize;
use serde_json::{Map, Value};

use crate::hasher::CryptoError;

/// Deterministic JSON encoding of a value.
///
/// Object keys are sorted lexicographically at every depth and no
/// insignificant whitespace is emitted, so two logically equal values always
/// produce the same bytes. Every digest in the ledger is computed over
/// `CanonicalBytes`, never over ad-hoc `serde_json::to_vec` output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CanonicalBytes(Vec<u8>);

impl CanonicalBytes {
    pub fn new<T: Serialize + ?Sized>(value: &T) -> Result<Self, CryptoError> {
        let value =
            serde_json::to_value(value).map_err(|e| CryptoError::Serialization(e.to_string()))?;
        let bytes = serde_json::to_vec(&sorted(value))
            .map_err(|e| CryptoError::Serialization(e.to_string()))?;
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for CanonicalBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

// Rebuilding each map from sorted pairs keeps the order stable even when
// serde_json is compiled with `preserve_order`.
fn sorted(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut pairs: Vec<(String, Value)> = map.into_iter().collect();
            pairs.sort_by(|a, b| a.0.cmp(&b.0));
            let mut out = Map::with_capacity(pairs.len());
            for (k, v) in pairs {
                out.insert(k, sorted(v));
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sorted).collect()),
        other => other,
    }
}
