//! Typed view over the opaque `entwine.json` metadata document.

use serde_json::Value;

use crate::bbox::BoundingBox3D;
use crate::error::{EptError, EptResult};

/// The EPT `info` object (`entwine.json`). Wraps the raw JSON so unknown
/// fields round-trip to callers unchanged, while exposing typed accessors
/// for the two fields the core consumes: `bounds` and `hierarchyStep`.
#[derive(Debug, Clone)]
pub struct Info {
    raw: Value,
    bounds: BoundingBox3D,
    hierarchy_step: u32,
}

impl Info {
    /// Parses a raw `entwine.json` document, validating `bounds` and
    /// defaulting `hierarchyStep` to 0.
    pub fn from_value(raw: Value) -> EptResult<Self> {
        let bounds = raw
            .get("bounds")
            .and_then(Value::as_array)
            .ok_or_else(|| EptError::MalformedInfo("missing \"bounds\"".to_string()))?;

        if bounds.len() != 6 {
            return Err(EptError::MalformedInfo(format!(
                "\"bounds\" must have 6 elements, got {}",
                bounds.len()
            )));
        }

        let mut parsed = [0.0f64; 6];
        for (i, v) in bounds.iter().enumerate() {
            parsed[i] = v.as_f64().ok_or_else(|| {
                EptError::MalformedInfo(format!("\"bounds\"[{i}] is not a number"))
            })?;
        }
        let bounds = BoundingBox3D::from_array(parsed)
            .map_err(|e| EptError::MalformedInfo(e.to_string()))?;

        let hierarchy_step = raw
            .get("hierarchyStep")
            .and_then(Value::as_u64)
            .unwrap_or(0) as u32;

        Ok(Self {
            raw,
            bounds,
            hierarchy_step,
        })
    }

    #[must_use]
    pub fn bounds(&self) -> BoundingBox3D {
        self.bounds
    }

    #[must_use]
    pub fn hierarchy_step(&self) -> u32 {
        self.hierarchy_step
    }

    /// The raw, unmodified JSON document (for forwarding unknown fields).
    #[must_use]
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    /// Looks up an arbitrary field of the raw document.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.raw.get(key)
    }
}
