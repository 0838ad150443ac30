use std::collections::{BTreeMap, HashMap};

use crate::errors::Cause;
use crate::eval::truthiness;
use crate::parser::literal_from_str;
use crate::registry::Registry;
use crate::value::Value;

/// Capability a record must offer: keyed lookup that may miss.
///
/// Map and JSON adapters ship here; implement it for your own struct shapes
/// to get attribute-style resolution, computing members on demand if needed.
pub trait Record {
    fn try_get(&self, key: &str) -> Option<Value>;
}

impl Record for HashMap<String, Value> {
    fn try_get(&self, key: &str) -> Option<Value> {
        self.get(key).cloned()
    }
}

impl Record for BTreeMap<String, Value> {
    fn try_get(&self, key: &str) -> Option<Value> {
        self.get(key).cloned()
    }
}

/// JSON objects resolve scalar members; null, arrays and nested objects stay
/// unresolvable so criteria fault on them instead of guessing.
impl Record for serde_json::Value {
    fn try_get(&self, key: &str) -> Option<Value> {
        self.as_object()
            .and_then(|m| m.get(key))
            .and_then(Value::from_json)
    }
}

/// The record-plus-policy pair one evaluation runs against. Created per
/// evaluation call, discarded after.
pub struct Ctx<'a> {
    record: &'a dyn Record,
    fuzzy: bool,
    registry: Registry,
}

impl<'a> Ctx<'a> {
    pub fn new(record: &'a dyn Record, fuzzy: bool) -> Self {
        Self::with_registry(record, fuzzy, Registry::default())
    }

    /// Wrap a raw record. The effective policy is the explicit flag or the
    /// record's own "fuzzy" member coerced as a boolean, whichever turns it on.
    pub fn with_registry(record: &'a dyn Record, fuzzy: bool, registry: Registry) -> Self {
        let fuzzy = fuzzy || record_fuzzy(record);
        Ctx {
            record,
            fuzzy,
            registry,
        }
    }

    pub fn fuzzy(&self) -> bool {
        self.fuzzy
    }

    pub(crate) fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Resolve a key slot to a value. Non-string primitives stand for
    /// themselves (constant-vs-constant nodes like `100 > 99`); strings go
    /// through the record and then fall back to literal reinterpretation
    /// (`"True"`, `"18.8"`, `"'NY'"`).
    pub fn resolve(&self, key: &Value) -> Result<Value, Cause> {
        match key {
            Value::Str(name) => {
                if let Some(found) = self.record.try_get(name) {
                    return Ok(found);
                }
                literal_from_str(name).ok_or_else(|| Cause::Access(name.clone()))
            }
            Value::Custom(c) => Err(Cause::Access(c.repr().to_string())),
            constant => Ok(constant.clone()),
        }
    }
}

fn record_fuzzy(record: &dyn Record) -> bool {
    record
        .try_get("fuzzy")
        .map(|v| truthiness(&v).unwrap_or(false))
        .unwrap_or(false)
}
