use std::collections::HashMap;
use std::sync::Arc;

use crate::comparison::CmpOp;
use crate::context::Ctx;
use crate::errors::{Cause, Result};
use crate::value::{CustomValue, Value};

/// A pluggable operator/type pair: a parse-time deserializer for the
/// function-call syntax and an eval-time comparator for the literal it makes.
pub trait Extension: Send + Sync {
    fn name(&self) -> &'static str;

    /// Build a custom literal from `name(args, kwargs)` call syntax.
    /// The returned value's repr should canonicalize the call so serialized
    /// text round-trips.
    fn deserialize(&self, args: &[Value], kwargs: &[(String, Value)]) -> Result<CustomValue>;

    /// Compare a resolved value against the custom literal in place of the
    /// bare operator. `key` and `ctx` are available for literals that need
    /// contextual expansion.
    fn compare(
        &self,
        ctx: &Ctx,
        key: &Value,
        op: CmpOp,
        left: &Value,
        right: &CustomValue,
    ) -> std::result::Result<bool, Cause>;
}

/// Extension registry, shared by handle.
///
/// Mutate during a configuration phase only; concurrent reads from parsing
/// and evaluation are safe afterwards.
#[derive(Clone, Default)]
pub struct Registry {
    inner: Arc<HashMap<&'static str, Arc<dyn Extension>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an extension under its name; the last registration wins.
    pub fn register<E: Extension + 'static>(&mut self, ext: E) {
        let map = Arc::make_mut(&mut self.inner);
        map.insert(ext.name(), Arc::new(ext));
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Extension>> {
        self.inner.get(name).cloned()
    }
}
