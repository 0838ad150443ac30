//! Declarative boolean-predicate engine.
//!
//! Infix expressions like `"make == 'Acura' and 15 <= maxprice < 20.1"`
//! compile into an immutable [`Criteria`] tree which evaluates against any
//! name-accessible record to a four-state [`Outcome`]: True, False, Unknown
//! or Error, always paired with the first underlying fault. The strict
//! policy turns faults into Error; the fuzzy policy degrades them to Unknown
//! so inclusion-biased filters keep going.
//!
//! Trees are pure values, safe to cache and evaluate concurrently. They can
//! also be assembled without text through the stack-based [`Builder`], and
//! every tree serializes back to canonical text that re-parses to itself.

pub mod builder;
pub mod context;
pub mod errors;
pub mod registry;
mod comparison;
mod criteria;
mod eval;
mod outcome;
mod parser;
mod value;

pub use builder::Builder;
pub use comparison::CmpOp;
pub use context::{Ctx, Record};
pub use criteria::Criteria;
pub use errors::{Cause, Error, Result};
pub use outcome::{Outcome, Truth};
pub use registry::{Extension, Registry};
pub use value::{CustomValue, Value};

use tracing::debug;

/// A parser/evaluator pair bound to one extension registry. Engines are
/// cheap to clone and safe to share once configuration is done.
#[derive(Clone, Default)]
pub struct Engine {
    registry: Registry,
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_registry(registry: Registry) -> Self {
        Engine { registry }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Register an extension; later registrations win on name clashes.
    pub fn register<E: Extension + 'static>(&mut self, ext: E) {
        self.registry.register(ext);
    }

    /// Compile an infix expression into a criteria tree.
    pub fn parse(&self, text: &str) -> Result<Criteria> {
        let criteria = parser::parse_with(&self.registry, text)?;
        debug!(expression = text, criteria = %criteria, "parsed criteria");
        Ok(criteria)
    }

    /// Evaluate a tree against a raw record under this engine's registry,
    /// wrapping the record with the given fuzzy flag.
    pub fn evaluate(&self, criteria: &Criteria, record: &dyn Record, fuzzy: bool) -> Outcome {
        let ctx = Ctx::with_registry(record, fuzzy, self.registry.clone());
        criteria.eval(&ctx)
    }
}

/// Parse with no extensions registered.
pub fn parse(text: &str) -> Result<Criteria> {
    Engine::new().parse(text)
}

/// Evaluate `criteria` against a raw record wrapped with the given fuzzy flag.
pub fn evaluate(criteria: &Criteria, record: &dyn Record, fuzzy: bool) -> Outcome {
    Engine::new().evaluate(criteria, record, fuzzy)
}

/// Render the canonical text form; [`parse`] accepts everything this emits.
pub fn serialize(criteria: &Criteria) -> String {
    criteria.to_string()
}
