use crate::comparison::CmpOp;
use crate::criteria::Criteria;
use crate::errors::{Error, Result};
use crate::value::Value;

/// Postfix construction of criteria trees over one per-instance stack:
/// predicate calls push a node, `and`/`or` pop two, `all`/`any` collapse the
/// whole stack, `not` pops one, `done` requires exactly one node left.
///
/// Misuse does not panic; the first failure is latched and surfaces as the
/// `Err` of [`Builder::done`].
#[derive(Default)]
pub struct Builder {
    stack: Vec<Criteria>,
    error: Option<Error>,
}

impl Builder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes currently on the stack.
    pub fn size(&self) -> usize {
        self.stack.len()
    }

    pub fn literal(self, key: impl Into<Value>) -> Self {
        self.push(Criteria::literal(key))
    }

    pub fn eq(self, key: impl Into<Value>, right: impl Into<Value>) -> Self {
        self.push(Criteria::eq(key, right))
    }

    pub fn not_eq(self, key: impl Into<Value>, right: impl Into<Value>) -> Self {
        self.push(Criteria::not_eq(key, right))
    }

    pub fn lt(self, key: impl Into<Value>, right: impl Into<Value>) -> Self {
        self.push(Criteria::lt(key, right))
    }

    pub fn lte(self, key: impl Into<Value>, right: impl Into<Value>) -> Self {
        self.push(Criteria::lte(key, right))
    }

    pub fn gt(self, key: impl Into<Value>, right: impl Into<Value>) -> Self {
        self.push(Criteria::gt(key, right))
    }

    pub fn gte(self, key: impl Into<Value>, right: impl Into<Value>) -> Self {
        self.push(Criteria::gte(key, right))
    }

    pub fn between(
        self,
        lower: impl Into<Value>,
        key: impl Into<Value>,
        upper: impl Into<Value>,
    ) -> Self {
        self.push(Criteria::between(lower, key, upper))
    }

    pub fn between_ops(
        self,
        lower: impl Into<Value>,
        lower_op: CmpOp,
        key: impl Into<Value>,
        upper_op: CmpOp,
        upper: impl Into<Value>,
    ) -> Self {
        self.push(Criteria::between_ops(lower, lower_op, key, upper_op, upper))
    }

    pub fn is_in(
        self,
        key: impl Into<Value>,
        candidates: impl IntoIterator<Item = impl Into<Value>>,
    ) -> Self {
        self.push(Criteria::is_in(key, candidates))
    }

    pub fn not_in(
        self,
        key: impl Into<Value>,
        candidates: impl IntoIterator<Item = impl Into<Value>>,
    ) -> Self {
        self.push(Criteria::not_in(key, candidates))
    }

    /// Pop two, push their binary conjunction.
    pub fn and(mut self) -> Self {
        if self.error.is_none() {
            match self.pop_pair("and") {
                Ok((left, right)) => self.stack.push(Criteria::and(left, right)),
                Err(err) => self.error = Some(err),
            }
        }
        self
    }

    /// Pop two, push their binary disjunction.
    pub fn or(mut self) -> Self {
        if self.error.is_none() {
            match self.pop_pair("or") {
                Ok((left, right)) => self.stack.push(Criteria::or(left, right)),
                Err(err) => self.error = Some(err),
            }
        }
        self
    }

    /// Collapse the entire stack into one n-ary conjunction.
    pub fn all(mut self) -> Self {
        if self.error.is_none() {
            let many = std::mem::take(&mut self.stack);
            match Criteria::all(many) {
                Ok(node) => self.stack.push(node),
                Err(err) => self.error = Some(err),
            }
        }
        self
    }

    /// Collapse the entire stack into one n-ary disjunction.
    pub fn any(mut self) -> Self {
        if self.error.is_none() {
            let many = std::mem::take(&mut self.stack);
            match Criteria::any(many) {
                Ok(node) => self.stack.push(node),
                Err(err) => self.error = Some(err),
            }
        }
        self
    }

    /// Pop one, push its negation.
    pub fn not(mut self) -> Self {
        if self.error.is_none() {
            match self.stack.pop() {
                Some(one) => self.stack.push(Criteria::not(one)),
                None => {
                    self.error = Some(Error::Construction(
                        "not needs 1 item on the stack".into(),
                    ))
                }
            }
        }
        self
    }

    /// Finish the build; the stack must hold exactly one node.
    pub fn done(mut self) -> Result<Criteria> {
        if let Some(err) = self.error.take() {
            return Err(err);
        }
        if self.stack.len() != 1 {
            return Err(Error::Construction(format!(
                "{} items on the stack, expected exactly 1",
                self.stack.len()
            )));
        }
        match self.stack.pop() {
            Some(node) => Ok(node),
            None => Err(Error::Construction("empty stack".into())),
        }
    }

    fn push(mut self, node: Result<Criteria>) -> Self {
        if self.error.is_none() {
            match node {
                Ok(criteria) => self.stack.push(criteria),
                Err(err) => self.error = Some(err),
            }
        }
        self
    }

    fn pop_pair(&mut self, what: &str) -> Result<(Criteria, Criteria)> {
        let right = self.stack.pop();
        let left = self.stack.pop();
        match (left, right) {
            (Some(left), Some(right)) => Ok((left, right)),
            _ => Err(Error::Construction(format!(
                "{what} needs 2 items on the stack"
            ))),
        }
    }
}
