use std::fmt;

use itertools::Itertools;

use crate::comparison::CmpOp;
use crate::errors::{Error, Result};
use crate::value::{quote, Value};

/// One evaluable unit of the boolean-expression tree.
///
/// Nodes are pure values: build once, then share and evaluate them against
/// any number of contexts, from any number of threads. Binary `And`/`Or` and
/// n-ary `All`/`Any` are evaluation-equivalent over the same flattened
/// operands but keep distinct serialized forms.
#[derive(Debug, Clone, PartialEq)]
pub enum Criteria {
    /// Truthiness of a key or constant.
    Literal(Value),
    /// `key OP right`
    Cmp {
        key: Value,
        op: CmpOp,
        right: Value,
    },
    /// `lower LOP key UOP upper`, the two-sided range form.
    Between {
        lower: Value,
        lower_op: CmpOp,
        key: Value,
        upper_op: CmpOp,
        upper: Value,
    },
    /// `key in (candidates,)`, flipped to `not in` when negated.
    In {
        key: Value,
        candidates: Vec<Value>,
        negated: bool,
    },
    And(Box<Criteria>, Box<Criteria>),
    Or(Box<Criteria>, Box<Criteria>),
    All(Vec<Criteria>),
    Any(Vec<Criteria>),
    Not(Box<Criteria>),
}

impl Criteria {
    pub fn literal(key: impl Into<Value>) -> Result<Criteria> {
        Ok(Criteria::Literal(primitive_key(key.into())?))
    }

    pub fn cmp(key: impl Into<Value>, op: CmpOp, right: impl Into<Value>) -> Result<Criteria> {
        Ok(Criteria::Cmp {
            key: primitive_key(key.into())?,
            op,
            right: right.into(),
        })
    }

    pub fn eq(key: impl Into<Value>, right: impl Into<Value>) -> Result<Criteria> {
        Self::cmp(key, CmpOp::Eq, right)
    }

    pub fn not_eq(key: impl Into<Value>, right: impl Into<Value>) -> Result<Criteria> {
        Self::cmp(key, CmpOp::Ne, right)
    }

    pub fn lt(key: impl Into<Value>, right: impl Into<Value>) -> Result<Criteria> {
        Self::cmp(key, CmpOp::Lt, right)
    }

    pub fn lte(key: impl Into<Value>, right: impl Into<Value>) -> Result<Criteria> {
        Self::cmp(key, CmpOp::Le, right)
    }

    pub fn gt(key: impl Into<Value>, right: impl Into<Value>) -> Result<Criteria> {
        Self::cmp(key, CmpOp::Gt, right)
    }

    pub fn gte(key: impl Into<Value>, right: impl Into<Value>) -> Result<Criteria> {
        Self::cmp(key, CmpOp::Ge, right)
    }

    /// Default bound operators make the range lower-inclusive, upper-exclusive.
    pub fn between(
        lower: impl Into<Value>,
        key: impl Into<Value>,
        upper: impl Into<Value>,
    ) -> Result<Criteria> {
        Self::between_ops(lower, CmpOp::Le, key, CmpOp::Lt, upper)
    }

    pub fn between_ops(
        lower: impl Into<Value>,
        lower_op: CmpOp,
        key: impl Into<Value>,
        upper_op: CmpOp,
        upper: impl Into<Value>,
    ) -> Result<Criteria> {
        Ok(Criteria::Between {
            lower: lower.into(),
            lower_op,
            key: primitive_key(key.into())?,
            upper_op,
            upper: upper.into(),
        })
    }

    pub fn is_in(
        key: impl Into<Value>,
        candidates: impl IntoIterator<Item = impl Into<Value>>,
    ) -> Result<Criteria> {
        Ok(Criteria::In {
            key: primitive_key(key.into())?,
            candidates: candidates.into_iter().map(Into::into).collect(),
            negated: false,
        })
    }

    pub fn not_in(
        key: impl Into<Value>,
        candidates: impl IntoIterator<Item = impl Into<Value>>,
    ) -> Result<Criteria> {
        Ok(Criteria::In {
            key: primitive_key(key.into())?,
            candidates: candidates.into_iter().map(Into::into).collect(),
            negated: true,
        })
    }

    pub fn and(left: Criteria, right: Criteria) -> Criteria {
        Criteria::And(Box::new(left), Box::new(right))
    }

    pub fn or(left: Criteria, right: Criteria) -> Criteria {
        Criteria::Or(Box::new(left), Box::new(right))
    }

    pub fn all(operands: Vec<Criteria>) -> Result<Criteria> {
        Ok(Criteria::All(at_least_two(operands)?))
    }

    pub fn any(operands: Vec<Criteria>) -> Result<Criteria> {
        Ok(Criteria::Any(at_least_two(operands)?))
    }

    pub fn not(operand: Criteria) -> Criteria {
        Criteria::Not(Box::new(operand))
    }
}

fn primitive_key(key: Value) -> Result<Value> {
    if key.is_primitive() {
        Ok(key)
    } else {
        Err(Error::Construction(format!(
            "{key} is not supported as a key"
        )))
    }
}

fn at_least_two(operands: Vec<Criteria>) -> Result<Vec<Criteria>> {
    if operands.len() < 2 {
        return Err(Error::Construction(format!(
            "a connective needs at least 2 operands, got {}",
            operands.len()
        )));
    }
    Ok(operands)
}

/// Canonical text rendering, one fixed form per node kind. `parse` accepts
/// everything this prints, and re-serializing the parse is a fixed point.
impl fmt::Display for Criteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Criteria::Literal(key) => write!(f, "{key}"),
            Criteria::Cmp { key, op, right } => {
                write!(f, "{key} {} {}", op.symbol(), quote(right))
            }
            Criteria::Between {
                lower,
                lower_op,
                key,
                upper_op,
                upper,
            } => write!(
                f,
                "{lower} {} {key} {} {upper}",
                lower_op.symbol(),
                upper_op.symbol()
            ),
            Criteria::In {
                key,
                candidates,
                negated,
            } => {
                let word = if *negated { "not in" } else { "in" };
                if candidates.is_empty() {
                    write!(f, "{key} {word} ()")
                } else {
                    write!(f, "{key} {word} ({},)", candidates.iter().map(quote).join(","))
                }
            }
            Criteria::And(left, right) => {
                write!(f, "({} and {})", operand_text(left), operand_text(right))
            }
            Criteria::Or(left, right) => {
                write!(f, "({} or {})", operand_text(left), operand_text(right))
            }
            Criteria::All(many) => {
                write!(f, "{}", many.iter().map(operand_text).join(" and "))
            }
            Criteria::Any(many) => {
                write!(f, "{}", many.iter().map(operand_text).join(" or "))
            }
            Criteria::Not(operand) => write!(f, "not ({operand})"),
        }
    }
}

/// A paren-less n-ary connective would flatten into its parent's operand
/// list on re-parse; wrapping it keeps the serialized form a fixed point.
fn operand_text(one: &Criteria) -> String {
    match one {
        Criteria::All(_) | Criteria::Any(_) => format!("({one})"),
        _ => one.to_string(),
    }
}
