use std::cmp::Ordering;

use crate::errors::Cause;
use crate::value::Value;

/// The six comparison operators a criteria node can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CmpOp {
    pub fn symbol(self) -> &'static str {
        match self {
            CmpOp::Eq => "==",
            CmpOp::Ne => "!=",
            CmpOp::Lt => "<",
            CmpOp::Le => "<=",
            CmpOp::Gt => ">",
            CmpOp::Ge => ">=",
        }
    }

    /// Apply the bare operator to two values. Extensions use this as the
    /// fallback inside their own comparators.
    pub fn apply(self, left: &Value, right: &Value) -> Result<bool, Cause> {
        compare_values(self, left, right)
    }

    fn on_ord(self, ord: Ordering) -> bool {
        match self {
            CmpOp::Eq => ord == Ordering::Equal,
            CmpOp::Ne => ord != Ordering::Equal,
            CmpOp::Lt => ord == Ordering::Less,
            CmpOp::Le => ord != Ordering::Greater,
            CmpOp::Gt => ord == Ordering::Greater,
            CmpOp::Ge => ord != Ordering::Less,
        }
    }
}

/// Compare two values under `op`. Strings compare lexicographically; bools
/// and numbers share one numeric axis, so `True == 1` and `1 == 1.0` hold.
/// Equality across unrelated kinds answers false; an ordering across them is
/// a comparison fault, never a guess.
pub(crate) fn compare_values(op: CmpOp, left: &Value, right: &Value) -> Result<bool, Cause> {
    match (left, right) {
        (Value::Str(a), Value::Str(b)) => Ok(op.on_ord(a.cmp(b))),
        (Value::Int(a), Value::Int(b)) => Ok(op.on_ord(a.cmp(b))),
        (l, r) => match (numeric(l), numeric(r)) {
            (Some(a), Some(b)) => {
                let ord = a
                    .partial_cmp(&b)
                    .ok_or_else(|| incomparable(op, left, right))?;
                Ok(op.on_ord(ord))
            }
            _ => match op {
                CmpOp::Eq => Ok(l == r),
                CmpOp::Ne => Ok(l != r),
                _ => Err(incomparable(op, left, right)),
            },
        },
    }
}

fn numeric(v: &Value) -> Option<f64> {
    match v {
        Value::Bool(b) => Some(f64::from(u8::from(*b))),
        Value::Int(i) => Some(*i as f64),
        Value::Float(x) => Some(*x),
        _ => None,
    }
}

fn incomparable(op: CmpOp, left: &Value, right: &Value) -> Cause {
    Cause::Comparison(format!("'{left}' {} '{right}'", op.symbol()))
}
