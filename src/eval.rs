use crate::comparison::{compare_values, CmpOp};
use crate::context::Ctx;
use crate::criteria::Criteria;
use crate::errors::Cause;
use crate::outcome::{Outcome, Truth};
use crate::value::Value;

impl Criteria {
    /// Evaluate this node against a wrapped context. Faults never escape as
    /// errors; they come back as Unknown/Error outcomes per the context's
    /// policy, carrying the first cause observed.
    pub fn eval(&self, ctx: &Ctx) -> Outcome {
        match self {
            Criteria::Literal(key) => eval_literal(ctx, key),
            Criteria::Cmp { key, op, right } => eval_cmp(ctx, key, *op, right),
            Criteria::Between {
                lower,
                lower_op,
                key,
                upper_op,
                upper,
            } => eval_between(ctx, lower, *lower_op, key, *upper_op, upper),
            Criteria::In {
                key,
                candidates,
                negated,
            } => {
                let outcome = eval_in(ctx, key, candidates);
                if *negated {
                    outcome.negate()
                } else {
                    outcome
                }
            }
            Criteria::And(left, right) => scan_all(
                ctx.fuzzy(),
                [left.as_ref(), right.as_ref()]
                    .into_iter()
                    .map(|one| one.eval(ctx)),
            ),
            Criteria::All(many) => scan_all(ctx.fuzzy(), many.iter().map(|one| one.eval(ctx))),
            Criteria::Or(left, right) => scan_any(
                ctx.fuzzy(),
                [left.as_ref(), right.as_ref()]
                    .into_iter()
                    .map(|one| one.eval(ctx)),
            ),
            Criteria::Any(many) => scan_any(ctx.fuzzy(), many.iter().map(|one| one.eval(ctx))),
            Criteria::Not(operand) => operand.eval(ctx).negate(),
        }
    }
}

/// Boolean coercion for literal nodes: bools as-is, numbers 0 = false,
/// strings "true"/"false" case-insensitively, anything else is a mismatch.
pub(crate) fn truthiness(v: &Value) -> Result<bool, Cause> {
    match v {
        Value::Bool(b) => Ok(*b),
        Value::Int(i) => Ok(*i != 0),
        Value::Float(x) => Ok(*x != 0.0),
        Value::Str(s) if s.eq_ignore_ascii_case("true") => Ok(true),
        Value::Str(s) if s.eq_ignore_ascii_case("false") => Ok(false),
        other => Err(Cause::TypeMismatch(other.to_string())),
    }
}

fn eval_literal(ctx: &Ctx, key: &Value) -> Outcome {
    match ctx.resolve(key).and_then(|v| truthiness(&v)) {
        Ok(ans) => Outcome::known(ans),
        Err(cause) => Outcome::fault(ctx.fuzzy(), cause),
    }
}

/// Comparison with extension dispatch: a registered custom literal supplies
/// its own comparator, everything else takes the bare operator.
fn compare(ctx: &Ctx, key: &Value, op: CmpOp, left: &Value, right: &Value) -> Result<bool, Cause> {
    if let Value::Custom(custom) = right {
        if let Some(ext) = ctx.registry().get(custom.tag()) {
            return ext.compare(ctx, key, op, left, custom);
        }
    }
    compare_values(op, left, right)
}

fn eval_cmp(ctx: &Ctx, key: &Value, op: CmpOp, right: &Value) -> Outcome {
    let left = match ctx.resolve(key) {
        Ok(v) => v,
        Err(cause) => return Outcome::fault(ctx.fuzzy(), cause),
    };
    match compare(ctx, key, op, &left, right) {
        Ok(ans) => Outcome::known(ans),
        Err(cause) => Outcome::fault(ctx.fuzzy(), cause),
    }
}

/// The key resolves once; the upper check runs only when the lower bound
/// passes definitively. Bounds are used raw, never resolved.
fn eval_between(
    ctx: &Ctx,
    lower: &Value,
    lower_op: CmpOp,
    key: &Value,
    upper_op: CmpOp,
    upper: &Value,
) -> Outcome {
    let value = match ctx.resolve(key) {
        Ok(v) => v,
        Err(cause) => return Outcome::fault(ctx.fuzzy(), cause),
    };
    match compare_values(lower_op, lower, &value) {
        Ok(true) => match compare_values(upper_op, &value, upper) {
            Ok(ans) => Outcome::known(ans),
            Err(cause) => Outcome::fault(ctx.fuzzy(), cause),
        },
        Ok(false) => Outcome::known(false),
        Err(cause) => Outcome::fault(ctx.fuzzy(), cause),
    }
}

/// Candidates compare in order. The first definite hit wins immediately,
/// folding any earlier fault into the cause; strict mode aborts on the first
/// fault instead. A scan that ends with no hit is False only when at least
/// one candidate answered definitively.
fn eval_in(ctx: &Ctx, key: &Value, candidates: &[Value]) -> Outcome {
    let left = match ctx.resolve(key) {
        Ok(v) => v,
        Err(cause) => return Outcome::fault(ctx.fuzzy(), cause),
    };

    let mut negative = 0usize;
    let mut first_cause: Option<Cause> = None;

    for candidate in candidates {
        match compare(ctx, key, CmpOp::Eq, &left, candidate) {
            Ok(true) => return Outcome::new(Truth::True, first_cause),
            Ok(false) => negative += 1,
            Err(cause) => {
                if ctx.fuzzy() {
                    first_cause.get_or_insert(cause);
                } else {
                    return Outcome::new(Truth::Error, Some(first_cause.unwrap_or(cause)));
                }
            }
        }
    }

    if negative > 0 {
        Outcome::new(Truth::False, first_cause)
    } else {
        let truth = if ctx.fuzzy() {
            Truth::Unknown
        } else {
            Truth::Error
        };
        Outcome::new(truth, first_cause)
    }
}

/// The And/All scan: short-circuit on the first definite False, abort on
/// fault in strict mode, and require at least one True at scan end — an
/// all-faulted conjunction never defaults to True.
fn scan_all(fuzzy: bool, outcomes: impl Iterator<Item = Outcome>) -> Outcome {
    let mut positive = 0usize;
    let mut first_cause: Option<Cause> = None;

    for outcome in outcomes {
        match outcome.truth {
            Truth::True => {
                positive += 1;
                if let Some(cause) = outcome.cause {
                    first_cause.get_or_insert(cause);
                }
            }
            Truth::False => {
                return Outcome::new(Truth::False, first_cause.or(outcome.cause));
            }
            Truth::Unknown | Truth::Error => {
                if fuzzy {
                    if let Some(cause) = outcome.cause {
                        first_cause.get_or_insert(cause);
                    }
                } else {
                    return Outcome::new(Truth::Error, first_cause.or(outcome.cause));
                }
            }
        }
    }

    if positive > 0 {
        Outcome::new(Truth::True, first_cause)
    } else {
        let truth = if fuzzy { Truth::Unknown } else { Truth::Error };
        Outcome::new(truth, first_cause)
    }
}

/// The Or/Any scan, symmetric to `scan_all`: short-circuit on the first
/// definite True, answer False only when some operand definitively said so.
fn scan_any(fuzzy: bool, outcomes: impl Iterator<Item = Outcome>) -> Outcome {
    let mut negative = 0usize;
    let mut first_cause: Option<Cause> = None;

    for outcome in outcomes {
        match outcome.truth {
            Truth::True => {
                return Outcome::new(Truth::True, first_cause.or(outcome.cause));
            }
            Truth::False => {
                negative += 1;
                if let Some(cause) = outcome.cause {
                    first_cause.get_or_insert(cause);
                }
            }
            Truth::Unknown | Truth::Error => {
                if fuzzy {
                    if let Some(cause) = outcome.cause {
                        first_cause.get_or_insert(cause);
                    }
                } else {
                    return Outcome::new(Truth::Error, first_cause.or(outcome.cause));
                }
            }
        }
    }

    if negative > 0 {
        Outcome::new(Truth::False, first_cause)
    } else {
        let truth = if fuzzy { Truth::Unknown } else { Truth::Error };
        Outcome::new(truth, first_cause)
    }
}
