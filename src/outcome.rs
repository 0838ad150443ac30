use serde::Serialize;

use crate::errors::Cause;

/// Four-state evaluation result. Faults never escape `eval` as errors; they
/// surface here as Unknown (fuzzy policy) or Error (strict policy).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Truth {
    True,
    False,
    Unknown,
    Error,
}

impl Truth {
    pub fn is_true(self) -> bool {
        self == Truth::True
    }

    pub fn is_false(self) -> bool {
        self == Truth::False
    }

    /// True and False are definite; Unknown and Error are faulted states.
    pub fn is_definite(self) -> bool {
        matches!(self, Truth::True | Truth::False)
    }
}

/// The truth value plus the first underlying fault observed on the way.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub truth: Truth,
    pub cause: Option<Cause>,
}

impl Outcome {
    pub fn new(truth: Truth, cause: Option<Cause>) -> Self {
        Outcome { truth, cause }
    }

    /// A definite answer with no fault attached.
    pub(crate) fn known(ans: bool) -> Self {
        Outcome {
            truth: if ans { Truth::True } else { Truth::False },
            cause: None,
        }
    }

    /// A fault, degraded to Unknown under the fuzzy policy.
    pub(crate) fn fault(fuzzy: bool, cause: Cause) -> Self {
        Outcome {
            truth: if fuzzy { Truth::Unknown } else { Truth::Error },
            cause: Some(cause),
        }
    }

    /// Wrap-and-invert: flips True/False, passes Unknown/Error through with
    /// their cause untouched.
    pub(crate) fn negate(self) -> Self {
        let truth = match self.truth {
            Truth::True => Truth::False,
            Truth::False => Truth::True,
            faulted => faulted,
        };
        Outcome {
            truth,
            cause: self.cause,
        }
    }
}
