use thiserror::Error;

/// Programmer-facing faults, returned as `Err` from `parse` and `Builder::done`.
/// Data-level faults never take this path; they travel inside an `Outcome` as
/// a [`Cause`].
#[derive(Debug, Error)]
pub enum Error {
    /// The expression uses grammar outside the supported subset.
    #[error("syntax error: {0}")]
    Syntax(String),

    /// A node was assembled from invalid parts (bad builder stack, non-primitive key).
    #[error("construction error: {0}")]
    Construction(String),
}

/// The first underlying fault attached to an Unknown or Error outcome.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Cause {
    /// Context lookup failed and the key is not a literal either.
    #[error("cannot find key '{0}'")]
    Access(String),

    /// The operator could not produce an answer for its operands.
    #[error("cannot compare: {0}")]
    Comparison(String),

    /// A value with no boolean interpretation reached a truthiness test.
    #[error("{0} is not supported")]
    TypeMismatch(String),
}

pub type Result<T> = std::result::Result<T, Error>;
