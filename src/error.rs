//! Error taxonomy for the progression and analytics engine.

/// Errors raised while evaluating progression or analytics.
///
/// Access checks never surface these to callers: they are folded into a
/// denial. Analytics operations return them so dashboards can tell a missing
/// student from an empty one.
#[derive(Debug, thiserror::Error)]
pub enum ProgressError {
    /// A referenced course, module, lesson, student or team leader does not exist.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// The ordering scheme implies a row that is missing (e.g. no `order_index - 1`).
    #[error("Previous {0} not found")]
    IntegrityGap(&'static str),

    /// The underlying store failed.
    #[error("store error: {0}")]
    Store(#[from] anyhow::Error),
}

pub type ProgressResult<T> = Result<T, ProgressError>;
