//! Operational error taxonomy shared across crates.
//!
//! Per the rewrite's "explicit result type" rule, a module never returns `None` to
//! mean "the call failed" — absence of an opportunity, a route, or a quote is a valid
//! `Ok(None)`. This enum covers the failures that are genuinely operational.

#[derive(Debug, thiserror::Error)]
pub enum OperationalError {
    #[error("external collaborator unreachable: {0}")]
    CollaboratorUnreachable(String),

    #[error("external collaborator timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("numeric input rejected: {0}")]
    InvalidInput(String),

    #[error("safety supervisor vetoed this action: {0}")]
    SupervisorVeto(String),

    #[error("state invariant violated: {0}")]
    InvariantViolation(String),
}
