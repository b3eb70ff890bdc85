//! Error taxonomy for the command interpreter
//!
//! All failure modes are carried by a single tagged enum, distinguished by
//! variant rather than by a type hierarchy. Registration errors
//! ([`Argument`](CliError::Argument), [`Conflict`](CliError::Conflict),
//! [`NotFound`](CliError::NotFound), [`Dependency`](CliError::Dependency))
//! propagate to the caller of the registration API; only errors raised while
//! a message is being evaluated are converted into chat responses.

/// Result type for interpreter operations
pub type CliResult<T> = Result<T, CliError>;

/// Interpreter error kinds
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CliError {
    /// A structurally invalid argument (disallowed characters, out-of-range
    /// index). A configuration-time fault, never expected during routing.
    #[error("{0}")]
    Argument(String),

    /// An add operation would violate a uniqueness invariant. Recoverable by
    /// choosing a different key.
    #[error("{0}")]
    Conflict(String),

    /// A lookup or removal referenced a key that does not exist
    #[error("{0}")]
    NotFound(String),

    /// Removal blocked because other live state still depends on the target
    #[error("{0}")]
    Dependency(String),

    /// An expected, user-facing failure during command routing or execution
    ///
    /// [`Cli::evaluate`](crate::cli::Cli::evaluate) surfaces this message
    /// directly to the sender; every other variant is logged and replaced
    /// with a generic response.
    #[error("{0}")]
    Command(String),

    /// A middleware pipeline stage vetoed continuation
    ///
    /// Carries the name of the stage that was about to run. Treated as an
    /// unexpected failure by `evaluate` since it has no safe-to-display
    /// message of its own.
    #[error("Operation aborted by middleware before {0}.")]
    Aborted(&'static str),
}
