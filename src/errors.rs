use crate::span::Span;

/// The kinds of malformed syntax the compiler embeds into a program.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, thiserror::Error)]
pub enum ErrorKind {
    /// A `)` with no matching `(`.
    #[error("Unopened group")]
    UnopenedGroup,

    /// A `(` still open at the end of the pattern.
    #[error("Unclosed Group")]
    UnclosedGroup,

    /// A `+` at the start of a pattern or alternative.
    #[error("Repeat with nothing to repeat")]
    RepeatWithNothingToRepeat,

    /// A `+` following an error or another repeat.
    #[error("Repeat with invalid element to repeat")]
    RepeatOfUnrepeatableItem,

    /// A `\` at the very end of the pattern.
    #[error("Escape with nothing to escape")]
    TrailingEscape,
}

/// A syntax error found in a compiled program, with the span it covers.
#[derive(Clone, Copy, Debug, Eq, PartialEq, thiserror::Error)]
#[error("{kind} at {span}")]
pub struct SyntaxError {
    pub kind: ErrorKind,
    pub span: Span,
}

/// Errors from building or running a regex.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum Error {
    /// The pattern compiled to a program containing error instructions.
    #[error("invalid pattern: {}", join_errors(.0))]
    Syntax(Vec<SyntaxError>),

    /// A search backtracked more times than its configured limit.
    #[error("backtrack limit of {0} exceeded")]
    BacktrackLimitExceeded(usize),
}

fn join_errors(errors: &[SyntaxError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

pub type Result<T> = std::result::Result<T, Error>;
