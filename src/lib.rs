//! A small backtracking regular-expression engine.
//!
//! Patterns compile into a flat [`Program`] whose jumps are plain indices,
//! and an explicit-stack backtracking VM runs that program against text.
//! The supported syntax is literals, `\` escapes, capturing groups `(...)`,
//! alternation `|` and greedy one-or-more repetition `+`.
//!
//! Compilation never fails. Malformed syntax is compiled into error
//! instructions that never match, each carrying the span of the offending
//! text, so a partially valid pattern is still fully inspectable:
//!
//! ```
//! let program = flatregex::compile("(a|b)+c");
//! let caps = flatregex::scan(&program, "xxabc", 0).unwrap();
//! assert_eq!(caps.whole().range(), 2..5);
//! assert_eq!(caps.get(1).map(|m| m.range()), Some(3..4));
//!
//! let broken = flatregex::compile("a)");
//! assert_eq!(broken.errors().count(), 1);
//! assert!(flatregex::scan(&broken, "a)", 0).is_none());
//! ```

pub mod automata;
pub mod errors;
pub mod executor;
mod regex;
pub mod span;

pub use crate::automata::compiler::Compiler;
pub use crate::automata::program::{GroupId, Inst, InstKind, InstPtr, Program};
pub use crate::errors::{Error, ErrorKind, Result, SyntaxError};
pub use crate::executor::{Anchor, Captures, Config, Executor, Match};
pub use crate::regex::{CaptureMatches, Matches, Regex, RegexBuilder};
pub use crate::span::{Position, Span};

/// Compiles `pattern`. Syntax errors are embedded in the program.
pub fn compile(pattern: &str) -> Program {
    Compiler::new(pattern).compile()
}

/// Finds the leftmost match of `program` in `text` at or after `start`.
pub fn scan(program: &Program, text: &str, start: usize) -> Option<Captures> {
    // Without a backtrack limit the executor has no way to fail.
    Executor::default().scan(program, text, start).ok().flatten()
}
