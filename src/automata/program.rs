use std::fmt;

use crate::errors::{ErrorKind, SyntaxError};
use crate::span::Span;

pub type InstPtr = usize;
pub type GroupId = usize;

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum InstKind {
    Match,
    Literal(InstLiteral),
    GroupStart(InstGroupStart),
    AltEnd(InstAltEnd),
    GroupEnd(InstGroupEnd),
    RepeatEnd(InstRepeatEnd),
    Error(ErrorKind),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct InstLiteral {
    pub c: char,
}

/// Entry to a capturing group. The first alternative starts right after
/// this instruction; `alternatives` holds the entries of the others.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InstGroupStart {
    pub group: GroupId,
    pub alternatives: Vec<InstPtr>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct InstAltEnd {
    pub goto: InstPtr,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct InstGroupEnd {
    pub group: GroupId,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct InstRepeatEnd {
    pub repeat_start: InstPtr,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Inst {
    pub kind: InstKind,
    pub span: Span,
}

impl Inst {
    pub fn new(kind: InstKind, span: Span) -> Inst {
        Inst { kind, span }
    }

    /// Shifts every jump target by `by`, used when a compiled fragment is
    /// spliced into its parent.
    pub(crate) fn relocate(&mut self, by: usize) {
        match self.kind {
            InstKind::GroupStart(ref mut start) => {
                for entry in start.alternatives.iter_mut() {
                    *entry += by;
                }
            }
            InstKind::AltEnd(ref mut alt_end) => alt_end.goto += by,
            InstKind::RepeatEnd(ref mut repeat) => repeat.repeat_start += by,
            InstKind::Match
            | InstKind::Literal(_)
            | InstKind::GroupEnd(_)
            | InstKind::Error(_) => {}
        }
    }
}

impl fmt::Display for InstKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            InstKind::Match => write!(f, "Match"),
            InstKind::Literal(InstLiteral { c }) => write!(f, "Literal({:?})", c),
            InstKind::GroupStart(InstGroupStart {
                group,
                ref alternatives,
            }) => write!(f, "GroupStart({}, alternatives={:?})", group, alternatives),
            InstKind::AltEnd(InstAltEnd { goto }) => write!(f, "AltEnd(goto={})", goto),
            InstKind::GroupEnd(InstGroupEnd { group }) => write!(f, "GroupEnd({})", group),
            InstKind::RepeatEnd(InstRepeatEnd { repeat_start }) => {
                write!(f, "RepeatEnd(repeat_start={})", repeat_start)
            }
            InstKind::Error(kind) => write!(f, "Error({:?})", kind.to_string()),
        }
    }
}

/// A compiled pattern: a flat list of instructions whose jumps are indices
/// into the same list. Immutable once compiled.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Program {
    pub(crate) insts: Vec<Inst>,
    pub(crate) groups: usize,
    pub(crate) pattern: String,
}

impl Program {
    pub fn insts(&self) -> &[Inst] {
        &self.insts
    }

    pub fn get(&self, ip: InstPtr) -> Option<&Inst> {
        self.insts.get(ip)
    }

    pub fn len(&self) -> usize {
        self.insts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.insts.is_empty()
    }

    /// Number of group ids, including the implicit group 0 around the
    /// whole pattern.
    pub fn groups(&self) -> usize {
        self.groups
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn errors(&self) -> impl Iterator<Item = SyntaxError> + '_ {
        self.insts.iter().filter_map(|inst| match inst.kind {
            InstKind::Error(kind) => Some(SyntaxError {
                kind,
                span: inst.span,
            }),
            _ => None,
        })
    }

    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (ip, inst) in self.insts.iter().enumerate() {
            writeln!(f, "{:3}: {:<40} {}", ip, inst.kind.to_string(), inst.span)?;
        }
        Ok(())
    }
}
