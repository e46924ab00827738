use std::{cell::Cell, mem};

use log::debug;

use crate::{
    automata::program::{
        GroupId, Inst, InstAltEnd, InstGroupEnd, InstGroupStart, InstKind, InstLiteral, InstPtr,
        InstRepeatEnd, Program,
    },
    errors::ErrorKind,
    span::{Position, Span},
};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum ItemKind {
    Literal,
    Group,
    Repeat,
    Error,
}

impl ItemKind {
    fn is_repeatable(self) -> bool {
        matches!(self, ItemKind::Literal | ItemKind::Group)
    }
}

/// The most recently completed element of a concatenation, which is what a
/// following `+` applies to.
#[derive(Clone, Copy, Debug)]
struct Item {
    entry: InstPtr,
    kind: ItemKind,
}

/// One `|`-separated branch. Jump targets inside it are relative to its
/// first instruction until it is spliced into its parent.
#[derive(Debug, Default)]
struct Concat {
    insts: Vec<Inst>,
    last: Option<Item>,
}

impl Concat {
    fn push(&mut self, kind: ItemKind, inst: Inst) {
        let entry = self.insts.len();
        self.insts.push(inst);
        self.last = Some(Item { entry, kind });
    }

    fn splice(&mut self, kind: ItemKind, region: Vec<Inst>) {
        let entry = self.insts.len();
        self.insts.extend(region.into_iter().map(|mut inst| {
            inst.relocate(entry);
            inst
        }));
        self.last = Some(Item { entry, kind });
    }

    fn repeat(&mut self, repeat_start: InstPtr, span: Span) {
        self.insts.push(Inst::new(
            InstKind::RepeatEnd(InstRepeatEnd { repeat_start }),
            span,
        ));
        self.last = Some(Item {
            entry: repeat_start,
            kind: ItemKind::Repeat,
        });
    }
}

/// A group whose `)` has not been seen yet.
#[derive(Debug)]
struct GroupFrame {
    group: GroupId,
    open: Span,
    alternatives: Vec<Concat>,
    separators: Vec<Span>,
    concat: Concat,
}

impl GroupFrame {
    fn new(group: GroupId, open: Span) -> GroupFrame {
        GroupFrame {
            group,
            open,
            alternatives: vec![],
            separators: vec![],
            concat: Concat::default(),
        }
    }

    fn alternate(&mut self, separator: Span) {
        self.alternatives.push(mem::take(&mut self.concat));
        self.separators.push(separator);
    }

    fn finish(self) -> (GroupId, Span, Vec<Concat>, Vec<Span>) {
        let GroupFrame {
            group,
            open,
            mut alternatives,
            separators,
            concat,
        } = self;
        alternatives.push(concat);
        (group, open, alternatives, separators)
    }

    /// Lays the group out as `GroupStart`, the alternatives separated by
    /// `AltEnd`s, then `GroupEnd`. Indices are relative to the `GroupStart`.
    fn fold(self, close: Span) -> Vec<Inst> {
        let (group, open, alternatives, separators) = self.finish();

        let mut entries = vec![];
        let mut next = 1;
        for (i, alt) in alternatives.iter().enumerate() {
            if i > 0 {
                next += 1;
                entries.push(next);
            }
            next += alt.insts.len();
        }
        let group_end = next;

        let mut insts = Vec::with_capacity(group_end + 1);
        insts.push(Inst::new(
            InstKind::GroupStart(InstGroupStart {
                group,
                alternatives: entries,
            }),
            open,
        ));
        lay_out(&mut insts, alternatives, &separators, group_end);
        insts.push(Inst::new(InstKind::GroupEnd(InstGroupEnd { group }), close));
        insts
    }

    /// Like `fold`, but the group boundaries are replaced by a single error
    /// at the `(`. The alternatives stay in place so the program remains
    /// well formed.
    fn fold_unclosed(self) -> Vec<Inst> {
        let (_, open, alternatives, separators) = self.finish();
        let end = 1 + alternatives.iter().map(|alt| alt.insts.len()).sum::<usize>()
            + separators.len();

        let mut insts = Vec::with_capacity(end);
        insts.push(Inst::new(InstKind::Error(ErrorKind::UnclosedGroup), open));
        lay_out(&mut insts, alternatives, &separators, end);
        insts
    }
}

fn lay_out(insts: &mut Vec<Inst>, alternatives: Vec<Concat>, separators: &[Span], goto: InstPtr) {
    let mut alternatives = alternatives.into_iter();
    if let Some(first) = alternatives.next() {
        append(insts, first);
    }
    for (separator, alt) in separators.iter().zip(alternatives) {
        insts.push(Inst::new(InstKind::AltEnd(InstAltEnd { goto }), *separator));
        append(insts, alt);
    }
}

fn append(insts: &mut Vec<Inst>, concat: Concat) {
    let base = insts.len();
    insts.extend(concat.insts.into_iter().map(|mut inst| {
        inst.relocate(base);
        inst
    }));
}

/// Single-pass compiler from a pattern to a `Program`.
///
/// Compilation never fails: malformed syntax is compiled into `Error`
/// instructions spanning the offending text.
pub struct Compiler {
    p: String,
    pos: Cell<Position>,
    root: GroupFrame,
    stack: Vec<GroupFrame>,
    groups: usize,
}

impl Compiler {
    pub fn new(p: &str) -> Self {
        Compiler {
            p: p.to_owned(),
            pos: Cell::new(Position::new(0)),
            root: GroupFrame::new(0, Span::point(Position::new(0))),
            stack: vec![],
            groups: 1,
        }
    }

    fn pos(&self) -> Position {
        self.pos.get()
    }

    fn offset(&self) -> usize {
        self.pos().offset
    }

    fn char(&self) -> Option<char> {
        self.p[self.offset()..].chars().next()
    }

    fn span_char(&self, c: char) -> Span {
        Span::new(self.pos(), Position::new(self.offset() + c.len_utf8()))
    }

    fn bump(&self, c: char) {
        self.pos.set(Position::new(self.offset() + c.len_utf8()));
    }

    fn frame_mut(&mut self) -> &mut GroupFrame {
        self.stack.last_mut().unwrap_or(&mut self.root)
    }

    pub fn compile(mut self) -> Program {
        while let Some(c) = self.char() {
            match c {
                '(' => self.push_group(),
                ')' => self.pop_group(),
                '|' => self.push_alternate(),
                '+' => self.push_repetition(),
                '\\' => self.push_escape(),
                _ => self.push_literal(c),
            }
        }
        self.pop_end()
    }

    fn push_literal(&mut self, c: char) {
        let span = self.span_char(c);
        self.bump(c);
        self.frame_mut().concat.push(
            ItemKind::Literal,
            Inst::new(InstKind::Literal(InstLiteral { c }), span),
        );
    }

    fn push_escape(&mut self) {
        let start = self.pos();
        let backslash = self.span_char('\\');
        self.bump('\\');
        match self.char() {
            Some(c) => {
                self.bump(c);
                let span = Span::new(start, self.pos());
                self.frame_mut().concat.push(
                    ItemKind::Literal,
                    Inst::new(InstKind::Literal(InstLiteral { c }), span),
                );
            }
            None => self.push_error(ErrorKind::TrailingEscape, backslash),
        }
    }

    fn push_error(&mut self, kind: ErrorKind, span: Span) {
        self.frame_mut()
            .concat
            .push(ItemKind::Error, Inst::new(InstKind::Error(kind), span));
    }

    fn push_group(&mut self) {
        let span = self.span_char('(');
        self.bump('(');
        let group = self.groups;
        self.groups += 1;
        self.stack.push(GroupFrame::new(group, span));
    }

    fn pop_group(&mut self) {
        let span = self.span_char(')');
        self.bump(')');
        match self.stack.pop() {
            Some(frame) => {
                let region = frame.fold(span);
                self.frame_mut().concat.splice(ItemKind::Group, region);
            }
            None => self.push_error(ErrorKind::UnopenedGroup, span),
        }
    }

    fn push_alternate(&mut self) {
        let span = self.span_char('|');
        self.bump('|');
        self.frame_mut().alternate(span);
    }

    fn push_repetition(&mut self) {
        let span = self.span_char('+');
        self.bump('+');
        let concat = &mut self.frame_mut().concat;
        let last = concat.last;
        match last {
            Some(item) if item.kind.is_repeatable() => concat.repeat(item.entry, span),
            Some(_) => self.push_error(ErrorKind::RepeatOfUnrepeatableItem, span),
            None => self.push_error(ErrorKind::RepeatWithNothingToRepeat, span),
        }
    }

    fn pop_end(mut self) -> Program {
        let end = Span::point(self.pos());
        while let Some(frame) = self.stack.pop() {
            let region = frame.fold_unclosed();
            self.frame_mut().concat.splice(ItemKind::Error, region);
        }

        let mut insts = self.root.fold(end);
        insts.push(Inst::new(InstKind::Match, end));
        let program = Program {
            insts,
            groups: self.groups,
            pattern: self.p,
        };
        debug!(
            "compiled {:?} into {} instructions, {} groups, {} errors",
            program.pattern(),
            program.len(),
            program.groups(),
            program.errors().count()
        );
        program
    }
}
