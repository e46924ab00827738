//! Backtracking execution of compiled programs.
//!
//! The VM runs a program depth-first. Every choice point (the later
//! alternatives of a group, the "stop repeating" exit of a repeat) pushes a
//! full snapshot of the machine onto an explicit stack; failure pops the most
//! recent one. Snapshots own copies of the group and progress trackers, so
//! an abandoned branch never leaks captures into the one resumed after it.

mod captures;
mod tracker;

use log::{debug, trace};

use crate::automata::program::{
    InstAltEnd, InstGroupEnd, InstGroupStart, InstKind, InstLiteral, InstPtr, InstRepeatEnd,
    Program,
};
use crate::errors::{Error, Result};

pub use self::captures::{Captures, Match};
use self::tracker::{GroupTracker, ProgressTracker};

/// Where a successful attempt has to end.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Default)]
pub enum Anchor {
    /// Reaching the end of the program is enough; the rest of the text is
    /// ignored.
    #[default]
    Prefix,
    /// The attempt must also consume the rest of the text.
    End,
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Config {
    /// Maximum number of backtracks per search attempt. `None` is unbounded.
    pub backtrack_limit: Option<usize>,
    /// Log every executed instruction and backtrack at trace level.
    pub trace: bool,
}

impl Config {
    pub fn new() -> Config {
        Config::default()
    }

    pub fn backtrack_limit(mut self, limit: usize) -> Config {
        self.backtrack_limit = Some(limit);
        self
    }

    pub fn trace(mut self, yes: bool) -> Config {
        self.trace = yes;
        self
    }
}

/// A backtrack snapshot.
#[derive(Clone, Debug)]
struct Thread {
    ip: InstPtr,
    at: usize,
    progress: ProgressTracker,
    groups: GroupTracker,
}

impl Thread {
    fn new(at: usize, groups: usize) -> Thread {
        Thread {
            ip: 0,
            at,
            progress: ProgressTracker::new(groups),
            groups: GroupTracker::new(groups),
        }
    }

    fn fork(&self, ip: InstPtr) -> Thread {
        Thread { ip, ..self.clone() }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Executor {
    config: Config,
}

impl Executor {
    pub fn new(config: Config) -> Executor {
        Executor { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Runs `program` once, anchored at `start`. Succeeds as soon as the
    /// program is exhausted, so this is a prefix match.
    pub fn search(&self, program: &Program, text: &str, start: usize) -> Result<Option<Captures>> {
        self.search_anchored(program, text, start, Anchor::Prefix)
    }

    pub fn search_anchored(
        &self,
        program: &Program,
        text: &str,
        start: usize,
        anchor: Anchor,
    ) -> Result<Option<Captures>> {
        if start > text.len() || !text.is_char_boundary(start) {
            return Ok(None);
        }

        let mut stack: Vec<Thread> = vec![];
        let mut t = Thread::new(start, program.groups());
        let mut backtracks = 0;

        loop {
            let kind = program.get(t.ip).map(|inst| &inst.kind);
            if self.config.trace {
                match kind {
                    Some(kind) => trace!("{:4} @{:<4} {}", t.ip, t.at, kind),
                    None => trace!("{:4} @{:<4} <end>", t.ip, t.at),
                }
            }

            let failed = match kind {
                None | Some(InstKind::Match) => {
                    if anchor == Anchor::End && t.at != text.len() {
                        true
                    } else {
                        let whole = Match::new(start, t.at);
                        return Ok(Some(Captures::new(whole, t.groups.spans())));
                    }
                }
                Some(InstKind::Literal(InstLiteral { c })) => {
                    if text[t.at..].starts_with(*c) {
                        t.ip += 1;
                        t.at += c.len_utf8();
                        false
                    } else {
                        true
                    }
                }
                Some(InstKind::GroupStart(InstGroupStart {
                    group,
                    alternatives,
                })) => {
                    if t.progress.enter(*group, t.at) {
                        t.groups.open(*group, t.at);
                        for entry in alternatives.iter().rev() {
                            stack.push(t.fork(*entry));
                        }
                        t.ip += 1;
                        false
                    } else {
                        true
                    }
                }
                Some(InstKind::AltEnd(InstAltEnd { goto })) => {
                    t.ip = *goto;
                    false
                }
                Some(InstKind::GroupEnd(InstGroupEnd { group })) => {
                    t.groups.close(*group, t.at);
                    t.ip += 1;
                    false
                }
                Some(InstKind::RepeatEnd(InstRepeatEnd { repeat_start })) => {
                    stack.push(t.fork(t.ip + 1));
                    t.ip = *repeat_start;
                    false
                }
                Some(InstKind::Error(_)) => true,
            };

            if failed {
                t = match stack.pop() {
                    Some(t) => t,
                    None => return Ok(None),
                };
                backtracks += 1;
                if self.config.trace {
                    trace!("backtrack to {} @{} ({} pending)", t.ip, t.at, stack.len());
                }
                if let Some(limit) = self.config.backtrack_limit {
                    if backtracks > limit {
                        return Err(Error::BacktrackLimitExceeded(limit));
                    }
                }
            }
        }
    }

    /// Searches at every char boundary from `start` to the end of `text`
    /// and returns the leftmost success.
    pub fn scan(&self, program: &Program, text: &str, start: usize) -> Result<Option<Captures>> {
        self.scan_anchored(program, text, start, Anchor::Prefix)
    }

    pub fn scan_anchored(
        &self,
        program: &Program,
        text: &str,
        start: usize,
        anchor: Anchor,
    ) -> Result<Option<Captures>> {
        debug!(
            "scanning {:?} from {} for {:?}",
            text,
            start,
            program.pattern()
        );
        for at in start..=text.len() {
            if !text.is_char_boundary(at) {
                continue;
            }
            if let Some(captures) = self.search_anchored(program, text, at, anchor)? {
                return Ok(Some(captures));
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod test {
    use super::{Anchor, Config, Executor, Match};
    use crate::automata::compiler::Compiler;
    use crate::automata::program::Program;
    use crate::errors::Error;
    use pretty_assertions::assert_eq;

    fn c(s: &str) -> Program {
        Compiler::new(s).compile()
    }

    fn find(p: &str, s: &str) -> Option<(usize, usize)> {
        Executor::default()
            .scan(&c(p), s, 0)
            .expect("unbounded executor")
            .map(|caps| (caps.whole().start(), caps.whole().end()))
    }

    fn groups(p: &str, s: &str) -> Vec<Option<(usize, usize)>> {
        Executor::default()
            .scan(&c(p), s, 0)
            .expect("unbounded executor")
            .expect("should match")
            .iter()
            .map(|m| m.map(|m| (m.start(), m.end())))
            .collect()
    }

    #[test]
    fn full_match() {
        let ex = Executor::default();
        let matches = |p: &Program, s: &str| {
            ex.search_anchored(p, s, 0, Anchor::End)
                .expect("unbounded executor")
                .is_some()
        };

        let p = &c("ab");
        assert_eq!(true, matches(p, "ab"));
        assert_eq!(false, matches(p, "abc"));
        assert_eq!(false, matches(p, "a"));

        let p = &c("a|b");
        assert_eq!(true, matches(p, "a"));
        assert_eq!(true, matches(p, "b"));
        assert_eq!(false, matches(p, "ab"));

        let p = &c("a|ab");
        assert_eq!(true, matches(p, "ab"));

        let p = &c("a+b");
        assert_eq!(false, matches(p, "b"));
        assert_eq!(true, matches(p, "ab"));
        assert_eq!(true, matches(p, "aaaaaaab"));
        assert_eq!(false, matches(p, "abb"));

        let p = &c("a(bc|cd)+e");
        assert_eq!(false, matches(p, "ae"));
        assert_eq!(true, matches(p, "abce"));
        assert_eq!(true, matches(p, "acde"));
        assert_eq!(true, matches(p, "abccdbce"));
        assert_eq!(false, matches(p, "abccd"));
        assert_eq!(false, matches(p, "abccdef"));
    }

    #[test]
    fn prefix_search() {
        let ex = Executor::default();
        let p = &c("ab");
        let caps = ex.search(p, "abc", 0).expect("unbounded executor");
        assert_eq!(caps.map(|caps| caps.whole()), Some(Match::new(0, 2)));
        assert_eq!(ex.search(p, "xab", 0).expect("unbounded executor"), None);
    }

    #[test]
    fn scan() {
        assert_eq!(find("ab", "xxab"), Some((2, 4)));
        assert_eq!(find("ab", "xxa"), None);
        assert_eq!(find("a+", "aaab"), Some((0, 3)));
        assert_eq!(find("a+", "baa"), Some((1, 3)));
        assert_eq!(find("é+", "ééa"), Some((0, 4)));
        assert_eq!(find("", "abc"), Some((0, 0)));
    }

    #[test]
    fn scan_from_offset() {
        let ex = Executor::default();
        let found = |p: &str, s: &str, start: usize| {
            ex.scan(&c(p), s, start)
                .expect("unbounded executor")
                .map(|caps| (caps.whole().start(), caps.whole().end()))
        };
        assert_eq!(found("", "abc", 2), Some((2, 2)));
        assert_eq!(found("", "abc", 3), Some((3, 3)));
        assert_eq!(found("", "abc", 4), None);
        assert_eq!(found("a", "aba", 1), Some((2, 3)));
        assert_eq!(found("x", "éx", 1), Some((2, 3)));
    }

    #[test]
    fn leftmost_first() {
        assert_eq!(find("a|ab", "ab"), Some((0, 1)));
        assert_eq!(find("ab|a", "ab"), Some((0, 2)));
        assert_eq!(groups("(a|ab)(c|bcd)", "abcd"), vec![
            Some((0, 4)),
            Some((0, 1)),
            Some((1, 4)),
        ]);
    }

    #[test]
    fn captures() {
        assert_eq!(
            groups("a(b(c))", "abc"),
            vec![Some((0, 3)), Some((1, 3)), Some((2, 3))]
        );
        assert_eq!(
            groups("(a|b)+c", "abbc"),
            vec![Some((0, 4)), Some((2, 3))]
        );
        assert_eq!(groups("(a)|b", "b"), vec![Some((0, 1)), None]);
        assert_eq!(groups("(x+)+y", "xxy"), vec![Some((0, 3)), Some((0, 2))]);
    }

    #[test]
    fn zero_width_repeat_terminates() {
        assert_eq!(groups("(a|)+", "aab"), vec![Some((0, 2)), Some((2, 2))]);
        assert_eq!(groups("(a|)+", ""), vec![Some((0, 0)), Some((0, 0))]);
        assert_eq!(find("(|)+b", "aab"), Some((2, 3)));
        assert_eq!(find("((a|)+)+c", "aaaa"), None);
    }

    #[test]
    fn errors_never_match() {
        assert_eq!(find(")", ""), None);
        assert_eq!(find(")", "))"), None);
        assert_eq!(find("(ab", "ab"), None);
        assert_eq!(find("x|(ab", "ab"), None);
        assert_eq!(find("x|(ab", "xy"), Some((0, 1)));
        assert_eq!(find("+a|b", "ab"), Some((1, 2)));
    }

    #[test]
    fn unclosed_group_has_no_capture() {
        assert_eq!(groups("x|(ab", "x"), vec![Some((0, 1)), None]);
    }

    #[test]
    fn search_off_char_boundary() {
        let ex = Executor::default();
        assert_eq!(ex.search(&c(""), "é", 1).expect("unbounded executor"), None);
        assert_eq!(ex.search(&c(""), "é", 3).expect("unbounded executor"), None);
    }

    #[test]
    fn backtrack_limit() {
        let ex = Executor::new(Config::new().backtrack_limit(1000));
        let p = &c("(a+)+b");
        assert_eq!(
            ex.scan(p, "aaaaaaaaaaaaaaaaaaaa", 0),
            Err(Error::BacktrackLimitExceeded(1000))
        );
        assert_eq!(
            ex.scan(p, "aab", 0).map(|caps| caps.map(|caps| caps.whole())),
            Ok(Some(Match::new(0, 3)))
        );
    }

    #[test]
    fn trace_does_not_change_result() {
        let ex = Executor::new(Config::new().trace(true));
        let p = &c("(a|b)+");
        assert_eq!(
            ex.scan(p, "xab", 0).map(|caps| caps.map(|caps| caps.whole())),
            Ok(Some(Match::new(1, 3)))
        );
    }
}
