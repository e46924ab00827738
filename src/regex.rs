use crate::automata::compiler::Compiler;
use crate::automata::program::Program;
use crate::errors::{Error, Result};
use crate::executor::{Anchor, Captures, Config, Executor, Match};

/// A compiled pattern bundled with the executor that runs it.
#[derive(Clone, Debug)]
pub struct Regex {
    program: Program,
    executor: Executor,
}

#[derive(Clone, Debug)]
pub struct RegexBuilder {
    pattern: String,
    config: Config,
    lenient: bool,
}

impl RegexBuilder {
    pub fn new(pattern: &str) -> RegexBuilder {
        RegexBuilder {
            pattern: pattern.to_owned(),
            config: Config::default(),
            lenient: false,
        }
    }

    pub fn backtrack_limit(&mut self, limit: usize) -> &mut RegexBuilder {
        self.config.backtrack_limit = Some(limit);
        self
    }

    pub fn trace(&mut self, yes: bool) -> &mut RegexBuilder {
        self.config.trace = yes;
        self
    }

    /// Keep error instructions in the program instead of rejecting the
    /// pattern. Branches containing an error simply never match.
    pub fn lenient(&mut self, yes: bool) -> &mut RegexBuilder {
        self.lenient = yes;
        self
    }

    pub fn build(&self) -> Result<Regex> {
        let program = Compiler::new(&self.pattern).compile();
        if !self.lenient && program.has_errors() {
            return Err(Error::Syntax(program.errors().collect()));
        }
        Ok(Regex {
            program,
            executor: Executor::new(self.config.clone()),
        })
    }
}

impl Regex {
    pub fn new(pat: &str) -> Result<Regex> {
        RegexBuilder::new(pat).build()
    }

    pub fn lenient(pat: &str) -> Regex {
        Regex {
            program: Compiler::new(pat).compile(),
            executor: Executor::default(),
        }
    }

    pub fn builder(pat: &str) -> RegexBuilder {
        RegexBuilder::new(pat)
    }

    pub fn as_str(&self) -> &str {
        self.program.pattern()
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    /// Whether the whole of `s` matches.
    pub fn matches(&self, s: &str) -> Result<bool> {
        let found = self
            .executor
            .search_anchored(&self.program, s, 0, Anchor::End)?;
        Ok(found.is_some())
    }

    pub fn is_match(&self, s: &str) -> Result<bool> {
        Ok(self.find(s)?.is_some())
    }

    pub fn find(&self, s: &str) -> Result<Option<Match>> {
        self.find_at(s, 0)
    }

    pub fn find_at(&self, s: &str, start: usize) -> Result<Option<Match>> {
        Ok(self.captures_at(s, start)?.map(|caps| caps.whole()))
    }

    pub fn captures(&self, s: &str) -> Result<Option<Captures>> {
        self.captures_at(s, 0)
    }

    pub fn captures_at(&self, s: &str, start: usize) -> Result<Option<Captures>> {
        self.executor.scan(&self.program, s, start)
    }

    pub fn find_iter<'r, 't>(&'r self, s: &'t str) -> Matches<'r, 't> {
        Matches(self.captures_iter(s))
    }

    pub fn captures_iter<'r, 't>(&'r self, s: &'t str) -> CaptureMatches<'r, 't> {
        self.captures_iter_at(s, 0)
    }

    pub fn captures_iter_at<'r, 't>(&'r self, s: &'t str, start: usize) -> CaptureMatches<'r, 't> {
        CaptureMatches {
            regex: self,
            text: s,
            next: Some(start),
        }
    }
}

/// Successive non-overlapping matches. After an empty match the scan
/// resumes one char later.
#[derive(Debug)]
pub struct CaptureMatches<'r, 't> {
    regex: &'r Regex,
    text: &'t str,
    next: Option<usize>,
}

impl Iterator for CaptureMatches<'_, '_> {
    type Item = Result<Captures>;

    fn next(&mut self) -> Option<Result<Captures>> {
        let at = self.next?;
        match self.regex.captures_at(self.text, at) {
            Err(err) => {
                self.next = None;
                Some(Err(err))
            }
            Ok(None) => {
                self.next = None;
                None
            }
            Ok(Some(caps)) => {
                let whole = caps.whole();
                self.next = if whole.is_empty() {
                    self.text[whole.end()..]
                        .chars()
                        .next()
                        .map(|c| whole.end() + c.len_utf8())
                } else {
                    Some(whole.end())
                };
                Some(Ok(caps))
            }
        }
    }
}

#[derive(Debug)]
pub struct Matches<'r, 't>(CaptureMatches<'r, 't>);

impl Iterator for Matches<'_, '_> {
    type Item = Result<Match>;

    fn next(&mut self) -> Option<Result<Match>> {
        self.0.next().map(|caps| caps.map(|caps| caps.whole()))
    }
}
