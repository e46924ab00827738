use std::ops::Range;

/// A matched region of the searched text, as byte offsets.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct Match {
    start: usize,
    end: usize,
}

impl Match {
    pub fn new(start: usize, end: usize) -> Match {
        Match { start, end }
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// The matched text. `text` must be the text that was searched.
    pub fn as_str<'t>(&self, text: &'t str) -> &'t str {
        &text[self.range()]
    }
}

/// The result of a successful search: the whole match and one optional
/// span per group id. Group 0 is the whole match.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Captures {
    whole: Match,
    groups: Vec<Option<Match>>,
}

impl Captures {
    pub(crate) fn new(whole: Match, groups: Vec<Option<Match>>) -> Captures {
        Captures { whole, groups }
    }

    pub fn whole(&self) -> Match {
        self.whole
    }

    /// The span of group `i`, or `None` if it did not take part in the
    /// match.
    pub fn get(&self, i: usize) -> Option<Match> {
        self.groups.get(i).copied().flatten()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Option<Match>> + '_ {
        self.groups.iter().copied()
    }
}
