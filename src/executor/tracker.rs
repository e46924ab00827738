use crate::automata::program::GroupId;
use crate::executor::captures::Match;

/// The offset each group was last entered at. A group may only be
/// re-entered further along the input, which is what stops zero-width
/// repeats from looping forever.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct ProgressTracker(Vec<Option<usize>>);

impl ProgressTracker {
    pub fn new(groups: usize) -> ProgressTracker {
        ProgressTracker(vec![None; groups])
    }

    /// Records an entry to `group` at `at`. Returns false, leaving the
    /// tracker untouched, when the group was last entered at `at` or later.
    pub fn enter(&mut self, group: GroupId, at: usize) -> bool {
        let Some(slot) = self.0.get_mut(group) else {
            return false;
        };
        if matches!(*slot, Some(last) if last >= at) {
            return false;
        }
        *slot = Some(at);
        true
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
struct Slot {
    start: Option<usize>,
    end: Option<usize>,
}

/// Capture offsets per group.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct GroupTracker(Vec<Slot>);

impl GroupTracker {
    pub fn new(groups: usize) -> GroupTracker {
        GroupTracker(vec![Slot::default(); groups])
    }

    pub fn open(&mut self, group: GroupId, at: usize) {
        if let Some(slot) = self.0.get_mut(group) {
            *slot = Slot {
                start: Some(at),
                end: None,
            };
        }
    }

    pub fn close(&mut self, group: GroupId, at: usize) {
        if let Some(slot) = self.0.get_mut(group) {
            slot.end = Some(at);
        }
    }

    pub fn spans(&self) -> Vec<Option<Match>> {
        self.0
            .iter()
            .map(|slot| match (slot.start, slot.end) {
                (Some(start), Some(end)) if start <= end => Some(Match::new(start, end)),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod test {
    use super::{GroupTracker, ProgressTracker};
    use crate::executor::captures::Match;

    #[test]
    fn progress() {
        let mut progress = ProgressTracker::new(2);
        assert!(progress.enter(1, 0));
        assert!(!progress.enter(1, 0));
        assert!(progress.enter(1, 2));
        assert!(!progress.enter(1, 1));
        assert!(progress.enter(0, 0));
        assert!(!progress.enter(2, 5));
    }

    #[test]
    fn copies_are_independent() {
        let mut progress = ProgressTracker::new(1);
        let saved = progress.clone();
        assert!(progress.enter(0, 3));
        assert_eq!(saved, ProgressTracker::new(1));
    }

    #[test]
    fn groups() {
        let mut groups = GroupTracker::new(3);
        groups.open(0, 0);
        groups.open(1, 1);
        groups.close(1, 3);
        groups.open(2, 2);
        groups.close(0, 4);
        assert_eq!(
            groups.spans(),
            vec![Some(Match::new(0, 4)), Some(Match::new(1, 3)), None]
        );

        groups.open(1, 4);
        assert_eq!(groups.spans()[1], None);
    }
}
