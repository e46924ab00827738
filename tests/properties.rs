use flatregex::{compile, scan, Config, Error, Executor, InstKind};
use proptest::prelude::*;

fn check_indices(pattern: &str) -> Result<(), TestCaseError> {
    let program = compile(pattern);
    let len = program.len();
    for inst in program.insts() {
        match inst.kind {
            InstKind::GroupStart(ref start) => {
                prop_assert!(start.group < program.groups());
                prop_assert!(start.alternatives.iter().all(|&entry| entry <= len));
                let ends = program
                    .insts()
                    .iter()
                    .filter(|other| {
                        matches!(other.kind, InstKind::GroupEnd(ref end) if end.group == start.group)
                    })
                    .count();
                prop_assert_eq!(ends, 1);
            }
            InstKind::AltEnd(ref alt_end) => prop_assert!(alt_end.goto <= len),
            InstKind::RepeatEnd(ref repeat) => prop_assert!(repeat.repeat_start <= len),
            InstKind::GroupEnd(ref end) => prop_assert!(end.group < program.groups()),
            InstKind::Match | InstKind::Literal(_) | InstKind::Error(_) => {}
        }
        prop_assert!(inst.span.start.offset <= inst.span.end.offset);
        prop_assert!(inst.span.end.offset <= pattern.len());
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn literal_patterns_match_prefixes(pattern in "[a-c]{0,5}", text in "[a-c]{0,8}") {
        let found = scan(&compile(&pattern), &text, 0).map(|caps| caps.whole());
        let at_start = found.map_or(false, |m| m.start() == 0 && m.end() == pattern.len());
        prop_assert_eq!(at_start, text.starts_with(&pattern));
    }

    #[test]
    fn programs_are_well_formed(pattern in "[ab()|+\\\\]{0,12}") {
        check_indices(&pattern)?;
    }

    #[test]
    fn capture_spans_are_in_bounds(pattern in "[ab()|+]{0,8}", text in "[ab]{0,8}") {
        let executor = Executor::new(Config::new().backtrack_limit(1_000_000));
        match executor.scan(&compile(&pattern), &text, 0) {
            Ok(Some(caps)) => {
                let whole = caps.whole();
                prop_assert!(whole.start() <= whole.end());
                prop_assert!(whole.end() <= text.len());
                for m in caps.iter().flatten() {
                    prop_assert!(m.start() <= m.end());
                    prop_assert!(m.end() <= text.len());
                }
                prop_assert_eq!(caps.get(0), Some(whole));
            }
            Ok(None) => {}
            Err(err) => prop_assert!(false, "unexpected error {}", err),
        }
    }

    #[test]
    fn zero_width_repeats_terminate(
        pattern in prop::sample::select(vec!["(a|)+", "(|a)+", "((a|)+)+", "(|)+", "((|)+|b)+c"]),
        text in "[abc]{0,12}",
    ) {
        let executor = Executor::new(Config::new().backtrack_limit(1_000_000));
        let result = executor.scan(&compile(pattern), &text, 0);
        prop_assert!(!matches!(result, Err(Error::BacktrackLimitExceeded(_))));
    }
}

#[test]
fn empty_pattern_matches_everywhere() {
    let program = compile("");
    for text in ["", "a", "abc"] {
        for i in 0..=text.len() {
            let caps = scan(&program, text, i).expect("empty pattern matches");
            assert_eq!(caps.whole().range(), i..i);
        }
    }
}

#[test]
fn greedy_repeat() {
    let caps = scan(&compile("a+"), "aaab", 0).expect("match");
    assert_eq!(caps.whole().range(), 0..3);
}

#[test]
fn leftmost_first_alternation() {
    let caps = scan(&compile("a|ab"), "ab", 0).expect("match");
    assert_eq!(caps.whole().end(), 1);
}

#[test]
fn unopened_group() {
    let program = compile(")");
    let errors: Vec<_> = program.errors().collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind.to_string(), "Unopened group");
    assert_eq!(errors[0].span.range(), 0..1);
    for text in ["", ")", "abc"] {
        assert!(scan(&program, text, 0).is_none());
    }
}

#[test]
fn unclosed_group_keeps_literals() {
    let program = compile("(ab");
    let errors: Vec<_> = program.errors().collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind.to_string(), "Unclosed Group");
    assert_eq!(errors[0].span.range(), 0..1);
    let literals: Vec<char> = program
        .insts()
        .iter()
        .filter_map(|inst| match inst.kind {
            InstKind::Literal(ref lit) => Some(lit.c),
            _ => None,
        })
        .collect();
    assert_eq!(literals, vec!['a', 'b']);
}
