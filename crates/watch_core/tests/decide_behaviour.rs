use std::collections::BTreeMap;
use std::sync::Once;

use pretty_assertions::assert_eq;
use watch_core::{decide, Baseline, Change, Effect, Observation, Outcome, WatchState};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(watch_logging::initialize_for_tests);
}

fn observe(key: &str, extract: &str, fingerprint: &str) -> Observation {
    Observation {
        target_key: key.to_string(),
        url: format!("https://example.org/{key}"),
        extract: extract.to_string(),
        fingerprint: fingerprint.to_string(),
    }
}

fn state_with(key: &str, fingerprint: &str, extract: Option<&str>) -> WatchState {
    let mut baselines = BTreeMap::new();
    baselines.insert(
        key.to_string(),
        Baseline::new(fingerprint, extract.map(str::to_string)),
    );
    WatchState::from_baselines(baselines)
}

#[test]
fn first_run_records_baseline_without_notifying() {
    init_logging();
    let (state, effects) = decide(WatchState::new(), observe("school", "Hard Tennis A", "h1"));

    assert!(effects.is_empty());
    assert!(state.is_dirty());
    assert_eq!(
        state.baseline("school"),
        Some(&Baseline::new("h1", Some("Hard Tennis A".to_string())))
    );
    assert_eq!(state.view().keys_with(Outcome::FirstRun), vec!["school"]);
}

#[test]
fn unchanged_fingerprint_is_a_noop() {
    init_logging();
    let before = state_with("school", "h1", Some("Hard Tennis A"));
    let (after, effects) = decide(before.clone(), observe("school", "Hard Tennis A", "h1"));

    assert!(effects.is_empty());
    assert!(!after.is_dirty());
    assert_eq!(after.baselines(), before.baselines());
    assert_eq!(after.view().keys_with(Outcome::Unchanged), vec!["school"]);
}

#[test]
fn changed_fingerprint_notifies_once_and_replaces_baseline() {
    init_logging();
    let before = state_with("school", "h1", Some("Hard Tennis A"));
    let (after, effects) = decide(
        before,
        observe("school", "Hard Tennis A\nHard Tennis B", "h2"),
    );

    assert_eq!(
        effects,
        vec![Effect::Notify(Change {
            target_key: "school".to_string(),
            url: "https://example.org/school".to_string(),
            extract: "Hard Tennis A\nHard Tennis B".to_string(),
            previous_extract: Some("Hard Tennis A".to_string()),
        })]
    );
    assert!(after.is_dirty());
    assert_eq!(after.baseline("school").unwrap().fingerprint, "h2");
    assert_eq!(after.view().changed_count(), 1);
}

#[test]
fn change_against_hash_only_baseline_has_no_previous_text() {
    init_logging();
    let (_, effects) = decide(state_with("school", "h1", None), observe("school", "new", "h2"));

    match effects.as_slice() {
        [Effect::Notify(change)] => assert_eq!(change.previous_extract, None),
        other => panic!("unexpected effects: {other:?}"),
    }
}

#[test]
fn empty_extract_never_touches_state() {
    init_logging();
    for extract in ["", "  \n\t "] {
        let (fresh, effects) = decide(WatchState::new(), observe("school", extract, "e"));
        assert!(effects.is_empty());
        assert!(!fresh.is_dirty());
        assert!(fresh.baseline("school").is_none());

        let before = state_with("school", "h1", Some("Hard Tennis A"));
        let (after, effects) = decide(before.clone(), observe("school", extract, "e"));
        assert!(effects.is_empty());
        assert!(!after.is_dirty());
        assert_eq!(after.baselines(), before.baselines());
        assert_eq!(after.view().keys_with(Outcome::EmptyExtract), vec!["school"]);
    }
}

#[test]
fn two_identical_runs_initialize_then_stay_quiet() {
    init_logging();
    let (state, first) = decide(WatchState::new(), observe("school", "Hard Tennis A", "h1"));
    let persisted = WatchState::from_baselines(state.baselines().clone());
    let (state, second) = decide(persisted, observe("school", "Hard Tennis A", "h1"));

    assert!(first.is_empty());
    assert!(second.is_empty());
    assert_eq!(state.view().keys_with(Outcome::Unchanged), vec!["school"]);
}

#[test]
fn targets_are_decided_independently() {
    init_logging();
    let state = state_with("a", "ha", Some("A"));
    let (state, effects_a) = decide(state, observe("a", "A2", "ha2"));
    let (state, effects_b) = decide(state, observe("b", "B", "hb"));

    assert_eq!(effects_a.len(), 1);
    assert!(effects_b.is_empty());
    assert_eq!(state.baseline("a").unwrap().fingerprint, "ha2");
    assert_eq!(state.baseline("b").unwrap().fingerprint, "hb");
    assert_eq!(state.view().outcomes.len(), 2);
}
