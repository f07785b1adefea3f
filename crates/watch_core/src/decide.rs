use crate::{Baseline, Change, Effect, Observation, Outcome, WatchState};

/// Pure decision step: applies one observation to the state and returns any effects.
///
/// Checks run in order: blank extract, missing baseline, equal fingerprint, changed.
pub fn decide(mut state: WatchState, observation: Observation) -> (WatchState, Vec<Effect>) {
    let Observation {
        target_key,
        url,
        extract,
        fingerprint,
    } = observation;

    // A blank extract almost always means the page layout moved, not that the content went away.
    if extract.trim().is_empty() {
        state.record(&target_key, Outcome::EmptyExtract);
        return (state, Vec::new());
    }

    let stored = state.baseline(&target_key).map(|b| b.fingerprint.clone());
    let effects = match stored {
        None => {
            state.replace_baseline(&target_key, Baseline::new(fingerprint, Some(extract)));
            state.record(&target_key, Outcome::FirstRun);
            Vec::new()
        }
        Some(previous) if previous == fingerprint => {
            state.record(&target_key, Outcome::Unchanged);
            Vec::new()
        }
        Some(_) => {
            let replaced = state.replace_baseline(
                &target_key,
                Baseline::new(fingerprint, Some(extract.clone())),
            );
            state.record(&target_key, Outcome::Changed);
            vec![Effect::Notify(Change {
                target_key,
                url,
                extract,
                previous_extract: replaced.and_then(|b| b.extract),
            })]
        }
    };

    (state, effects)
}
