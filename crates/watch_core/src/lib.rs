//! Watch core: targets and the pure change-decision state machine.
mod decide;
mod effect;
mod observation;
mod state;
mod summary;
mod target;

pub use decide::decide;
pub use effect::{Change, Effect};
pub use observation::Observation;
pub use state::{Baseline, WatchState};
pub use summary::{Outcome, RunSummary, TargetOutcome};
pub use target::{ExtractMode, Target, TargetError};
