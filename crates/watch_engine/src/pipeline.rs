use std::sync::Arc;

use watch_core::{decide, Effect, Observation, RunSummary, Target, WatchState};
use watch_logging::{watch_debug, watch_info, watch_warn};

use crate::decode::decode_page;
use crate::extract::extractor_for;
use crate::fetch::Fetcher;
use crate::fingerprint::fingerprint;
use crate::message::compose_notification;
use crate::notify::{Notifier, NotifyError};
use crate::store::{StateStore, StoreError};
use crate::FetchError;

/// Supplies the timestamp written into notifications.
pub type Clock = Arc<dyn Fn() -> String + Send + Sync>;

#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("fetching {url} failed: {source}")]
    Fetch { url: String, source: FetchError },
    #[error(transparent)]
    State(#[from] StoreError),
    #[error(transparent)]
    Notify(#[from] NotifyError),
}

/// One pass over the configured targets: fetch, extract, decide, notify, save.
pub struct Watcher<'a> {
    fetcher: &'a dyn Fetcher,
    notifier: &'a dyn Notifier,
    store: &'a dyn StateStore,
    subject: String,
    clock: Clock,
}

impl<'a> Watcher<'a> {
    pub fn new(
        fetcher: &'a dyn Fetcher,
        notifier: &'a dyn Notifier,
        store: &'a dyn StateStore,
        subject: impl Into<String>,
        clock: Clock,
    ) -> Self {
        Self {
            fetcher,
            notifier,
            store,
            subject: subject.into(),
            clock,
        }
    }

    /// Any fetch failure aborts before anything is sent or saved. Notifications go out
    /// before the save; when a send fails, only the changes already mailed are saved and
    /// the rest keep their old baseline, so the next run retries exactly those.
    pub async fn run(&self, targets: &[Target]) -> Result<RunSummary, RunError> {
        let loaded = self.store.load()?;
        let mut state = loaded.clone();
        let mut pending = Vec::new();

        for target in targets {
            let observation = self.observe(target).await?;
            let (next, effects) = decide(state, observation);
            state = next;
            pending.extend(effects);
        }

        for (index, effect) in pending.iter().enumerate() {
            match effect {
                Effect::Notify(change) => {
                    let event = compose_notification(change, &self.subject, &(self.clock)());
                    watch_info!("Change detected on {}; notifying", change.url);
                    if let Err(err) = self.notifier.send(&event).await {
                        self.keep_delivered(&loaded, state, &pending[index..])?;
                        return Err(err.into());
                    }
                }
            }
        }

        self.persist(&state)?;
        let summary = state.view();
        watch_info!("Run finished: {}", summary);
        Ok(summary)
    }

    async fn observe(&self, target: &Target) -> Result<Observation, RunError> {
        let url = target.url().as_str();
        let output = self
            .fetcher
            .fetch(url)
            .await
            .map_err(|source| RunError::Fetch {
                url: url.to_string(),
                source,
            })?;

        let decoded = decode_page(&output.bytes, output.metadata.content_type.as_deref());
        if decoded.had_errors {
            watch_warn!(
                "{} contained bytes invalid for {}; replaced them",
                url,
                decoded.encoding_label
            );
        }

        let extract = extractor_for(target.mode()).extract(&decoded.text, target);
        let hits = if extract.is_empty() { 0 } else { extract.lines().count() };
        watch_debug!(
            "{}: encoding={} mode={:?} hits={}",
            target.key(),
            decoded.encoding_label,
            target.mode(),
            hits
        );

        Ok(Observation {
            target_key: target.key().to_string(),
            url: url.to_string(),
            fingerprint: fingerprint(&extract),
            extract,
        })
    }

    fn keep_delivered(
        &self,
        loaded: &WatchState,
        mut state: WatchState,
        undelivered: &[Effect],
    ) -> Result<(), StoreError> {
        for effect in undelivered {
            match effect {
                Effect::Notify(change) => {
                    if let Some(previous) = loaded.baseline(&change.target_key) {
                        state.restore_baseline(&change.target_key, previous.clone());
                    }
                }
            }
        }
        if state.baselines() == loaded.baselines() {
            watch_debug!("Nothing delivered; state file left alone");
            return Ok(());
        }
        watch_warn!(
            "Delivery failed; saving without the {} undelivered change(s)",
            undelivered.len()
        );
        self.store.save(&state)
    }

    fn persist(&self, state: &WatchState) -> Result<(), StoreError> {
        if state.is_dirty() {
            self.store.save(state)
        } else {
            watch_debug!("State unchanged; not saving");
            Ok(())
        }
    }
}
