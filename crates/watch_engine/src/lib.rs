//! Watch engine: fetch, extract, fingerprint, persist and notify.
mod decode;
mod extract;
mod fetch;
mod fingerprint;
mod links;
mod message;
mod notify;
mod persist;
mod pipeline;
mod store;
mod types;

pub use decode::{decode_page, DecodedPage};
pub use extract::{canonicalize, extractor_for, Extractor, LineExtractor, MarkupExtractor};
pub use fetch::{FetchSettings, Fetcher, ReqwestFetcher, DEFAULT_USER_AGENT};
pub use fingerprint::fingerprint;
pub use message::{compose_notification, NotificationEvent};
pub use notify::{
    MailSettings, Notifier, NotifyError, SmtpNotifier, DEFAULT_SMTP_HOST, DEFAULT_SMTP_PORT,
};
pub use persist::{ensure_dir, AtomicFileWriter, PersistError};
pub use pipeline::{Clock, RunError, Watcher};
pub use store::{JsonStateStore, StateStore, StoreError};
pub use types::{FailureKind, FetchError, FetchMetadata, FetchOutput};
