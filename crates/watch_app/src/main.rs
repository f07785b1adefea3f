mod config;
mod logging;

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use watch_core::RunSummary;
use watch_engine::{JsonStateStore, ReqwestFetcher, SmtpNotifier, Watcher};
use watch_logging::{watch_error, watch_info};

use crate::config::AppConfig;

fn main() -> ExitCode {
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Configuration error: {err}");
            return ExitCode::FAILURE;
        }
    };
    logging::initialize(config.log_level, config.log_file.as_deref());

    match run(&config) {
        Ok(summary) => {
            println!("{summary}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            watch_error!("{:#}", err);
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: &AppConfig) -> anyhow::Result<RunSummary> {
    let notifier = SmtpNotifier::new(config.mail.clone()).context("mail settings rejected")?;
    let fetcher = ReqwestFetcher::new(config.fetch.clone());
    let store = JsonStateStore::new(config.state_file.clone(), config.store_text);
    let watcher = Watcher::new(
        &fetcher,
        &notifier,
        &store,
        config.subject.clone(),
        Arc::new(|| Utc::now().to_rfc3339()),
    );

    watch_info!(
        "Watching {} target(s); state at {:?}",
        config.targets.len(),
        config.state_file
    );
    let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
    runtime
        .block_on(watcher.run(&config.targets))
        .context("watch run failed")
}
