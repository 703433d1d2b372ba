use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::config::{Config, DelayRange};
use crate::error::AppError;
use crate::remote::{Connector, discover_sessions};
use crate::store::{PendingList, ResultWriter};
use crate::utils::Timezone;

use super::partition::partition;
use super::worker::{Worker, WorkerContext, WorkerReport};

/// Validated inputs of one run
#[derive(Debug, Clone)]
pub(crate) struct RunSettings {
    pub(crate) sessions_folder: PathBuf,
    pub(crate) session_pattern: String,
    pub(crate) users_list: PathBuf,
    pub(crate) results_folder: PathBuf,
    pub(crate) clear_results: bool,
    pub(crate) delay: DelayRange,
    pub(crate) timezone: Timezone,
    pub(crate) poll_interval: Duration,
}

impl RunSettings {
    /// Validates delay and timezone; no filesystem or network access.
    pub(crate) fn from_config(config: &Config) -> Result<Self, AppError> {
        debug!("Parsing delay: {}", config.general.delay);
        let delay = config.delay_range()?;
        let timezone = Timezone::parse(config.general.timezone.as_deref())?;
        Ok(Self {
            sessions_folder: config.general.sessions_folder.clone(),
            session_pattern: config.general.session_pattern.clone(),
            users_list: config.general.users_list.clone(),
            results_folder: config.general.results_folder.clone(),
            clear_results: config.general.clear_results,
            delay,
            timezone,
            poll_interval: config.poll_interval(),
        })
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct RunSummary {
    pub(crate) sessions: usize,
    /// (session, reason) for workers that did no work
    pub(crate) failed_sessions: Vec<(String, String)>,
    pub(crate) counts: BTreeMap<String, usize>,
    pub(crate) unsaved: usize,
    pub(crate) remaining: usize,
}

impl RunSummary {
    pub(crate) fn processed(&self) -> usize {
        self.counts.values().sum()
    }

    pub(crate) fn is_complete(&self) -> bool {
        self.remaining == 0
    }

    fn absorb(&mut self, report: WorkerReport) {
        for (file, count) in report.counts {
            *self.counts.entry(file).or_default() += count;
        }
        self.unsaved += report.unsaved;
        if let Some(reason) = report.failure {
            self.failed_sessions.push((report.session, reason));
        }
    }
}

/// Discover sessions, split the pending list across them, run one worker
/// thread per session and wait until the pending list drains.
pub(crate) fn dispatch(
    settings: &RunSettings,
    connector: Arc<dyn Connector>,
) -> Result<RunSummary, AppError> {
    let sessions = discover_sessions(&settings.sessions_folder, &settings.session_pattern)?;
    info!("Loaded {} session(s)", sessions.len());

    let pending = Arc::new(PendingList::load(&settings.users_list)?);
    let results = Arc::new(ResultWriter::new(&settings.results_folder));
    results.prepare(settings.clear_results)?;

    let mut summary = RunSummary {
        sessions: sessions.len(),
        ..RunSummary::default()
    };
    let usernames = pending.usernames();
    if usernames.is_empty() {
        info!("No usernames to check in {}", settings.users_list.display());
        return Ok(summary);
    }

    let ctx = WorkerContext {
        pending: Arc::clone(&pending),
        results,
        delay: settings.delay,
        timezone: settings.timezone,
    };

    let slices = partition(&usernames, sessions.len());
    let mut handles: Vec<(String, JoinHandle<WorkerReport>)> = Vec::new();
    for (session, slice) in sessions.into_iter().zip(slices) {
        let name = session.name.clone();
        debug!("Session {name} gets {} username(s)", slice.len());
        let worker = Worker::new(session, slice, ctx.clone());
        let connector = Arc::clone(&connector);
        let spawned = thread::Builder::new()
            .name(format!("worker-{name}"))
            .spawn(move || worker.run(connector.as_ref()));
        match spawned {
            Ok(handle) => handles.push((name, handle)),
            Err(e) => {
                error!("Failed to start worker for {name}: {e}");
                summary.failed_sessions.push((name, e.to_string()));
            }
        }
    }

    wait_for_drain(&pending, &handles, settings.poll_interval);

    for (name, handle) in handles {
        match handle.join() {
            Ok(report) => summary.absorb(report),
            Err(_) => {
                error!("Worker for {name} panicked");
                summary
                    .failed_sessions
                    .push((name, "worker panicked".to_string()));
            }
        }
    }

    summary.remaining = pending.remaining();
    if summary.is_complete() {
        info!("Finished checking all the usernames");
    } else {
        warn!(
            "Run ended with {} username(s) still pending in {}",
            summary.remaining,
            settings.users_list.display()
        );
    }
    Ok(summary)
}

/// Poll until nothing is pending, or until no worker is left to make progress.
fn wait_for_drain(
    pending: &PendingList,
    handles: &[(String, JoinHandle<WorkerReport>)],
    interval: Duration,
) {
    loop {
        if pending.is_empty() {
            return;
        }
        if handles.iter().all(|(_, h)| h.is_finished()) {
            return;
        }
        debug!("{} username(s) pending", pending.remaining());
        thread::sleep(interval);
    }
}
