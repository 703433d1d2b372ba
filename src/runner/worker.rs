use std::collections::BTreeMap;
use std::sync::Arc;
use std::thread;

use tracing::{debug, error, info, info_span, warn};

use crate::config::DelayRange;
use crate::consts::HANDLE_MARKER;
use crate::error::LookupError;
use crate::presence::{Category, classify};
use crate::remote::{Connector, Session};
use crate::store::{PendingList, ResultWriter};
use crate::utils::Timezone;

/// State shared by every worker of a run
#[derive(Debug, Clone)]
pub(crate) struct WorkerContext {
    pub(crate) pending: Arc<PendingList>,
    pub(crate) results: Arc<ResultWriter>,
    pub(crate) delay: DelayRange,
    pub(crate) timezone: Timezone,
}

/// What one worker did with its slice
#[derive(Debug, Clone, Default)]
pub(crate) struct WorkerReport {
    pub(crate) session: String,
    /// Set when the worker never got past authentication
    pub(crate) failure: Option<String>,
    /// Usernames written, keyed by result file name
    pub(crate) counts: BTreeMap<String, usize>,
    /// Usernames whose result could not be written (left pending)
    pub(crate) unsaved: usize,
}

impl WorkerReport {
    fn new(session: &str) -> Self {
        Self {
            session: session.to_string(),
            ..Self::default()
        }
    }

    pub(crate) fn processed(&self) -> usize {
        self.counts.values().sum()
    }
}

/// Sequentially checks one slice of usernames through one session
pub(crate) struct Worker {
    session: Session,
    usernames: Vec<String>,
    ctx: WorkerContext,
}

impl Worker {
    pub(crate) fn new(session: Session, usernames: Vec<String>, ctx: WorkerContext) -> Self {
        Self {
            session,
            usernames,
            ctx,
        }
    }

    pub(crate) fn run(self, connector: &dyn Connector) -> WorkerReport {
        let span = info_span!("worker", session = %self.session.name);
        let _enter = span.enter();
        let mut report = WorkerReport::new(&self.session.name);

        let client = connector.connect(&self.session).and_then(|mut client| {
            client.authenticate()?;
            Ok(client)
        });
        let mut client = match client {
            Ok(client) => client,
            Err(e) => {
                error!("Authentication failed: {e}");
                report.failure = Some(e.to_string());
                return report;
            }
        };

        info!("Start retrieving information of users in a list...");
        debug!(
            "Total length of usernames: {}. Delay range: {}",
            self.usernames.len(),
            self.ctx.delay
        );

        let mut rng = rand::rng();
        for username in &self.usernames {
            // Entries may be written as "@alice"; the raw form is only
            // needed to find the entry in the pending list again.
            let handle = username.trim_start_matches(HANDLE_MARKER);
            debug!("Getting full information of {handle}");
            let category = match client.fetch_account(handle) {
                Ok(account) => classify(&account, self.ctx.timezone),
                Err(LookupError::NotAUser { username }) => {
                    error!("Username doesn't belong to User: {username}");
                    Category::Error
                }
                Err(e) => {
                    error!("Error while getting info of {handle}: {e}");
                    Category::Error
                }
            };
            info!("{HANDLE_MARKER}{handle} | {category}");

            self.persist(username, handle, &category, &mut report);

            let pause = self.ctx.delay.sample(&mut rng);
            debug!("Sleeping for {} seconds", pause.as_secs());
            thread::sleep(pause);
        }

        info!(
            "Slice done: {} of {} username(s) filed",
            report.processed(),
            self.usernames.len()
        );
        report
    }

    fn persist(
        &self,
        username: &str,
        handle: &str,
        category: &Category,
        report: &mut WorkerReport,
    ) {
        if let Err(e) = self.ctx.results.append(handle, category) {
            error!("Failed to write result of {handle}: {e}");
            report.unsaved += 1;
            return;
        }
        *report
            .counts
            .entry(category.file_name().into_owned())
            .or_default() += 1;

        match self.ctx.pending.remove(username) {
            Ok(true) => {}
            Ok(false) => warn!("{username} was already gone from the pending list"),
            Err(e) => error!("Failed to remove {username} from the pending list: {e}"),
        }
    }
}
