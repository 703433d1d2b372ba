//! Remote account client abstraction
//!
//! Authentication and account lookup live behind these traits; the worker
//! only knows how to drive them.

pub(crate) mod http;
pub(crate) mod session;

#[cfg(test)]
pub(crate) mod scripted;

use crate::error::{AuthError, LookupError};
use crate::presence::Account;

pub(crate) use http::HttpConnector;
pub(crate) use session::{Session, discover_sessions};

/// One authenticated identity talking to the remote
pub(crate) trait AccountClient: Send {
    /// Establish the session. Called once before any lookup.
    fn authenticate(&mut self) -> Result<(), AuthError>;

    /// Fetch full account info for a username (without the handle marker)
    fn fetch_account(&mut self, username: &str) -> Result<Account, LookupError>;
}

/// Builds a client bound to one session
pub(crate) trait Connector: Send + Sync {
    fn connect(&self, session: &Session) -> Result<Box<dyn AccountClient>, AuthError>;
}
