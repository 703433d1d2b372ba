//! HTTP/JSON gateway client
//!
//! Talks to a gateway that fronts the messaging platform. The session file
//! holds the bearer token the gateway issued for that account.

use std::time::Duration;

use tracing::debug;

use crate::config::RemoteConfig;
use crate::consts::HANDLE_MARKER;
use crate::error::{AuthError, LookupError};
use crate::presence::Account;

use super::{AccountClient, Connector, Session};

pub(crate) struct HttpConnector {
    base_url: String,
    timeout: Duration,
}

impl HttpConnector {
    pub(crate) fn new(config: &RemoteConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }
}

impl Connector for HttpConnector {
    fn connect(&self, session: &Session) -> Result<Box<dyn AccountClient>, AuthError> {
        let token = session.read_token()?;
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(self.timeout))
            .build()
            .into();
        Ok(Box::new(HttpAccountClient {
            agent,
            base_url: self.base_url.clone(),
            token,
        }))
    }
}

struct HttpAccountClient {
    agent: ureq::Agent,
    base_url: String,
    token: String,
}

impl HttpAccountClient {
    fn get(&self, path: &str) -> Result<ureq::http::Response<ureq::Body>, ureq::Error> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {url}");
        self.agent
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", "application/json")
            .call()
    }
}

impl AccountClient for HttpAccountClient {
    fn authenticate(&mut self) -> Result<(), AuthError> {
        match self.get("/me") {
            Ok(_) => Ok(()),
            Err(ureq::Error::StatusCode(code)) => Err(AuthError::Rejected { code }),
            Err(e) => Err(AuthError::Transport(e.to_string())),
        }
    }

    fn fetch_account(&mut self, username: &str) -> Result<Account, LookupError> {
        let handle = username.trim_start_matches(HANDLE_MARKER);
        if !is_valid_handle(handle) {
            return Err(LookupError::NotFound {
                username: username.to_string(),
            });
        }
        match self.get(&format!("/users/{handle}")) {
            Ok(response) => {
                let mut body = response.into_body();
                let text = body
                    .read_to_string()
                    .map_err(|e| LookupError::Transport(e.to_string()))?;
                decode_account(&text)
            }
            Err(ureq::Error::StatusCode(code)) => Err(status_error(handle, code)),
            Err(e) => Err(LookupError::Transport(e.to_string())),
        }
    }
}

/// Handles are letters, digits and underscores; anything else would leak
/// into the request path as a query, fragment or extra segment.
fn is_valid_handle(handle: &str) -> bool {
    !handle.is_empty() && handle.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn decode_account(text: &str) -> Result<Account, LookupError> {
    serde_json::from_str(text).map_err(|e| LookupError::Decode(e.to_string()))
}

fn status_error(username: &str, code: u16) -> LookupError {
    match code {
        404 => LookupError::NotFound {
            username: username.to_string(),
        },
        // Channels and groups resolve, but are not user accounts.
        422 => LookupError::NotAUser {
            username: username.to_string(),
        },
        _ => LookupError::Status { code },
    }
}
