//! In-memory client driven by a fixed table of answers

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::error::{AuthError, LookupError};
use crate::presence::Account;
use crate::presence::types::Presence;

use super::{AccountClient, Connector, Session};

#[derive(Debug, Clone)]
pub(crate) enum Answer {
    Account(Account),
    NotAUser,
    Fail,
}

impl Answer {
    pub(crate) fn presence(status: Presence) -> Self {
        Answer::Account(Account { bot: false, status })
    }

    pub(crate) fn bot() -> Self {
        Answer::Account(Account {
            bot: true,
            status: Presence::Online,
        })
    }
}

/// Connector handing out clients that share one answer table and call log
#[derive(Debug, Clone)]
pub(crate) struct ScriptedConnector {
    answers: Arc<HashMap<String, Answer>>,
    fallback: Answer,
    rejected_sessions: Vec<String>,
    calls: Arc<Mutex<Vec<(String, String)>>>,
}

impl ScriptedConnector {
    pub(crate) fn new(fallback: Answer) -> Self {
        Self {
            answers: Arc::new(HashMap::new()),
            fallback,
            rejected_sessions: Vec::new(),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub(crate) fn answer(mut self, username: &str, answer: Answer) -> Self {
        Arc::make_mut(&mut self.answers).insert(username.to_string(), answer);
        self
    }

    pub(crate) fn reject(mut self, session: &str) -> Self {
        self.rejected_sessions.push(session.to_string());
        self
    }

    /// (session, username) pairs in lookup order
    pub(crate) fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

impl Connector for ScriptedConnector {
    fn connect(&self, session: &Session) -> Result<Box<dyn AccountClient>, AuthError> {
        Ok(Box::new(ScriptedClient {
            session: session.name.clone(),
            rejected: self.rejected_sessions.contains(&session.name),
            connector: self.clone(),
        }))
    }
}

struct ScriptedClient {
    session: String,
    rejected: bool,
    connector: ScriptedConnector,
}

impl AccountClient for ScriptedClient {
    fn authenticate(&mut self) -> Result<(), AuthError> {
        if self.rejected {
            return Err(AuthError::Rejected { code: 401 });
        }
        Ok(())
    }

    fn fetch_account(&mut self, username: &str) -> Result<Account, LookupError> {
        self.connector
            .calls
            .lock()
            .unwrap()
            .push((self.session.clone(), username.to_string()));
        let answer = self
            .connector
            .answers
            .get(username)
            .unwrap_or(&self.connector.fallback);
        match answer {
            Answer::Account(account) => Ok(account.clone()),
            Answer::NotAUser => Err(LookupError::NotAUser {
                username: username.to_string(),
            }),
            Answer::Fail => Err(LookupError::Transport("connection reset".to_string())),
        }
    }
}
