//! Run orchestration: split the pending list across sessions and drive one
//! worker thread per session until the list drains.

mod dispatcher;
mod partition;
mod worker;

pub(crate) use dispatcher::{RunSettings, RunSummary, dispatch};
