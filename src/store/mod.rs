//! Flat-file state shared by all workers
//!
//! The pending list is the authoritative record of unfinished usernames;
//! result files are append-only, one per category.

mod pending;
mod results;

pub(crate) use pending::PendingList;
pub(crate) use results::ResultWriter;
