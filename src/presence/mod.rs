//! Presence model and classification
//!
//! Raw account data as returned by the remote client, and the pure mapping
//! from that data to the category a username is filed under.

mod category;
pub(crate) mod types;

pub(crate) use category::{Category, classify};
pub(crate) use types::Account;
