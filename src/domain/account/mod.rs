//! Connected account domain module.

mod connected_account;

pub use connected_account::{ConnectedAccount, MAX_TOKEN_LIFETIME_SECS};

#[cfg(test)]
pub(crate) use connected_account::fixtures;
