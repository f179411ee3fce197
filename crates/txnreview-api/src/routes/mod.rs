//! Route modules for the API server
//!
//! - dashboard: composed view, employee picker, mode transitions, cache reset
//! - transactions: load more, approval edits

pub mod dashboard;
pub mod transactions;
