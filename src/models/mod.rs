//! Domain models for brainboard.
//!
//! # Entities
//!
//! Every entity is owned by exactly one [`User`] and is only ever read or written
//! through owner-scoped queries (`WHERE id = ? AND user_id = ?`).
//!
//! - [`User`]: An account, authenticated either locally (password) or through Google.
//! - [`Task`]: A to-do item with a completion flag.
//! - [`Note`]: Uploaded or pasted text together with its AI-generated summary.
//! - [`LearningGuide`]: An AI-generated day-by-day learning plan for a topic.
//! - [`UserStats`]: Read-only counters aggregated across the entities above.

mod learning;
mod note;
mod stats;
mod task;
mod user;

pub use learning::*;
pub use note::*;
pub use stats::*;
pub use task::*;
pub use user::*;

use thiserror::Error;

/// Invariant violations raised by the persistence layer.
///
/// The database functions return `anyhow::Result`; these travel inside the
/// `anyhow::Error` and are recovered with `downcast_ref` at the HTTP boundary.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("Each day in the daily plan must be unique")]
    DuplicateDay(u32),
    #[error("User already exists")]
    EmailTaken,
    #[error("Password is required for local accounts")]
    PasswordRequired,
}

/// Length of a string in characters, ignoring surrounding whitespace.
pub(crate) fn trimmed_len(s: &str) -> usize {
    s.trim().chars().count()
}
