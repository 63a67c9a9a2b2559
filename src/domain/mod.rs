/// Domain module containing core entities and their validation rules
///
/// This module defines the core entities (Habit, CompletionRecord, User) and
/// the errors raised when input violates their invariants. Derived values
/// (streaks, progress, calendars) live in the engine module.

pub mod habit;
pub mod completion;
pub mod user;
pub mod types;

// Re-export public types for easy access
pub use habit::*;
pub use completion::*;
pub use user::*;
pub use types::*;

use thiserror::Error;

/// Errors that can occur during domain operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Invalid goal: {0}")]
    InvalidGoal(String),

    #[error("Malformed date: {0}")]
    MalformedDate(String),

    #[error("Invalid habit title: {0}")]
    InvalidTitle(String),

    #[error("Invalid frequency: {0}")]
    InvalidFrequency(String),

    #[error("Invalid email: {0}")]
    InvalidEmail(String),
}
