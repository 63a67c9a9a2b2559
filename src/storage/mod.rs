/// Storage layer for persisting users and habits
///
/// This module handles all database operations using SQLite. It provides
/// a clean interface for storing and retrieving habits together with their
/// completion records, and for user accounts.

pub mod sqlite;
pub mod migrations;

// Re-export the main storage types
pub use sqlite::*;

use thiserror::Error;
use crate::domain::{DomainError, Habit, HabitId, User, UserId};

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database connection error: {0}")]
    Connection(String),

    #[error("Database query error: {0}")]
    Query(#[from] rusqlite::Error),

    #[error("Habit not found: {habit_id}")]
    HabitNotFound { habit_id: String },

    #[error("User not found: {user}")]
    UserNotFound { user: String },

    #[error("User already exists: {email}")]
    DuplicateUser { email: String },

    #[error("Migration error: {0}")]
    Migration(String),

    /// A mutation inside an atomic update was rejected; nothing was written
    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// A mutation applied to a habit inside an atomic update
pub type HabitMutation<'a> = dyn FnMut(&mut Habit) -> Result<(), StorageError> + 'a;

/// Trait defining the storage interface for users and habits
///
/// This trait allows us to potentially swap out SQLite for other databases
/// in the future while keeping the same interface.
pub trait HabitStorage {
    /// Create a new user account
    fn create_user(&self, user: &User) -> Result<(), StorageError>;

    /// Get a user by ID
    fn get_user(&self, user_id: &UserId) -> Result<User, StorageError>;

    /// Get a user by (normalized) email
    fn get_user_by_email(&self, email: &str) -> Result<User, StorageError>;

    /// Create a new habit, including any completion records it carries
    fn create_habit(&self, habit: &Habit) -> Result<(), StorageError>;

    /// Get a habit and its completion records by ID
    fn get_habit(&self, habit_id: &HabitId) -> Result<Habit, StorageError>;

    /// All habits owned by a user, newest first
    fn list_habits(&self, owner: &UserId) -> Result<Vec<Habit>, StorageError>;

    /// Replace a stored habit and its completion records
    fn update_habit(&self, habit: &Habit) -> Result<(), StorageError>;

    /// Delete a habit and its completion records
    fn delete_habit(&self, habit_id: &HabitId) -> Result<(), StorageError>;

    /// Load, mutate and write back a habit as one atomic step
    ///
    /// Concurrent modifications of the same habit are serialized. If the
    /// mutation returns an error nothing is written and the stored habit is
    /// unchanged. Returns the habit as written.
    fn modify_habit(
        &self,
        habit_id: &HabitId,
        mutation: &mut HabitMutation<'_>,
    ) -> Result<Habit, StorageError>;
}
