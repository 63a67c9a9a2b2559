/// Habit entity and related functionality
///
/// This module defines the core Habit struct that represents something a
/// user wants to do every day, along with validation of its fields.

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use crate::domain::{CompletionRecord, DomainError, Frequency, HabitId, UserId};

/// Largest per-day goal a habit may have
pub const MAX_GOAL: i64 = 10_000;

/// A habit owned by a single user
///
/// `streak` is a cached value; the engine's recomputation over
/// `completions` is authoritative and the cache is refreshed on every write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Habit {
    /// Unique identifier for this habit
    pub id: HabitId,
    /// The user who owns this habit
    pub owner: UserId,
    /// Display title (e.g., "Drink water")
    pub title: String,
    /// Optional detailed description
    pub description: Option<String>,
    /// Stored for display; evaluation is per calendar day
    pub frequency: Frequency,
    /// Units required per day for the day to count as met
    pub goal: u32,
    /// At most one record per calendar day
    pub completions: Vec<CompletionRecord>,
    /// Cached current streak as of the last write
    pub streak: u32,
    /// When this habit was created
    pub created_at: DateTime<Utc>,
}

impl Habit {
    /// Create a new habit with validation
    ///
    /// `goal` is taken as a signed value so that zero and negative goals
    /// coming from clients surface as `InvalidGoal` rather than a parse error.
    pub fn new(
        owner: UserId,
        title: String,
        description: Option<String>,
        frequency: Frequency,
        goal: i64,
    ) -> Result<Self, DomainError> {
        Self::validate_title(&title)?;
        Self::validate_description(&description)?;
        let goal = validate_goal(goal)?;

        Ok(Self {
            id: HabitId::new(),
            owner,
            title: title.trim().to_string(),
            description,
            frequency,
            goal,
            completions: Vec::new(),
            streak: 0,
            created_at: Utc::now(),
        })
    }

    /// Create a habit from existing data (used when loading from database)
    #[allow(clippy::too_many_arguments)]
    pub fn from_existing(
        id: HabitId,
        owner: UserId,
        title: String,
        description: Option<String>,
        frequency: Frequency,
        goal: u32,
        completions: Vec<CompletionRecord>,
        streak: u32,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            owner,
            title,
            description,
            frequency,
            goal,
            completions,
            streak,
            created_at,
        }
    }

    /// Update the habit's properties with validation
    ///
    /// Nothing is applied unless every provided value is valid. Lowering the
    /// goal clamps existing counts so the `[0, goal]` invariant keeps holding;
    /// the caller is responsible for refreshing the cached streak afterwards.
    pub fn update(
        &mut self,
        title: Option<String>,
        description: Option<Option<String>>,
        frequency: Option<Frequency>,
        goal: Option<i64>,
    ) -> Result<(), DomainError> {
        if let Some(ref new_title) = title {
            Self::validate_title(new_title)?;
        }

        if let Some(ref new_desc) = description {
            Self::validate_description(new_desc)?;
        }

        let new_goal = goal.map(validate_goal).transpose()?;

        if let Some(new_title) = title {
            self.title = new_title.trim().to_string();
        }
        if let Some(new_description) = description {
            self.description = new_description;
        }
        if let Some(new_frequency) = frequency {
            self.frequency = new_frequency;
        }
        if let Some(new_goal) = new_goal {
            self.goal = new_goal;
            self.clamp_completions();
        }

        Ok(())
    }

    /// Whether this habit belongs to the given user
    pub fn is_owned_by(&self, user: &UserId) -> bool {
        &self.owner == user
    }

    /// Number of days with a completion record
    pub fn total_check_ins(&self) -> usize {
        self.completions.len()
    }

    fn clamp_completions(&mut self) {
        let goal = self.goal;
        for record in &mut self.completions {
            record.count = record.count.min(goal);
        }
    }

    // Validation helper methods

    fn validate_title(title: &str) -> Result<(), DomainError> {
        let trimmed = title.trim();

        if trimmed.is_empty() {
            return Err(DomainError::InvalidTitle(
                "Please add a habit title".to_string()
            ));
        }

        if trimmed.chars().count() > 100 {
            return Err(DomainError::InvalidTitle(
                "Habit title cannot be longer than 100 characters".to_string()
            ));
        }

        Ok(())
    }

    fn validate_description(description: &Option<String>) -> Result<(), DomainError> {
        if let Some(desc) = description {
            if desc.chars().count() > 500 {
                return Err(DomainError::Validation {
                    message: "Description cannot be longer than 500 characters".to_string()
                });
            }
        }
        Ok(())
    }
}

/// Check a client-supplied goal and narrow it to the stored type
pub fn validate_goal(goal: i64) -> Result<u32, DomainError> {
    if goal <= 0 {
        return Err(DomainError::InvalidGoal(format!(
            "Goal must be a positive integer, got {}",
            goal
        )));
    }
    if goal > MAX_GOAL {
        return Err(DomainError::InvalidGoal(format!(
            "Goal cannot exceed {}",
            MAX_GOAL
        )));
    }
    Ok(goal as u32)
}
