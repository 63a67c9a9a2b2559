/// SQLite implementation of the habit storage interface
///
/// This module provides the concrete SQLite implementation for storing
/// and retrieving users, habits and completion records. It handles all SQL
/// queries and data conversion.

use std::path::PathBuf;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row, Transaction, TransactionBehavior};
use chrono::{DateTime, NaiveDate, Utc};

use crate::domain::{CompletionRecord, Frequency, Habit, HabitId, User, UserId};
use crate::storage::{migrations, HabitMutation, HabitStorage, StorageError};

const HABIT_COLUMNS: &str =
    "id, owner_id, title, description, frequency, goal, streak, created_at";

const USER_COLUMNS: &str = "id, name, email, password_hash, created_at";

/// SQLite-based storage implementation
///
/// This struct holds a connection to the SQLite database and implements
/// all the storage operations defined in the HabitStorage trait.
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Create a new SQLite storage instance
    ///
    /// This opens the database file and runs any necessary migrations
    /// to ensure the schema is up to date.
    pub fn new(db_path: PathBuf) -> Result<Self, StorageError> {
        let conn = Connection::open(&db_path)
            .map_err(|e| StorageError::Connection(format!("Failed to open database: {}", e)))?;

        let storage = Self::with_connection(conn)?;
        tracing::info!("SQLite storage initialized at: {:?}", db_path);
        Ok(storage)
    }

    /// Create a storage instance backed by a private in-memory database
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| StorageError::Connection(format!("Failed to open database: {}", e)))?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self, StorageError> {
        conn.execute_batch("PRAGMA foreign_keys = ON; PRAGMA busy_timeout = 5000;")
            .map_err(|e| StorageError::Connection(format!("Failed to configure connection: {}", e)))?;

        migrations::initialize_database(&conn)?;

        Ok(Self { conn })
    }

    /// Begin a write transaction that takes the database write lock up front
    fn begin_immediate(&self) -> Result<Transaction<'_>, StorageError> {
        Ok(Transaction::new_unchecked(&self.conn, TransactionBehavior::Immediate)?)
    }
}

// Row conversion helpers

fn invalid_column(index: usize, what: &str) -> rusqlite::Error {
    rusqlite::Error::InvalidColumnType(index, what.to_string(), rusqlite::types::Type::Text)
}

fn parse_timestamp(index: usize, value: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|timestamp| timestamp.with_timezone(&Utc))
        .map_err(|_| invalid_column(index, "Invalid datetime"))
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    let id_str: String = row.get(0)?;
    let id = UserId::from_string(&id_str).map_err(|_| invalid_column(0, "Invalid UUID"))?;
    let created_at_str: String = row.get(4)?;

    Ok(User {
        id,
        name: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        created_at: parse_timestamp(4, &created_at_str)?,
    })
}

/// Habit row without its completion records
fn habit_from_row(row: &Row<'_>) -> rusqlite::Result<Habit> {
    let id_str: String = row.get(0)?;
    let id = HabitId::from_string(&id_str).map_err(|_| invalid_column(0, "Invalid UUID"))?;

    let owner_str: String = row.get(1)?;
    let owner = UserId::from_string(&owner_str).map_err(|_| invalid_column(1, "Invalid UUID"))?;

    let frequency_str: String = row.get(4)?;
    let frequency = Frequency::parse(&frequency_str).map_err(|_| invalid_column(4, "Invalid frequency"))?;

    let created_at_str: String = row.get(7)?;

    Ok(Habit::from_existing(
        id,
        owner,
        row.get(2)?, // title
        row.get(3)?, // description
        frequency,
        row.get(5)?, // goal
        Vec::new(),
        row.get(6)?, // streak
        parse_timestamp(7, &created_at_str)?,
    ))
}

fn load_completions(conn: &Connection, habit_id: &HabitId) -> Result<Vec<CompletionRecord>, StorageError> {
    let mut stmt = conn.prepare(
        "SELECT day, count FROM completions WHERE habit_id = ?1 ORDER BY day ASC"
    )?;

    let records = stmt
        .query_map(params![habit_id.to_string()], |row| {
            let day: NaiveDate = row.get(0)?;
            Ok(CompletionRecord::new(day, row.get(1)?))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(records)
}

fn load_habit(conn: &Connection, habit_id: &HabitId) -> Result<Habit, StorageError> {
    let sql = format!("SELECT {} FROM habits WHERE id = ?1", HABIT_COLUMNS);
    let habit = conn
        .query_row(&sql, params![habit_id.to_string()], habit_from_row)
        .optional()?;

    let mut habit = habit.ok_or_else(|| StorageError::HabitNotFound {
        habit_id: habit_id.to_string(),
    })?;
    habit.completions = load_completions(conn, habit_id)?;
    Ok(habit)
}

/// Write the habit row and replace its completion records
///
/// Must run inside a transaction so readers never observe a partial write.
fn write_habit(conn: &Connection, habit: &Habit) -> Result<(), StorageError> {
    let rows_affected = conn.execute(
        "UPDATE habits SET
            title = ?2,
            description = ?3,
            frequency = ?4,
            goal = ?5,
            streak = ?6
         WHERE id = ?1",
        params![
            habit.id.to_string(),
            habit.title,
            habit.description,
            habit.frequency.as_str(),
            habit.goal,
            habit.streak,
        ],
    )?;

    if rows_affected == 0 {
        return Err(StorageError::HabitNotFound {
            habit_id: habit.id.to_string(),
        });
    }

    conn.execute(
        "DELETE FROM completions WHERE habit_id = ?1",
        params![habit.id.to_string()],
    )?;
    insert_completions(conn, habit)?;

    Ok(())
}

fn insert_completions(conn: &Connection, habit: &Habit) -> Result<(), StorageError> {
    // Upsert keeps one row per day even if the in-memory list repeats a day
    let mut stmt = conn.prepare(
        "INSERT INTO completions (habit_id, day, count) VALUES (?1, ?2, ?3)
         ON CONFLICT (habit_id, day) DO UPDATE SET count = excluded.count"
    )?;
    for record in &habit.completions {
        stmt.execute(params![habit.id.to_string(), record.date, record.count])?;
    }
    Ok(())
}

impl HabitStorage for SqliteStorage {
    fn create_user(&self, user: &User) -> Result<(), StorageError> {
        let result = self.conn.execute(
            "INSERT INTO users (id, name, email, password_hash, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                user.id.to_string(),
                user.name,
                user.email,
                user.password_hash,
                user.created_at.to_rfc3339(),
            ],
        );

        match result {
            Ok(_) => {
                tracing::debug!("Created user: {} ({})", user.email, user.id);
                Ok(())
            }
            Err(rusqlite::Error::SqliteFailure(err, _)) if err.code == ErrorCode::ConstraintViolation => {
                Err(StorageError::DuplicateUser {
                    email: user.email.clone(),
                })
            }
            Err(e) => Err(StorageError::Query(e)),
        }
    }

    fn get_user(&self, user_id: &UserId) -> Result<User, StorageError> {
        let sql = format!("SELECT {} FROM users WHERE id = ?1", USER_COLUMNS);
        self.conn
            .query_row(&sql, params![user_id.to_string()], user_from_row)
            .optional()?
            .ok_or_else(|| StorageError::UserNotFound {
                user: user_id.to_string(),
            })
    }

    fn get_user_by_email(&self, email: &str) -> Result<User, StorageError> {
        let sql = format!("SELECT {} FROM users WHERE email = ?1", USER_COLUMNS);
        self.conn
            .query_row(&sql, params![email], user_from_row)
            .optional()?
            .ok_or_else(|| StorageError::UserNotFound {
                user: email.to_string(),
            })
    }

    fn create_habit(&self, habit: &Habit) -> Result<(), StorageError> {
        let tx = self.begin_immediate()?;

        tx.execute(
            "INSERT INTO habits (
                id, owner_id, title, description, frequency, goal, streak, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                habit.id.to_string(),
                habit.owner.to_string(),
                habit.title,
                habit.description,
                habit.frequency.as_str(),
                habit.goal,
                habit.streak,
                habit.created_at.to_rfc3339(),
            ],
        )?;
        insert_completions(&tx, habit)?;
        tx.commit()?;

        tracing::debug!("Created habit: {} ({})", habit.title, habit.id);
        Ok(())
    }

    fn get_habit(&self, habit_id: &HabitId) -> Result<Habit, StorageError> {
        load_habit(&self.conn, habit_id)
    }

    fn list_habits(&self, owner: &UserId) -> Result<Vec<Habit>, StorageError> {
        let sql = format!(
            "SELECT {} FROM habits WHERE owner_id = ?1 ORDER BY created_at DESC",
            HABIT_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let mut habits = stmt
            .query_map(params![owner.to_string()], habit_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        for habit in &mut habits {
            habit.completions = load_completions(&self.conn, &habit.id)?;
        }

        Ok(habits)
    }

    fn update_habit(&self, habit: &Habit) -> Result<(), StorageError> {
        let tx = self.begin_immediate()?;
        write_habit(&tx, habit)?;
        tx.commit()?;

        tracing::debug!("Updated habit: {} ({})", habit.title, habit.id);
        Ok(())
    }

    fn delete_habit(&self, habit_id: &HabitId) -> Result<(), StorageError> {
        let tx = self.begin_immediate()?;

        tx.execute(
            "DELETE FROM completions WHERE habit_id = ?1",
            params![habit_id.to_string()],
        )?;
        let rows_affected = tx.execute(
            "DELETE FROM habits WHERE id = ?1",
            params![habit_id.to_string()],
        )?;

        if rows_affected == 0 {
            return Err(StorageError::HabitNotFound {
                habit_id: habit_id.to_string(),
            });
        }

        tx.commit()?;
        tracing::debug!("Deleted habit: {}", habit_id);
        Ok(())
    }

    fn modify_habit(
        &self,
        habit_id: &HabitId,
        mutation: &mut HabitMutation<'_>,
    ) -> Result<Habit, StorageError> {
        let tx = self.begin_immediate()?;

        let mut habit = load_habit(&tx, habit_id)?;
        // An error here drops the transaction, which rolls it back
        mutation(&mut habit)?;
        write_habit(&tx, &habit)?;
        tx.commit()?;

        tracing::debug!("Modified habit atomically: {}", habit_id);
        Ok(habit)
    }
}
