/// Server configuration resolved from command line flags and environment

use std::path::PathBuf;
use clap::Parser;

/// Secret used when none is configured; tokens signed with it are not safe to hand out
pub const DEV_JWT_SECRET: &str = "habit-streaks-development-secret";

pub const DEFAULT_TOKEN_TTL_DAYS: i64 = 30;

/// Work factors bcrypt accepts
pub const MIN_BCRYPT_COST: u32 = 4;
pub const MAX_BCRYPT_COST: u32 = 31;

/// Command line arguments for the habit streaks server
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Path to the SQLite database file
    /// If not provided, uses a default location in the user's home directory
    #[arg(long, env = "HABIT_STREAKS_DB")]
    pub database: Option<PathBuf>,

    /// HMAC secret used to sign bearer tokens
    #[arg(long, env = "HABIT_STREAKS_JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: Option<String>,

    /// Days until an issued token expires
    #[arg(long, env = "HABIT_STREAKS_TOKEN_TTL_DAYS", default_value_t = DEFAULT_TOKEN_TTL_DAYS)]
    pub token_ttl_days: i64,

    /// bcrypt work factor for password hashes
    #[arg(
        long,
        default_value_t = bcrypt::DEFAULT_COST,
        value_parser = clap::value_parser!(u32).range(i64::from(MIN_BCRYPT_COST)..=i64::from(MAX_BCRYPT_COST))
    )]
    pub bcrypt_cost: u32,

    /// Enable debug logging
    #[arg(short, long)]
    pub debug: bool,

    /// Enable verbose output (implies debug)
    #[arg(short, long)]
    pub verbose: bool,
}

impl CliArgs {
    /// Log level implied by the verbosity flags
    pub fn log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else if self.debug {
            "info"
        } else {
            "warn"
        }
    }
}

/// Everything the server needs to start
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub database: PathBuf,
    pub jwt_secret: String,
    pub token_ttl_days: i64,
    pub bcrypt_cost: u32,
}

impl ServerConfig {
    /// Resolve the final configuration, creating the database directory if needed
    pub fn from_args(args: &CliArgs) -> Result<Self, std::io::Error> {
        let database = match &args.database {
            Some(path) => {
                if let Some(parent) = path.parent() {
                    if !parent.as_os_str().is_empty() && !parent.exists() {
                        std::fs::create_dir_all(parent)?;
                    }
                }
                path.clone()
            }
            None => default_database_path()?,
        };

        if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&args.bcrypt_cost) {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!(
                    "bcrypt cost {} is out of range ({}-{})",
                    args.bcrypt_cost, MIN_BCRYPT_COST, MAX_BCRYPT_COST
                ),
            ));
        }

        let jwt_secret = match args.jwt_secret.as_deref().map(str::trim) {
            Some(secret) if !secret.is_empty() => secret.to_string(),
            _ => {
                tracing::warn!(
                    "No JWT secret configured, using the development default. Set HABIT_STREAKS_JWT_SECRET in production"
                );
                DEV_JWT_SECRET.to_string()
            }
        };

        Ok(Self {
            database,
            jwt_secret,
            token_ttl_days: args.token_ttl_days.max(1),
            bcrypt_cost: args.bcrypt_cost,
        })
    }
}

/// Get the default database path with robust fallback strategy
pub fn default_database_path() -> Result<PathBuf, std::io::Error> {
    // Try various locations in order of preference
    let potential_paths = [
        dirs::home_dir().map(|p| p.join(".habit_streaks")),
        dirs::data_dir().map(|p| p.join("habit_streaks")),
        dirs::config_dir().map(|p| p.join("habit_streaks")),
        std::env::current_dir().ok().map(|p| p.join(".habit_streaks")),
    ];

    for potential_path in potential_paths.iter().flatten() {
        if std::fs::create_dir_all(potential_path).is_ok() {
            // Test if we can write to this directory
            let test_file = potential_path.join(".test_write");
            if std::fs::write(&test_file, "test").is_ok() {
                let _ = std::fs::remove_file(&test_file);
                return Ok(potential_path.join("habits.db"));
            }
        }
    }

    // Ultimate fallback: use a temporary directory
    let temp_path = std::env::temp_dir().join("habit_streaks");
    std::fs::create_dir_all(&temp_path)?;

    tracing::warn!("Using temporary directory for database: {}", temp_path.display());
    Ok(temp_path.join("habits.db"))
}
