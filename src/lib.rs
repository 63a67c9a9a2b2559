/// Public library interface for the habit streaks server
///
/// This module exports the server, the streak engine and the public types
/// that can be used by other applications or tests.

use thiserror::Error;

pub mod domain;
pub mod engine;
pub mod storage;
pub mod auth;
pub mod analytics;
pub mod tools;
pub mod mcp;
pub mod config;

// Re-export public modules and types
pub use domain::*;
pub use storage::{HabitStorage, SqliteStorage, StorageError};
pub use auth::{AuthError, AuthService, Session};
pub use analytics::{AnalyticsEngine, InsightsReport};
pub use config::{CliArgs, ServerConfig};
pub use tools::ToolError;

/// Errors that can occur during server operation
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Database error: {0}")]
    Database(#[from] storage::StorageError),

    #[error("Domain validation error: {0}")]
    Domain(#[from] domain::DomainError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Habit streaks server that implements the MCP protocol
///
/// This server owns the SQLite storage and the authentication service and
/// exposes account and habit tools over JSON-RPC.
pub struct HabitServer {
    storage: SqliteStorage,
    auth: AuthService,
}

impl HabitServer {
    /// Create a new server from resolved configuration
    ///
    /// This will initialize the SQLite database with the required schema
    /// if it doesn't already exist.
    pub async fn new(config: &ServerConfig) -> Result<Self, ServerError> {
        tracing::info!("Initializing habit streaks server with database: {:?}", config.database);

        let storage = SqliteStorage::new(config.database.clone())?;
        let auth = AuthService::new(config.jwt_secret.clone(), config.token_ttl_days, config.bcrypt_cost);

        Ok(Self::from_parts(storage, auth))
    }

    /// Assemble a server from an already opened storage
    pub fn from_parts(storage: SqliteStorage, auth: AuthService) -> Self {
        Self { storage, auth }
    }

    /// Run the MCP server, handling JSON-RPC requests over stdin/stdout
    ///
    /// This method will block until the server is shut down or an error occurs.
    pub async fn run(self) -> Result<(), ServerError> {
        tracing::info!("Starting MCP server...");

        let mut mcp_server = mcp::McpServer::new(self);
        mcp_server.run().await?;

        Ok(())
    }

    /// Get a reference to the storage layer (useful for testing)
    pub fn storage(&self) -> &SqliteStorage {
        &self.storage
    }

    pub fn auth(&self) -> &AuthService {
        &self.auth
    }
}
