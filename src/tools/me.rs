/// Tool returning the caller's own account
///
/// This module implements the user_me MCP tool.

use crate::auth::Session;
use crate::domain::PublicUser;
use crate::storage::HabitStorage;
use crate::tools::ToolError;

pub fn current_user<S: HabitStorage>(storage: &S, session: &Session) -> Result<PublicUser, ToolError> {
    Ok(storage.get_user(&session.user_id)?.public())
}
