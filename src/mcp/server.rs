/// MCP server implementation that handles JSON-RPC communication
///
/// This module implements the actual MCP server that:
/// 1. Reads JSON-RPC requests from stdin
/// 2. Validates the caller's token and dispatches tool calls
/// 3. Sends JSON-RPC responses to stdout

use schemars::JsonSchema;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, error, info, warn};

use crate::auth::Session;
use crate::mcp::protocol::*;
use crate::tools::{self, ToolError};
use crate::{HabitServer, ServerError};

/// Tools that need no arguments besides the token
#[derive(Debug, Deserialize, JsonSchema)]
struct NoArguments {}

/// MCP server that handles communication with clients
pub struct McpServer {
    /// The underlying habit server
    habit_server: HabitServer,
    /// Whether the client has finished initialization
    initialized: bool,
}

impl McpServer {
    /// Create a new MCP server
    pub fn new(habit_server: HabitServer) -> Self {
        Self {
            habit_server,
            initialized: false,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Run the MCP server, handling JSON-RPC over stdin/stdout
    pub async fn run(&mut self) -> Result<(), ServerError> {
        info!("Starting MCP server, waiting for JSON-RPC requests...");

        let stdin = tokio::io::stdin();
        let mut reader = BufReader::new(stdin);
        let mut stdout = tokio::io::stdout();

        let mut line = String::new();

        loop {
            line.clear();

            match reader.read_line(&mut line).await {
                Ok(0) => {
                    info!("MCP server shutting down (stdin closed)");
                    break;
                }
                Ok(_) => {
                    if let Some(response) = self.process_line(&line).await {
                        let response_str = serde_json::to_string(&response)?;

                        // Write response + newline
                        stdout.write_all(response_str.as_bytes()).await?;
                        stdout.write_all(b"\n").await?;
                        stdout.flush().await?;

                        debug!("Sent response: {}", response_str);
                    }
                }
                Err(e) => {
                    error!("Failed to read from stdin: {}", e);
                    break;
                }
            }
        }

        Ok(())
    }

    /// Process a single line of JSON-RPC input
    ///
    /// Returns `None` for blank lines and notifications.
    pub async fn process_line(&mut self, line: &str) -> Option<JsonRpcResponse> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        debug!("Processing request: {}", line);

        let request: JsonRpcRequest = match serde_json::from_str(line) {
            Ok(req) => req,
            Err(e) => {
                error!("Failed to parse JSON-RPC request: {}", e);
                return Some(JsonRpcResponse::error(
                    Value::Null,
                    error_codes::PARSE_ERROR,
                    format!("Invalid JSON: {}", e),
                    None,
                ));
            }
        };

        self.handle_request(request).await
    }

    /// Handle a JSON-RPC request
    async fn handle_request(&mut self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        let Some(id) = request.id else {
            self.handle_notification(&request.method);
            return None;
        };

        if request.jsonrpc != "2.0" {
            return Some(JsonRpcResponse::error(
                id,
                error_codes::INVALID_REQUEST,
                format!("Unsupported JSON-RPC version '{}'", request.jsonrpc),
                None,
            ));
        }

        let response = match request.method.as_str() {
            "initialize" => self.handle_initialize(id, request.params).await,
            "initialized" => {
                self.initialized = true;
                JsonRpcResponse::success(id, Value::Null)
            }
            "ping" => JsonRpcResponse::success(id, json!({})),
            "tools/list" => self.handle_tools_list(id).await,
            "tools/call" => self.handle_tools_call(id, request.params).await,
            _ => JsonRpcResponse::error(
                id,
                error_codes::METHOD_NOT_FOUND,
                format!("Method '{}' not found", request.method),
                None,
            ),
        };

        Some(response)
    }

    fn handle_notification(&mut self, method: &str) {
        match method {
            "notifications/initialized" | "initialized" => {
                self.initialized = true;
                debug!("Client finished initialization");
            }
            other => debug!("Ignoring notification '{}'", other),
        }
    }

    /// Handle MCP initialization request
    async fn handle_initialize(&mut self, id: Value, params: Option<Value>) -> JsonRpcResponse {
        match params.map(serde_json::from_value::<InitializeParams>) {
            Some(Ok(init)) => {
                let client = init.client_info.as_ref().map_or("unknown", |info| info.name.as_str());
                info!("MCP client '{}' connected (protocol {})", client, init.protocol_version);
            }
            Some(Err(e)) => warn!("Unrecognized initialize parameters: {}", e),
            None => info!("MCP client connected"),
        }

        let result = InitializeResult {
            protocol_version: MCP_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {
                    list_changed: false,
                }),
            },
            server_info: ServerInfo {
                name: "Habit Streaks".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        };

        respond(id, &result)
    }

    /// Handle tools/list request
    async fn handle_tools_list(&mut self, id: Value) -> JsonRpcResponse {
        JsonRpcResponse::success(id, json!({ "tools": tool_definitions() }))
    }

    /// Handle tools/call request
    async fn handle_tools_call(&mut self, id: Value, params: Option<Value>) -> JsonRpcResponse {
        let call: ToolCallParams = match params.map(serde_json::from_value) {
            Some(Ok(call)) => call,
            Some(Err(e)) => {
                return JsonRpcResponse::error(
                    id,
                    error_codes::INVALID_PARAMS,
                    format!("Invalid parameters: {}", e),
                    None,
                );
            }
            None => {
                return JsonRpcResponse::error(
                    id,
                    error_codes::INVALID_PARAMS,
                    "Missing parameters".to_string(),
                    None,
                );
            }
        };

        debug!("Calling tool '{}'", call.name);
        match self.call_tool(&call.name, call.arguments) {
            Ok(value) => match serde_json::to_string_pretty(&value) {
                Ok(text) => respond(id, &ToolCallResult::success(text)),
                Err(e) => JsonRpcResponse::error(id, error_codes::INTERNAL_ERROR, e.to_string(), None),
            },
            Err(e) => {
                debug!("Tool '{}' failed: {}", call.name, e.message);
                JsonRpcResponse::failure(id, e)
            }
        }
    }

    /// Route a tool call, authenticating it first unless it is an account tool
    fn call_tool(&self, name: &str, arguments: Map<String, Value>) -> Result<Value, JsonRpcError> {
        let storage = self.habit_server.storage();
        let auth = self.habit_server.auth();

        match requires_session(name) {
            None => Err(JsonRpcError::new(
                error_codes::METHOD_NOT_FOUND,
                format!("Unknown tool: {}", name),
            )),
            Some(false) => match name {
                "user_register" => to_json(tools::register_user(storage, auth, parse_args(arguments)?)),
                _ => to_json(tools::login_user(storage, auth, parse_args(arguments)?)),
            },
            Some(true) => {
                let session = self.authenticate(&arguments)?;
                match name {
                    "user_me" => to_json(tools::current_user(storage, &session)),
                    "habit_create" => to_json(tools::create_habit(storage, &session, parse_args(arguments)?)),
                    "habit_list" => to_json(tools::list_habits(storage, &session)),
                    "habit_get" => to_json(tools::get_habit(storage, &session, parse_args(arguments)?)),
                    "habit_update" => to_json(tools::update_habit(storage, &session, parse_args(arguments)?)),
                    "habit_delete" => to_json(tools::delete_habit(storage, &session, parse_args(arguments)?)),
                    "habit_complete" => to_json(tools::complete_habit(storage, &session, parse_args(arguments)?)),
                    "habit_streaks" => to_json(tools::habit_streaks(storage, &session)),
                    "habit_calendar" => to_json(tools::habit_calendar(storage, &session, parse_args(arguments)?)),
                    _ => to_json(tools::habit_insights(storage, &session, parse_args(arguments)?)),
                }
            }
        }
    }

    fn authenticate(&self, arguments: &Map<String, Value>) -> Result<Session, JsonRpcError> {
        let token = arguments.get("token").and_then(Value::as_str);
        self.habit_server
            .auth()
            .authenticate(token)
            .map_err(|e| JsonRpcError::from(ToolError::from(e)))
    }
}

/// `Some(true)` for tools that need a token, `Some(false)` for account tools, `None` if unknown
fn requires_session(name: &str) -> Option<bool> {
    match name {
        "user_register" | "user_login" => Some(false),
        "user_me" | "habit_create" | "habit_list" | "habit_get" | "habit_update" | "habit_delete"
        | "habit_complete" | "habit_streaks" | "habit_calendar" | "habit_insights" => Some(true),
        _ => None,
    }
}

fn parse_args<P: DeserializeOwned>(arguments: Map<String, Value>) -> Result<P, JsonRpcError> {
    serde_json::from_value(Value::Object(arguments))
        .map_err(|e| JsonRpcError::new(error_codes::INVALID_PARAMS, format!("Invalid arguments: {}", e)))
}

fn to_json<T: Serialize>(result: Result<T, ToolError>) -> Result<Value, JsonRpcError> {
    let value = result?;
    serde_json::to_value(value).map_err(|e| JsonRpcError::new(error_codes::INTERNAL_ERROR, e.to_string()))
}

fn respond<T: Serialize>(id: Value, result: &T) -> JsonRpcResponse {
    match serde_json::to_value(result) {
        Ok(value) => JsonRpcResponse::success(id, value),
        Err(e) => JsonRpcResponse::error(id, error_codes::INTERNAL_ERROR, e.to_string(), None),
    }
}

/// Input schema generated from a parameter struct, plus the token for authenticated tools
fn input_schema<P: JsonSchema>(authenticated: bool) -> Value {
    let mut schema = serde_json::to_value(schemars::schema_for!(P)).unwrap_or_else(|_| json!({}));

    if let Some(object) = schema.as_object_mut() {
        object.remove("$schema");
        object.remove("title");
        object.insert("type".to_string(), json!("object"));

        if authenticated {
            let properties = object.entry("properties").or_insert_with(|| json!({}));
            if let Some(properties) = properties.as_object_mut() {
                properties.insert(
                    "token".to_string(),
                    json!({"type": "string", "description": "Bearer token from user_register or user_login"}),
                );
            }
            let required = object.entry("required").or_insert_with(|| json!([]));
            if let Some(required) = required.as_array_mut() {
                required.push(json!("token"));
            }
        }
    }

    schema
}

fn definition<P: JsonSchema>(name: &str, description: &str, authenticated: bool) -> ToolDefinition {
    ToolDefinition {
        name: name.to_string(),
        description: description.to_string(),
        input_schema: input_schema::<P>(authenticated),
    }
}

/// Every tool this server provides
pub fn tool_definitions() -> Vec<ToolDefinition> {
    vec![
        definition::<tools::RegisterParams>("user_register", "Create an account and receive a token", false),
        definition::<tools::LoginParams>("user_login", "Log in with email and password to receive a token", false),
        definition::<NoArguments>("user_me", "Show the account the token belongs to", true),
        definition::<tools::CreateHabitParams>("habit_create", "Create a new habit to track", true),
        definition::<NoArguments>("habit_list", "List your habits with current streaks and today's progress", true),
        definition::<tools::HabitIdParams>("habit_get", "Show one habit with its full completion history", true),
        definition::<tools::UpdateHabitParams>("habit_update", "Change a habit's title, description, frequency or goal", true),
        definition::<tools::HabitIdParams>("habit_delete", "Delete a habit and its history", true),
        definition::<tools::CompleteHabitParams>("habit_complete", "Record completions for today or a past day", true),
        definition::<NoArguments>("habit_streaks", "List habits with a running streak", true),
        definition::<tools::CalendarParams>("habit_calendar", "Day-by-day completion calendar grouped by month", true),
        definition::<tools::InsightsParams>("habit_insights", "Progress trends and statistics over a time frame", true),
    ]
}
