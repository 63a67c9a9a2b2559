/// Basic integration tests
use habit_streaks::mcp::protocol::error_codes;
use habit_streaks::mcp::McpServer;
use habit_streaks::*;
use serde_json::{json, Value};
use tempfile::NamedTempFile;

#[cfg(test)]
mod basic_integration_tests {
    use super::*;

    fn test_server(db: &NamedTempFile) -> McpServer {
        let storage = SqliteStorage::new(db.path().to_path_buf()).expect("Failed to create storage");
        let auth = AuthService::new("integration-secret", 30, 4);
        McpServer::new(HabitServer::from_parts(storage, auth))
    }

    async fn request(server: &mut McpServer, method: &str, params: Value) -> Value {
        let line = json!({"jsonrpc": "2.0", "id": 1, "method": method, "params": params}).to_string();
        let response = server.process_line(&line).await.expect("Expected a response");
        serde_json::to_value(response).unwrap()
    }

    async fn call_tool(server: &mut McpServer, name: &str, arguments: Value) -> Value {
        request(server, "tools/call", json!({"name": name, "arguments": arguments})).await
    }

    /// Decode the JSON a successful tool call returns as text
    fn payload(response: &Value) -> Value {
        assert!(response.get("error").is_none(), "unexpected error: {}", response);
        let text = response["result"]["content"][0]["text"].as_str().unwrap();
        serde_json::from_str(text).unwrap()
    }

    fn error_code(response: &Value) -> i64 {
        response["error"]["code"].as_i64().unwrap_or_else(|| panic!("expected error: {}", response))
    }

    async fn register(server: &mut McpServer, email: &str) -> String {
        let response = call_tool(server, "user_register", json!({"email": email, "password": "pw-123"})).await;
        payload(&response)["token"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_handshake_and_tool_list() {
        let db = NamedTempFile::new().expect("Failed to create temp file");
        let mut server = test_server(&db);

        let init = request(&mut server, "initialize", json!({
            "protocolVersion": "2024-11-05",
            "capabilities": {},
            "clientInfo": {"name": "test-client", "version": "1.0"}
        }))
        .await;
        assert_eq!(init["result"]["protocolVersion"], json!("2024-11-05"));

        let notification = json!({"jsonrpc": "2.0", "method": "notifications/initialized"}).to_string();
        assert!(server.process_line(&notification).await.is_none());
        assert!(server.is_initialized());

        let list = request(&mut server, "tools/list", json!({})).await;
        let tools = list["result"]["tools"].as_array().unwrap();
        assert_eq!(tools.len(), 12);
        assert!(tools.iter().all(|tool| tool["inputSchema"]["type"] == json!("object")));
    }

    #[tokio::test]
    async fn test_complete_workflow() {
        let db = NamedTempFile::new().expect("Failed to create temp file");
        let mut server = test_server(&db);
        let token = register(&mut server, "walker@example.com").await;

        let me = payload(&call_tool(&mut server, "user_me", json!({"token": token})).await);
        assert_eq!(me["name"], json!("User"));
        assert!(me.get("password_hash").is_none());

        let created = payload(&call_tool(&mut server, "habit_create", json!({
            "token": token, "title": "Walk 10k steps", "goal": 2
        })).await);
        let habit_id = created["habit"]["id"].as_str().unwrap().to_string();

        let partial = payload(&call_tool(&mut server, "habit_complete", json!({
            "token": token, "habit_id": habit_id, "count": 1
        })).await);
        assert_eq!(partial["met"], json!(false));
        assert_eq!(partial["progress"], json!(50));

        let done = payload(&call_tool(&mut server, "habit_complete", json!({
            "token": token, "habit_id": habit_id, "increment": 5
        })).await);
        assert_eq!(done["count"], json!(2));
        assert_eq!(done["met"], json!(true));
        assert_eq!(done["habit"]["streak"], json!(1));
        assert_eq!(done["habit"]["completions"].as_array().unwrap().len(), 1);

        let list = payload(&call_tool(&mut server, "habit_list", json!({"token": token})).await);
        assert_eq!(list["habits"][0]["summary"]["current_streak"], json!(1));
        assert_eq!(list["habits"][0]["summary"]["today_status"], json!("completed"));
        assert_eq!(list["summary"]["average_completion"], json!(100));

        let streaks = payload(&call_tool(&mut server, "habit_streaks", json!({"token": token})).await);
        assert_eq!(streaks["streaks"].as_array().unwrap().len(), 1);

        let calendar = payload(&call_tool(&mut server, "habit_calendar", json!({
            "token": token, "habit_id": habit_id
        })).await);
        assert_eq!(calendar["months"].as_array().unwrap().len(), 1);
        assert_eq!(calendar["months"][0]["met_days"], json!(1));
        assert_eq!(calendar["statistics"]["recorded_days"], json!(1));

        let insights = payload(&call_tool(&mut server, "habit_insights", json!({
            "token": token, "time_frame": "week"
        })).await);
        assert_eq!(insights["summary"]["total_check_ins"], json!(1));

        let updated = payload(&call_tool(&mut server, "habit_update", json!({
            "token": token, "habit_id": habit_id, "goal": 1
        })).await);
        assert_eq!(updated["habit"]["completions"][0]["count"], json!(1));

        let deleted = call_tool(&mut server, "habit_delete", json!({"token": token, "habit_id": habit_id})).await;
        assert_eq!(payload(&deleted)["habit_id"], json!(habit_id));

        let gone = call_tool(&mut server, "habit_get", json!({"token": token, "habit_id": habit_id})).await;
        assert_eq!(error_code(&gone), i64::from(error_codes::NOT_FOUND));
    }

    #[tokio::test]
    async fn test_authentication_and_ownership() {
        let db = NamedTempFile::new().expect("Failed to create temp file");
        let mut server = test_server(&db);
        let owner = register(&mut server, "owner@example.com").await;
        let stranger = register(&mut server, "stranger@example.com").await;

        let created = payload(&call_tool(&mut server, "habit_create", json!({"token": owner, "title": "Private"})).await);
        let habit_id = created["habit"]["id"].as_str().unwrap().to_string();

        let foreign = call_tool(&mut server, "habit_complete", json!({"token": stranger, "habit_id": habit_id})).await;
        assert_eq!(error_code(&foreign), i64::from(error_codes::NOT_AUTHORIZED));

        let anonymous = call_tool(&mut server, "habit_list", json!({})).await;
        assert_eq!(error_code(&anonymous), i64::from(error_codes::AUTHENTICATION_FAILED));

        let forged = call_tool(&mut server, "habit_list", json!({"token": "not.a.token"})).await;
        assert_eq!(error_code(&forged), i64::from(error_codes::AUTHENTICATION_FAILED));

        let duplicate = call_tool(&mut server, "user_register", json!({"email": "OWNER@example.com", "password": "x"})).await;
        assert_eq!(error_code(&duplicate), i64::from(error_codes::CONFLICT));
        assert_eq!(duplicate["error"]["message"], json!("User already exists"));

        let bad_login = call_tool(&mut server, "user_login", json!({"email": "owner@example.com", "password": "wrong"})).await;
        assert_eq!(error_code(&bad_login), i64::from(error_codes::AUTHENTICATION_FAILED));
        assert_eq!(bad_login["error"]["message"], json!("Invalid email or password"));

        let login = payload(&call_tool(&mut server, "user_login", json!({"email": "owner@example.com", "password": "pw-123"})).await);
        assert!(login["token"].as_str().is_some());
    }

    #[tokio::test]
    async fn test_protocol_errors() {
        let db = NamedTempFile::new().expect("Failed to create temp file");
        let mut server = test_server(&db);
        let token = register(&mut server, "errors@example.com").await;

        let parse = server.process_line("{not json").await.unwrap();
        assert_eq!(parse.error.unwrap().code, error_codes::PARSE_ERROR);

        let unknown_method = request(&mut server, "resources/list", json!({})).await;
        assert_eq!(error_code(&unknown_method), i64::from(error_codes::METHOD_NOT_FOUND));

        let unknown_tool = call_tool(&mut server, "habit_teleport", json!({"token": token})).await;
        assert_eq!(error_code(&unknown_tool), i64::from(error_codes::METHOD_NOT_FOUND));

        let missing_title = call_tool(&mut server, "habit_create", json!({"token": token})).await;
        assert_eq!(error_code(&missing_title), i64::from(error_codes::INVALID_PARAMS));

        let zero_goal = call_tool(&mut server, "habit_create", json!({"token": token, "title": "Zero", "goal": 0})).await;
        assert_eq!(error_code(&zero_goal), i64::from(error_codes::VALIDATION_ERROR));
    }

    #[test]
    fn test_database_persistence() {
        let db = NamedTempFile::new().expect("Failed to create temp file");
        let config = ServerConfig {
            database: db.path().to_path_buf(),
            jwt_secret: "persistence-secret".to_string(),
            token_ttl_days: 30,
            bcrypt_cost: 4,
        };

        let user = User::new(Some("Kept".to_string()), "kept@example.com", "hash".to_string()).unwrap();
        {
            let server = tokio_test::block_on(HabitServer::new(&config)).expect("Failed to create first server");
            server.storage().create_user(&user).unwrap();
        }

        let reopened = tokio_test::block_on(HabitServer::new(&config)).expect("Failed to create second server");
        assert_eq!(reopened.storage().get_user(&user.id).unwrap().name, "Kept");
    }
}
