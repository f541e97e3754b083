//! Stdio tool server: line-delimited JSON-RPC 2.0 with MCP framing over
//! stdin/stdout. Stdout carries only protocol messages; logging goes to
//! stderr.

pub mod protocol;
pub mod tools;

use std::io::{self, BufRead, BufReader, Write};

use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::mcp::protocol::{
    CallToolParams, CallToolResult, InitializeResult, JsonRpcRequest, JsonRpcResponse,
    ListToolsResult, ServerCapabilities, ServerInfo, ToolsCapability, INVALID_PARAMS,
    METHOD_NOT_FOUND, NOT_INITIALIZED, PARSE_ERROR, PROTOCOL_VERSION,
};
use crate::query::engine::QueryEngine;

pub const SERVER_NAME: &str = "resume-analyzer";

pub struct McpServer {
    engine: QueryEngine,
    initialized: bool,
}

impl McpServer {
    pub fn new(engine: QueryEngine) -> Self {
        Self {
            engine,
            initialized: false,
        }
    }

    /// Reads requests line by line from stdin until EOF, writing one
    /// response line per request.
    pub async fn run_stdio(&mut self) -> anyhow::Result<()> {
        info!("Serving tool requests over stdio");

        let stdin = io::stdin();
        let mut stdout = io::stdout();
        let reader = BufReader::new(stdin);

        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            if let Some(response) = self.handle_line(&line).await {
                writeln!(stdout, "{}", serde_json::to_string(&response)?)?;
                stdout.flush()?;
            }
        }

        info!("stdin closed, shutting down");
        Ok(())
    }

    /// Handles one protocol line. Notifications produce no response.
    pub async fn handle_line(&mut self, line: &str) -> Option<JsonRpcResponse> {
        let value: Value = match serde_json::from_str(line) {
            Ok(v) => v,
            Err(e) => {
                warn!("Unparseable message: {e}");
                return Some(JsonRpcResponse::failure(
                    None,
                    PARSE_ERROR,
                    format!("invalid JSON: {e}"),
                ));
            }
        };

        // Messages without an id are notifications.
        if value.get("id").is_none() {
            let method = value.get("method").and_then(Value::as_str).unwrap_or("");
            self.handle_notification(method);
            return None;
        }

        let request: JsonRpcRequest = match serde_json::from_value(value) {
            Ok(r) => r,
            Err(e) => {
                return Some(JsonRpcResponse::failure(
                    None,
                    PARSE_ERROR,
                    format!("malformed request: {e}"),
                ))
            }
        };
        Some(self.handle_request(request).await)
    }

    fn handle_notification(&mut self, method: &str) {
        match method {
            "initialized" | "notifications/initialized" => {
                info!("Client confirmed initialization");
                self.initialized = true;
            }
            other => debug!("Ignoring notification: {other}"),
        }
    }

    async fn handle_request(&mut self, request: JsonRpcRequest) -> JsonRpcResponse {
        debug!("Handling request: method={}", request.method);
        match request.method.as_str() {
            "initialize" => self.handle_initialize(request.id),
            "tools/list" => self.handle_list_tools(request.id),
            "tools/call" => self.handle_call_tool(request.id, request.params).await,
            "ping" => JsonRpcResponse::success(request.id, json!({})),
            other => JsonRpcResponse::failure(
                request.id,
                METHOD_NOT_FOUND,
                format!("method not found: {other}"),
            ),
        }
    }

    fn handle_initialize(&mut self, id: Option<Value>) -> JsonRpcResponse {
        let result = InitializeResult {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: ToolsCapability {
                    list_changed: false,
                },
            },
            server_info: ServerInfo {
                name: SERVER_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        };
        match serde_json::to_value(result) {
            Ok(v) => JsonRpcResponse::success(id, v),
            Err(e) => JsonRpcResponse::failure(id, PARSE_ERROR, e.to_string()),
        }
    }

    fn handle_list_tools(&self, id: Option<Value>) -> JsonRpcResponse {
        if !self.initialized {
            return JsonRpcResponse::failure(id, NOT_INITIALIZED, "server not initialized");
        }
        let result = ListToolsResult {
            tools: tools::tool_descriptors(),
        };
        match serde_json::to_value(result) {
            Ok(v) => JsonRpcResponse::success(id, v),
            Err(e) => JsonRpcResponse::failure(id, PARSE_ERROR, e.to_string()),
        }
    }

    async fn handle_call_tool(&self, id: Option<Value>, params: Option<Value>) -> JsonRpcResponse {
        if !self.initialized {
            return JsonRpcResponse::failure(id, NOT_INITIALIZED, "server not initialized");
        }
        let params: CallToolParams = match params.and_then(|p| serde_json::from_value(p).ok()) {
            Some(p) => p,
            None => return JsonRpcResponse::failure(id, INVALID_PARAMS, "invalid params"),
        };

        info!("Tool call: {}", params.name);
        let result = match tools::dispatch(&self.engine, &params.name, &params.arguments).await {
            Ok(value) => CallToolResult::json(&value),
            // Domain failures ride inside the tool result; protocol errors
            // are reserved for malformed frames.
            Err(e) => CallToolResult::domain_error(e.to_string()),
        };
        match serde_json::to_value(result) {
            Ok(v) => JsonRpcResponse::success(id, v),
            Err(e) => JsonRpcResponse::failure(id, PARSE_ERROR, e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::resume::NewResume;
    use crate::storage::memory::MemResumeStore;
    use crate::storage::ResumeStore;
    use std::sync::Arc;

    async fn server_with(records: Vec<NewResume>) -> McpServer {
        let store = Arc::new(MemResumeStore::new());
        for r in records {
            store.insert(r).await.unwrap();
        }
        McpServer::new(QueryEngine::new(store))
    }

    fn record(name: &str, skills: &[&str]) -> NewResume {
        NewResume {
            name: Some(name.to_string()),
            email: None,
            phone: None,
            skills: skills.iter().map(|s| s.to_string()).collect(),
            education: vec![],
            experience: vec![],
            summary: String::new(),
            raw_text: name.to_string(),
            source_file: "cv.pdf".to_string(),
            extraction_notes: vec![],
        }
    }

    async fn initialize(server: &mut McpServer) {
        let init = r#"{"jsonrpc":"2.0","id":0,"method":"initialize","params":{}}"#;
        let response = server.handle_line(init).await.unwrap();
        assert!(response.error.is_none());
        let note = r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#;
        assert!(server.handle_line(note).await.is_none());
    }

    #[tokio::test]
    async fn test_initialize_reports_tool_capability() {
        let mut server = server_with(vec![]).await;
        let response = server
            .handle_line(r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#)
            .await
            .unwrap();
        let result = response.result.unwrap();
        assert_eq!(result["protocolVersion"], PROTOCOL_VERSION);
        assert_eq!(result["serverInfo"]["name"], SERVER_NAME);
    }

    #[tokio::test]
    async fn test_tools_require_initialization() {
        let mut server = server_with(vec![]).await;
        let response = server
            .handle_line(r#"{"jsonrpc":"2.0","id":1,"method":"tools/list"}"#)
            .await
            .unwrap();
        assert_eq!(response.error.unwrap().code, NOT_INITIALIZED);
    }

    #[tokio::test]
    async fn test_tools_list_after_initialization() {
        let mut server = server_with(vec![]).await;
        initialize(&mut server).await;
        let response = server
            .handle_line(r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#)
            .await
            .unwrap();
        let tools = response.result.unwrap()["tools"].clone();
        let names: Vec<_> = tools
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["name"].as_str().unwrap().to_string())
            .collect();
        assert!(names.contains(&"search_by_skill".to_string()));
        assert!(names.contains(&"get_database_stats".to_string()));
    }

    #[tokio::test]
    async fn test_tool_call_returns_structured_result() {
        let mut server = server_with(vec![record("Ada", &["python"])]).await;
        initialize(&mut server).await;
        let call = r#"{"jsonrpc":"2.0","id":3,"method":"tools/call","params":{"name":"search_by_skill","arguments":{"skill":"python"}}}"#;
        let response = server.handle_line(call).await.unwrap();
        let result = response.result.unwrap();
        assert!(result.get("isError").is_none());
        let text = result["content"][0]["text"].as_str().unwrap();
        let payload: Value = serde_json::from_str(text).unwrap();
        assert_eq!(payload["count"], 1);
        assert_eq!(payload["resumes"][0]["name"], "Ada");
    }

    #[tokio::test]
    async fn test_tool_call_domain_error_is_flagged_not_fatal() {
        let mut server = server_with(vec![]).await;
        initialize(&mut server).await;
        let call = r#"{"jsonrpc":"2.0","id":4,"method":"tools/call","params":{"name":"count_by_field","arguments":{"field":"shoe_size"}}}"#;
        let response = server.handle_line(call).await.unwrap();
        assert!(response.error.is_none());
        let result = response.result.unwrap();
        assert_eq!(result["isError"], true);
    }

    #[tokio::test]
    async fn test_unknown_method_is_method_not_found() {
        let mut server = server_with(vec![]).await;
        let response = server
            .handle_line(r#"{"jsonrpc":"2.0","id":5,"method":"resources/list"}"#)
            .await
            .unwrap();
        assert_eq!(response.error.unwrap().code, METHOD_NOT_FOUND);
    }

    #[tokio::test]
    async fn test_garbage_line_is_parse_error() {
        let mut server = server_with(vec![]).await;
        let response = server.handle_line("{nope").await.unwrap();
        assert_eq!(response.error.unwrap().code, PARSE_ERROR);
    }
}
