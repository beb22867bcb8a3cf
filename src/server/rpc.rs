//! JSON-RPC 2.0 protocol over line-delimited stdio.
//!
//! Supported methods: `initialize`, `ping`, `tools/list` and `tools/call`.
//! Requests without an `id` are notifications and receive no response.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, error, info};

use super::{handle_tool_call, SharedState};
use crate::error::RpcError;

pub const PARSE_ERROR: i32 = -32700;
pub const INVALID_REQUEST: i32 = -32600;
pub const METHOD_NOT_FOUND: i32 = -32601;
pub const INVALID_PARAMS: i32 = -32602;
pub const INTERNAL_ERROR: i32 = -32603;

/// JSON-RPC 2.0 request structure.
#[derive(Debug, Deserialize)]
pub struct JsonRpcRequest {
    /// JSON-RPC version; anything but "2.0" is rejected.
    #[serde(default)]
    pub jsonrpc: String,
    /// Request identifier (None for notifications).
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
}

/// JSON-RPC 2.0 response structure.
#[derive(Debug, Serialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    /// Request identifier (null when the request could not be parsed).
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

/// JSON-RPC 2.0 error object.
#[derive(Debug, Serialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ServerInfo {
    pub name: String,
    pub version: String,
}

/// Result of the initialize handshake.
#[derive(Debug, Serialize)]
pub struct InitializeResult {
    #[serde(rename = "protocolVersion")]
    pub protocol_version: String,
    pub capabilities: Value,
    #[serde(rename = "serverInfo")]
    pub server_info: ServerInfo,
}

/// Tool definition with JSON Schema.
#[derive(Debug, Clone, Serialize)]
pub struct Tool {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

/// Parameters for a tools/call request.
#[derive(Debug, Deserialize)]
pub struct ToolCallParams {
    pub name: String,
    #[serde(default)]
    pub arguments: Option<Value>,
}

/// Content item within a tool result.
#[derive(Debug, Serialize)]
pub struct ToolResultContent {
    #[serde(rename = "type")]
    pub content_type: String,
    pub text: String,
}

/// Result of a tool invocation.
#[derive(Debug, Serialize)]
pub struct ToolCallResult {
    pub content: Vec<ToolResultContent>,
    #[serde(rename = "isError", skip_serializing_if = "Option::is_none")]
    pub is_error: Option<bool>,
}

impl JsonRpcResponse {
    pub fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id: id.unwrap_or(Value::Null),
            result: Some(result),
            error: None,
        }
    }

    pub fn error(id: Option<Value>, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id: id.unwrap_or(Value::Null),
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.into(),
            }),
        }
    }

    /// Error response for a request the adapter refused.
    pub fn rejected(id: Option<Value>, err: &RpcError) -> Self {
        let code = match err {
            RpcError::InvalidRequest { .. } => INVALID_REQUEST,
            RpcError::UnknownTool { .. } | RpcError::InvalidParameters { .. } => INVALID_PARAMS,
            RpcError::Json(_) => PARSE_ERROR,
        };
        Self::error(id, code, err.to_string())
    }
}

/// Reasoning server speaking JSON-RPC 2.0, one message per line.
pub struct RpcServer {
    state: SharedState,
}

impl RpcServer {
    pub fn new(state: SharedState) -> Self {
        Self { state }
    }

    /// Serve stdin/stdout until EOF.
    pub async fn run(&self) -> std::io::Result<()> {
        info!(
            strategy = %self.state.engine.strategy_kind(),
            "HRM reasoning server starting..."
        );
        let reader = BufReader::new(tokio::io::stdin());
        self.serve(reader, tokio::io::stdout()).await
    }

    /// Serve requests read from `reader`, writing responses to `writer`.
    pub async fn serve<R, W>(&self, mut reader: R, mut writer: W) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut line = String::new();

        loop {
            line.clear();
            if reader.read_line(&mut line).await? == 0 {
                info!("EOF received, shutting down");
                break;
            }

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            if let Some(response) = self.handle_line(trimmed).await {
                let response_json = serde_json::to_string(&response)?;
                debug!(response_chars = response_json.len(), "Sending response");

                writer.write_all(response_json.as_bytes()).await?;
                writer.write_all(b"\n").await?;
                writer.flush().await?;
            }
        }

        Ok(())
    }

    /// Handle one raw message. Returns `None` for notifications.
    pub async fn handle_line(&self, line: &str) -> Option<JsonRpcResponse> {
        debug!(request_chars = line.len(), "Received request");

        match serde_json::from_str::<JsonRpcRequest>(line) {
            Ok(request) => self.handle_request(request).await,
            Err(e) => {
                error!(error = %e, "Failed to parse request");
                Some(JsonRpcResponse::error(
                    None,
                    PARSE_ERROR,
                    format!("Parse error: {}", e),
                ))
            }
        }
    }

    /// Handle a single JSON-RPC request
    pub async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        let is_notification = request.id.is_none();

        if request.jsonrpc != "2.0" {
            let err = RpcError::InvalidRequest {
                message: format!("unsupported jsonrpc version \"{}\"", request.jsonrpc),
            };
            error!(method = %request.method, error = %err, "Rejected request");
            return Some(JsonRpcResponse::rejected(request.id, &err));
        }

        match request.method.as_str() {
            "initialize" => Some(self.handle_initialize(request.id)),
            "initialized" | "notifications/initialized" | "notifications/cancelled" => {
                debug!(method = %request.method, "Received notification");
                None
            }
            "tools/list" => Some(self.handle_tools_list(request.id)),
            "tools/call" => Some(self.handle_tool_call(request.id, request.params).await),
            "ping" => Some(JsonRpcResponse::success(
                request.id,
                Value::Object(Default::default()),
            )),
            method => {
                if is_notification {
                    debug!(method = %method, "Unknown notification, ignoring");
                    None
                } else {
                    error!(method = %method, "Unknown method");
                    Some(JsonRpcResponse::error(
                        request.id,
                        METHOD_NOT_FOUND,
                        format!("Method not found: {}", method),
                    ))
                }
            }
        }
    }

    fn handle_initialize(&self, id: Option<Value>) -> JsonRpcResponse {
        info!("Handling initialize request");

        let result = InitializeResult {
            protocol_version: "2024-11-05".to_string(),
            capabilities: json!({ "tools": { "listChanged": false } }),
            server_info: ServerInfo {
                name: env!("CARGO_PKG_NAME").to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        };

        match serde_json::to_value(result) {
            Ok(val) => JsonRpcResponse::success(id, val),
            Err(e) => {
                error!(error = %e, "Failed to serialize initialize result");
                JsonRpcResponse::error(id, INTERNAL_ERROR, format!("Internal error: {}", e))
            }
        }
    }

    fn handle_tools_list(&self, id: Option<Value>) -> JsonRpcResponse {
        JsonRpcResponse::success(id, json!({ "tools": tool_definitions() }))
    }

    async fn handle_tool_call(&self, id: Option<Value>, params: Option<Value>) -> JsonRpcResponse {
        let params: ToolCallParams = match params {
            Some(p) => match serde_json::from_value(p) {
                Ok(p) => p,
                Err(e) => {
                    let err = RpcError::InvalidParameters {
                        tool_name: "tools/call".to_string(),
                        message: e.to_string(),
                    };
                    return JsonRpcResponse::rejected(id, &err);
                }
            },
            None => {
                let err = RpcError::InvalidRequest {
                    message: "tools/call requires params".to_string(),
                };
                return JsonRpcResponse::rejected(id, &err);
            }
        };

        let (text, is_error) =
            match handle_tool_call(&self.state, &params.name, params.arguments).await {
                Ok(result) => (
                    serde_json::to_string_pretty(&result).unwrap_or_else(|e| {
                        error!(error = %e, "Failed to serialize tool result");
                        format!("{{\"error\": \"Serialization failed: {}\"}}", e)
                    }),
                    None,
                ),
                Err(e) => (format!("Error: {}", e), Some(true)),
            };

        let tool_result = ToolCallResult {
            content: vec![ToolResultContent {
                content_type: "text".to_string(),
                text,
            }],
            is_error,
        };

        match serde_json::to_value(tool_result) {
            Ok(val) => JsonRpcResponse::success(id, val),
            Err(e) => {
                error!(error = %e, "Failed to serialize tool call result");
                JsonRpcResponse::error(id, INTERNAL_ERROR, format!("Internal error: {}", e))
            }
        }
    }
}

// ============================================================================
// Tool Definitions
// ============================================================================

fn evidence_schema() -> Value {
    json!({
        "type": "array",
        "description": "Evidence items",
        "items": {
            "type": "object",
            "properties": {
                "id": { "type": "string" },
                "type": { "type": "string" },
                "description": { "type": "string" },
                "confidence": { "type": "number", "minimum": 0, "maximum": 1 },
                "metadata": { "type": "object" }
            }
        }
    })
}

fn case_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "id": { "type": "string" },
            "type": { "type": "string" },
            "description": { "type": "string" },
            "timeline": {
                "type": "array",
                "items": { "type": "object", "properties": { "description": { "type": "string" } } }
            },
            "evidence": evidence_schema()
        }
    })
}

/// Every tool exposed through `tools/list`.
pub fn tool_definitions() -> Vec<Tool> {
    vec![
        Tool {
            name: "reason".to_string(),
            description: "Hierarchical reasoning over a case: plan, execute each step, then synthesize a conclusion with a traceable reasoning chain.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "context": { "type": "string", "description": "Case context" },
                    "question": { "type": "string", "description": "Question to answer" },
                    "evidence": evidence_schema(),
                    "reasoning_type": {
                        "type": "string",
                        "enum": ["deductive", "inductive", "abductive", "analogical"]
                    },
                    "max_depth": { "type": "integer", "minimum": 1, "maximum": 10 }
                },
                "required": ["context", "question"]
            }),
        },
        Tool {
            name: "verify_hypothesis".to_string(),
            description: "Score a hypothesis against the available evidence.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "hypothesis": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "string" },
                            "statement": { "type": "string" },
                            "supporting_evidence": { "type": "array", "items": { "type": "string" } },
                            "contradicting_evidence": { "type": "array", "items": { "type": "string" } },
                            "confidence": { "type": "number" }
                        },
                        "required": ["id", "statement"]
                    },
                    "evidence": evidence_schema(),
                    "case_context": { "type": "string" },
                    "strict_mode": { "type": "boolean" }
                },
                "required": ["hypothesis"]
            }),
        },
        Tool {
            name: "find_contradictions".to_string(),
            description: "Detect contradictions between statements and against evidence.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "statements": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "properties": {
                                "id": { "type": "string" },
                                "content": { "type": "string" }
                            },
                            "required": ["content"]
                        }
                    },
                    "evidence": evidence_schema(),
                    "case_context": { "type": "string" }
                },
                "required": ["statements"]
            }),
        },
        Tool {
            name: "cross_case_reasoning".to_string(),
            description: "Find shared patterns and connections between a case and comparison cases.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "primary_case": case_schema(),
                    "comparison_cases": { "type": "array", "items": case_schema() },
                    "focus_areas": { "type": "array", "items": { "type": "string" } }
                },
                "required": ["primary_case", "comparison_cases"]
            }),
        },
        Tool {
            name: "health".to_string(),
            description: "Engine readiness and completion service availability.".to_string(),
            input_schema: json!({ "type": "object", "properties": {} }),
        },
        Tool {
            name: "info".to_string(),
            description: "Capabilities and supported reasoning types.".to_string(),
            input_schema: json!({ "type": "object", "properties": {} }),
        },
    ]
}
