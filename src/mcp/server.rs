//! MCP server implementation
//!
//! Line-oriented JSON-RPC over stdio. Responses go to stdout; everything
//! else (logs) goes to stderr.

use std::io::{BufRead, Write};
use std::sync::Arc;

use serde_json::{json, Value};

use crate::error::Result;
use crate::mcp::tools::ToolHandler;
use crate::mcp::types::*;

const SERVER_NAME: &str = "carelink";
const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// MCP server for the CareLink EMR tools
pub struct McpServer {
    tool_handler: Arc<ToolHandler>,
    initialized: bool,
}

impl McpServer {
    pub fn new(tool_handler: Arc<ToolHandler>) -> Self {
        Self {
            tool_handler,
            initialized: false,
        }
    }

    /// Run the server until stdin reaches EOF
    pub async fn run_stdio(&mut self) -> Result<()> {
        let stdin = std::io::stdin();
        let mut stdout = std::io::stdout();

        for line in stdin.lock().lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            match self.handle_message(&line).await {
                Ok(Some(response)) => {
                    let response_str = serde_json::to_string(&response)?;
                    writeln!(stdout, "{}", response_str)?;
                    stdout.flush()?;
                }
                Ok(None) => {
                    // Notification, no response
                }
                Err(e) => {
                    tracing::error!("error handling message: {}", e);
                }
            }
        }

        Ok(())
    }

    /// Handle one incoming JSON-RPC message
    async fn handle_message(&mut self, message: &str) -> Result<Option<JsonRpcResponse>> {
        let request: JsonRpcRequest = match serde_json::from_str(message) {
            Ok(req) => req,
            Err(e) => {
                return Ok(Some(JsonRpcResponse::error(
                    RequestId::Number(0),
                    JsonRpcError::parse_error(e.to_string()),
                )));
            }
        };

        match request.method.as_str() {
            methods::INITIALIZE => {
                let result = self.initialize_result()?;
                Ok(Some(JsonRpcResponse::success(request.id, result)))
            }
            methods::INITIALIZED => {
                self.initialized = true;
                Ok(None)
            }
            methods::PING => Ok(Some(JsonRpcResponse::success(request.id, json!({})))),
            methods::LIST_TOOLS => {
                tracing::debug!("listing tools");
                let result = serde_json::to_value(ListToolsResult {
                    tools: self.tool_handler.list_tools(),
                })?;
                Ok(Some(JsonRpcResponse::success(request.id, result)))
            }
            methods::CALL_TOOL => {
                let result = self.handle_call_tool(&request).await;
                Ok(Some(JsonRpcResponse::success(request.id, result)))
            }
            other => Ok(Some(JsonRpcResponse::error(
                request.id,
                JsonRpcError::method_not_found(other),
            ))),
        }
    }

    fn initialize_result(&self) -> Result<Value> {
        let result = InitializeResult {
            protocol_version: MCP_VERSION.to_string(),
            server_info: ServerInfo {
                name: SERVER_NAME.to_string(),
                version: SERVER_VERSION.to_string(),
            },
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {}),
            },
        };

        Ok(serde_json::to_value(result)?)
    }

    /// Dispatch a tool call. Always yields a tool result value, never a
    /// protocol error: tool failures are error-flagged results.
    async fn handle_call_tool(&self, request: &JsonRpcRequest) -> Value {
        let params: CallToolParams = match request.params.as_ref() {
            Some(p) => match serde_json::from_value(p.clone()) {
                Ok(params) => params,
                Err(e) => {
                    return tool_result_value(CallToolResult::error_text(format!(
                        "Invalid tool parameters: {}",
                        e
                    )));
                }
            },
            None => {
                return tool_result_value(CallToolResult::error_text("Missing tool parameters"));
            }
        };

        let result = self
            .tool_handler
            .call_tool(&params.name, params.arguments)
            .await;
        tool_result_value(result)
    }
}

/// Serialize a tool result, falling back to a generic failure text if the
/// result itself cannot be serialized.
fn tool_result_value(result: CallToolResult) -> Value {
    serde_json::to_value(result).unwrap_or_else(|e| {
        json!({
            "content": [{"type": "text", "text": format!("Tool execution failed: {}", e)}],
            "isError": true,
        })
    })
}
