//! MCP server implementation.
//!
//! The server handles the MCP protocol lifecycle:
//! 1. Initialize - exchange capabilities
//! 2. Handle tool calls - each `tools/call` runs on its own task
//! 3. Shutdown - on EOF, wait for in-flight calls and flush their responses

use std::sync::Arc;

use jira_bridge_core::IssueTracker;
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncWrite, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinSet;

use crate::handlers::ToolHandler;
use crate::protocol::{
    InitializeParams, InitializeResult, JsonRpcError, JsonRpcRequest, JsonRpcResponse, RequestId,
    ToolCallParams, ToolsListResult,
};
use crate::transport::{IncomingMessage, MessageReader, MessageWriter};

/// Capacity of the response queue feeding the writer task.
const RESPONSE_QUEUE: usize = 64;

/// MCP server exposing Jira tools.
pub struct McpServer {
    handler: Arc<ToolHandler>,
    initialized: bool,
}

impl McpServer {
    pub fn new(tracker: Arc<dyn IssueTracker>) -> Self {
        Self {
            handler: Arc::new(ToolHandler::new(tracker)),
            initialized: false,
        }
    }

    /// Run the server over stdin/stdout until stdin closes.
    pub async fn run(&mut self) -> jira_bridge_core::Result<()> {
        self.serve(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
            .await
    }

    /// Serve newline-delimited JSON-RPC from `reader`, writing responses to
    /// `writer` in completion order.
    pub async fn serve<R, W>(&mut self, reader: R, writer: W) -> jira_bridge_core::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        tracing::info!("Starting MCP server");

        let (tx, mut rx) = mpsc::channel::<JsonRpcResponse>(RESPONSE_QUEUE);
        let writer_task = tokio::spawn(async move {
            let mut writer = MessageWriter::new(writer);
            while let Some(response) = rx.recv().await {
                writer.write_response(&response).await?;
            }
            Ok::<_, std::io::Error>(())
        });

        let mut reader = MessageReader::new(reader);
        let mut in_flight = JoinSet::new();

        loop {
            let msg = match reader.read_message().await {
                Ok(Some(msg)) => msg,
                Ok(None) => {
                    tracing::info!("EOF received, shutting down");
                    break;
                }
                Err(e) => {
                    tracing::error!("Transport error: {}", e);
                    break;
                }
            };

            let response = match msg {
                IncomingMessage::Request(req) if req.method == "tools/call" => {
                    let handler = self.handler.clone();
                    let tx = tx.clone();
                    in_flight.spawn(async move {
                        let response = handle_tools_call(req.id, req.params, &handler).await;
                        if tx.send(response).await.is_err() {
                            tracing::warn!("Response dropped: writer closed");
                        }
                    });
                    None
                }
                IncomingMessage::Request(req) => Some(self.handle_request(req)),
                IncomingMessage::Notification(notif) => {
                    self.handle_notification(&notif.method);
                    None
                }
                IncomingMessage::Malformed(reason) => Some(JsonRpcResponse::error(
                    RequestId::Null,
                    JsonRpcError::parse_error(&reason),
                )),
            };

            if let Some(response) = response {
                if tx.send(response).await.is_err() {
                    tracing::error!("Writer closed, stopping");
                    break;
                }
            }

            // Reap finished calls so the set does not grow unbounded
            while let Some(joined) = in_flight.try_join_next() {
                if let Err(e) = joined {
                    tracing::error!("Tool call task failed: {}", e);
                }
            }
        }

        while let Some(joined) = in_flight.join_next().await {
            if let Err(e) = joined {
                tracing::error!("Tool call task failed: {}", e);
            }
        }
        drop(tx);

        match writer_task.await {
            Ok(result) => result?,
            Err(e) => tracing::error!("Writer task failed: {}", e),
        }

        tracing::info!("MCP server stopped");
        Ok(())
    }

    /// Handle a JSON-RPC request other than `tools/call`.
    fn handle_request(&mut self, req: JsonRpcRequest) -> JsonRpcResponse {
        tracing::debug!("Handling request: {} (id: {:?})", req.method, req.id);

        match req.method.as_str() {
            "initialize" => self.handle_initialize(req.id, req.params),
            "tools/list" => self.handle_tools_list(req.id),
            "ping" => JsonRpcResponse::success(req.id, serde_json::json!({})),
            method => {
                tracing::warn!("Unknown method: {}", method);
                JsonRpcResponse::error(req.id, JsonRpcError::method_not_found(method))
            }
        }
    }

    /// Handle notifications (no response).
    fn handle_notification(&mut self, method: &str) {
        match method {
            "initialized" | "notifications/initialized" => {
                tracing::info!("Client initialized");
            }
            "notifications/cancelled" => {
                tracing::debug!("Request cancelled by client");
            }
            _ => {
                tracing::debug!("Ignoring notification: {}", method);
            }
        }
    }

    fn handle_initialize(&mut self, id: RequestId, params: Option<Value>) -> JsonRpcResponse {
        if self.initialized {
            return JsonRpcResponse::error(
                id,
                JsonRpcError::invalid_request("Server already initialized"),
            );
        }

        if let Some(params) = params {
            match serde_json::from_value::<InitializeParams>(params) {
                Ok(InitializeParams {
                    protocol_version,
                    client_info: Some(client),
                    ..
                }) => {
                    tracing::info!(
                        "Client: {} v{} (protocol: {})",
                        client.name,
                        client.version,
                        protocol_version.as_deref().unwrap_or("unspecified")
                    );
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!("Failed to parse initialize params: {}", e);
                }
            }
        }

        self.initialized = true;
        JsonRpcResponse::from_serializable(id, &InitializeResult::default())
    }

    fn handle_tools_list(&self, id: RequestId) -> JsonRpcResponse {
        let result = ToolsListResult {
            tools: self.handler.available_tools(),
        };
        JsonRpcResponse::from_serializable(id, &result)
    }
}

/// Handle a tools/call request.
async fn handle_tools_call(
    id: RequestId,
    params: Option<Value>,
    handler: &ToolHandler,
) -> JsonRpcResponse {
    let params: ToolCallParams = match params {
        Some(p) => match serde_json::from_value(p) {
            Ok(params) => params,
            Err(e) => {
                return JsonRpcResponse::error(id, JsonRpcError::invalid_params(&e.to_string()));
            }
        },
        None => {
            return JsonRpcResponse::error(id, JsonRpcError::invalid_params("Missing params"));
        }
    };

    tracing::info!("Calling tool: {}", params.name);

    let result = handler.execute(&params.name, params.arguments).await;
    JsonRpcResponse::from_serializable(id, &result)
}
