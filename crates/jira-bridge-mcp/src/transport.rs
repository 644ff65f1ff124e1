//! Transport layer for MCP JSON-RPC communication.
//!
//! MCP uses newline-delimited JSON over stdin/stdout. Reading and writing are
//! split so the server can read the next request while earlier tool calls
//! are still running.

use std::io;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, Lines};

use crate::protocol::{JsonRpcNotification, JsonRpcRequest, JsonRpcResponse};

/// Message that can be received from the client.
#[derive(Debug)]
pub enum IncomingMessage {
    Request(JsonRpcRequest),
    Notification(JsonRpcNotification),
    /// A line that is neither a request nor a notification
    Malformed(String),
}

/// Reads JSON-RPC messages, one per line.
pub struct MessageReader<R> {
    lines: Lines<R>,
}

impl<R: AsyncBufRead + Unpin> MessageReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
        }
    }

    /// Read the next message. Blank lines are skipped; `Ok(None)` means EOF.
    pub async fn read_message(&mut self) -> io::Result<Option<IncomingMessage>> {
        while let Some(line) = self.lines.next_line().await? {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            tracing::debug!("Received: {}", line);
            return Ok(Some(parse_message(line)));
        }
        Ok(None)
    }
}

fn parse_message(line: &str) -> IncomingMessage {
    // Requests carry an id; try them first
    if let Ok(request) = serde_json::from_str::<JsonRpcRequest>(line) {
        return IncomingMessage::Request(request);
    }

    if let Ok(notification) = serde_json::from_str::<JsonRpcNotification>(line) {
        return IncomingMessage::Notification(notification);
    }

    tracing::warn!("Failed to parse message: {}", line);
    match serde_json::from_str::<serde_json::Value>(line) {
        Ok(_) => IncomingMessage::Malformed("not a JSON-RPC message".to_string()),
        Err(e) => IncomingMessage::Malformed(e.to_string()),
    }
}

/// Writes JSON-RPC responses, one per line, flushing after each.
pub struct MessageWriter<W> {
    writer: W,
}

impl<W: AsyncWrite + Unpin> MessageWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub async fn write_response(&mut self, response: &JsonRpcResponse) -> io::Result<()> {
        let mut json = serde_json::to_string(response).map_err(|e| {
            io::Error::new(io::ErrorKind::InvalidData, format!("Serialization error: {}", e))
        })?;

        tracing::debug!("Sending: {}", json);

        json.push('\n');
        self.writer.write_all(json.as_bytes()).await?;
        self.writer.flush().await
    }

    /// Give back the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}
