//! Agent tool server: newline-delimited JSON-RPC over stdio.
//!
//! Every tool goes straight to the [`RecipeService`], the same layer the
//! HTTP API uses.

pub mod protocol;
pub mod tools;

use std::sync::Arc;

use anyhow::Result;
use larder_github::GitDataApi;
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, info, warn};

use crate::services::RecipeService;
use protocol::{
    INVALID_PARAMS, INVALID_REQUEST, JSONRPC_VERSION, JsonRpcRequest, JsonRpcResponse,
    METHOD_NOT_FOUND, PARSE_ERROR,
};

/// Protocol revision announced by `initialize`.
pub const PROTOCOL_VERSION: &str = "2024-11-05";

#[derive(Debug, Deserialize)]
struct CallParams {
    name: String,
    #[serde(default)]
    arguments: Option<Value>,
}

/// Tool server over a recipe service.
pub struct McpServer<A> {
    service: Arc<RecipeService<A>>,
}

impl<A: GitDataApi> McpServer<A> {
    pub const fn new(service: Arc<RecipeService<A>>) -> Self {
        Self { service }
    }

    /// Serve stdin/stdout until stdin closes.
    ///
    /// # Errors
    /// Returns error if stdio fails.
    pub async fn serve_stdio(&self) -> Result<()> {
        info!("tool server listening on stdio");
        self.serve(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
            .await
    }

    /// Answer one JSON message per line of `reader` on `writer`.
    ///
    /// # Errors
    /// Returns error if reading or writing fails.
    pub async fn serve<R, W>(&self, reader: R, mut writer: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = reader.lines();
        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            if let Some(response) = self.handle_line(&line).await {
                let mut out = serde_json::to_string(&response)?;
                out.push('\n');
                writer.write_all(out.as_bytes()).await?;
                writer.flush().await?;
            }
        }
        debug!("stdin closed");
        Ok(())
    }

    /// Handle one raw message. Returns `None` for notifications.
    pub async fn handle_line(&self, line: &str) -> Option<JsonRpcResponse> {
        let value: Value = match serde_json::from_str(line) {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, "unparseable message");
                return Some(JsonRpcResponse::error(
                    Value::Null,
                    PARSE_ERROR,
                    format!("Parse error: {e}"),
                ));
            }
        };

        let id = value.get("id").cloned().unwrap_or(Value::Null);
        match serde_json::from_value::<JsonRpcRequest>(value) {
            Ok(request) if request.jsonrpc == JSONRPC_VERSION => self.handle(request).await,
            Ok(request) if request.is_notification() => None,
            Ok(request) => Some(JsonRpcResponse::error(
                id,
                INVALID_REQUEST,
                format!("Unsupported jsonrpc version '{}'", request.jsonrpc),
            )),
            Err(e) => Some(JsonRpcResponse::error(
                id,
                INVALID_REQUEST,
                format!("Invalid request: {e}"),
            )),
        }
    }

    /// Dispatch a parsed request. Returns `None` for notifications.
    pub async fn handle(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        let Some(id) = request.id else {
            debug!(method = %request.method, "notification");
            return None;
        };

        let response = match request.method.as_str() {
            "initialize" => JsonRpcResponse::success(
                id,
                json!({
                    "protocolVersion": PROTOCOL_VERSION,
                    "capabilities": { "tools": {} },
                    "serverInfo": {
                        "name": "larder",
                        "version": env!("CARGO_PKG_VERSION"),
                    },
                }),
            ),
            "ping" => JsonRpcResponse::success(id, json!({})),
            "tools/list" => JsonRpcResponse::success(id, json!({ "tools": tools::definitions() })),
            "tools/call" => self.call_tool(id, request.params).await,
            other => {
                JsonRpcResponse::error(id, METHOD_NOT_FOUND, format!("Method not found: {other}"))
            }
        };
        Some(response)
    }

    async fn call_tool(&self, id: Value, params: Option<Value>) -> JsonRpcResponse {
        let params: CallParams = match params.map(serde_json::from_value) {
            Some(Ok(params)) => params,
            Some(Err(e)) => {
                return JsonRpcResponse::error(id, INVALID_PARAMS, format!("Invalid params: {e}"));
            }
            None => return JsonRpcResponse::error(id, INVALID_PARAMS, "Missing params"),
        };

        let arguments = params.arguments.unwrap_or_else(|| json!({}));
        match tools::call(&self.service, &params.name, arguments).await {
            Ok(result) => match serde_json::to_value(result) {
                Ok(value) => JsonRpcResponse::success(id, value),
                Err(e) => JsonRpcResponse::error(id, INVALID_PARAMS, e.to_string()),
            },
            Err(e) => JsonRpcResponse::error(id, INVALID_PARAMS, e.to_string()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use larder_github::memory::MemoryRemote;

    use super::*;
    use crate::services::test_support::Fixture;

    fn server(fx: &Fixture) -> McpServer<MemoryRemote> {
        McpServer::new(Arc::new(fx.service()))
    }

    async fn request(server: &McpServer<MemoryRemote>, line: &str) -> JsonRpcResponse {
        server.handle_line(line).await.unwrap()
    }

    #[tokio::test]
    async fn test_initialize() {
        let fx = Fixture::new();
        let resp = request(
            &server(&fx),
            r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#,
        )
        .await;

        let result = resp.result.unwrap();
        assert_eq!(result["protocolVersion"], PROTOCOL_VERSION);
        assert_eq!(result["serverInfo"]["name"], "larder");
        assert_eq!(resp.id, json!(1));
    }

    #[tokio::test]
    async fn test_ping_and_tools_list() {
        let fx = Fixture::new();
        let server = server(&fx);

        let ping = request(&server, r#"{"jsonrpc":"2.0","id":"a","method":"ping"}"#).await;
        assert_eq!(ping.result, Some(json!({})));

        let list = request(&server, r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#).await;
        assert_eq!(list.result.unwrap()["tools"].as_array().unwrap().len(), 8);
    }

    #[tokio::test]
    async fn test_notification_gets_no_response() {
        let fx = Fixture::new();
        let resp = server(&fx)
            .handle_line(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
            .await;
        assert!(resp.is_none());
    }

    #[tokio::test]
    async fn test_protocol_errors() {
        let fx = Fixture::new();
        let server = server(&fx);

        let parse = request(&server, "{not json").await;
        assert_eq!(parse.error.unwrap().code, PARSE_ERROR);
        assert_eq!(parse.id, Value::Null);

        let invalid = request(&server, r#"{"jsonrpc":"2.0","id":3}"#).await;
        assert_eq!(invalid.error.unwrap().code, INVALID_REQUEST);
        assert_eq!(invalid.id, json!(3));

        let unknown = request(&server, r#"{"jsonrpc":"2.0","id":4,"method":"bake"}"#).await;
        assert_eq!(unknown.error.unwrap().code, METHOD_NOT_FOUND);

        let no_params = request(&server, r#"{"jsonrpc":"2.0","id":5,"method":"tools/call"}"#).await;
        assert_eq!(no_params.error.unwrap().code, INVALID_PARAMS);

        let bad_args = request(
            &server,
            r#"{"jsonrpc":"2.0","id":6,"method":"tools/call","params":{"name":"get_recipe","arguments":{}}}"#,
        )
        .await;
        assert_eq!(bad_args.error.unwrap().code, INVALID_PARAMS);
    }

    #[tokio::test]
    async fn test_tools_call_wraps_result() {
        let fx = Fixture::new();
        let resp = request(
            &server(&fx),
            r#"{"jsonrpc":"2.0","id":7,"method":"tools/call","params":{"name":"list_tags"}}"#,
        )
        .await;

        let result = resp.result.unwrap();
        assert_eq!(result["content"][0]["type"], "text");
        assert!(result.get("isError").is_none());
        let tags: Value = serde_json::from_str(result["content"][0]["text"].as_str().unwrap()).unwrap();
        assert_eq!(tags["total"], 3);
    }

    #[tokio::test]
    async fn test_serve_writes_one_line_per_response() {
        let fx = Fixture::new();
        let input = concat!(
            r#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#,
            "\n\n",
            r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
            "\n",
            r#"{"jsonrpc":"2.0","id":2,"method":"tools/call","params":{"name":"bake"}}"#,
            "\n",
        );
        let mut output = Vec::new();

        server(&fx)
            .serve(BufReader::new(input.as_bytes()), &mut output)
            .await
            .unwrap();

        let lines: Vec<Value> = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["id"], 1);
        assert_eq!(lines[1]["result"]["isError"], true);
    }
}
