use futures_util::future::BoxFuture;
use schemars::schema_for;
use sdkdocs_core::{DocError, ErrorKind};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

// JSON-RPC constants
pub const JSONRPC_VERSION: &str = "2.0";
pub const PROTOCOL_VERSION: &str = "2024-11-05";
pub const PARSE_ERROR: i32 = -32700;
pub const INVALID_REQUEST: i32 = -32600;
pub const METHOD_NOT_FOUND: i32 = -32601;
pub const INTERNAL_ERROR: i32 = -32603;
pub const RESOURCE_NOT_FOUND: i32 = -32002;

// JSON-RPC 2.0 Types
#[derive(Debug, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub id: Option<Value>,
    pub method: String,
    pub params: Option<Value>,
}

impl JsonRpcRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.jsonrpc != JSONRPC_VERSION {
            return Err("Invalid JSON-RPC version, expected 2.0");
        }
        Ok(())
    }

    /// Messages without an id are notifications and never get a response.
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

#[derive(Debug, Serialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: &'static str,
    pub id: Value,
    pub result: Value,
}

impl JsonRpcResponse {
    pub fn new(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            result,
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            JsonRpcError::new(self.id.clone(), INTERNAL_ERROR, e.to_string()).to_json()
        })
    }
}

#[derive(Debug, Serialize)]
pub struct JsonRpcError {
    pub jsonrpc: &'static str,
    pub id: Value,
    pub error: ErrorObject,
}

impl JsonRpcError {
    pub fn new(id: Value, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            error: ErrorObject {
                code,
                message: message.into(),
            },
        }
    }

    pub fn parse_error() -> Self {
        Self::new(Value::Null, PARSE_ERROR, "Parse error")
    }

    pub fn method_not_found(id: Value, method: &str) -> Self {
        Self::new(id, METHOD_NOT_FOUND, format!("Method not found: {method}"))
    }

    pub fn invalid_request(id: Value, message: impl Into<String>) -> Self {
        Self::new(id, INVALID_REQUEST, message)
    }

    pub fn from_mcp(id: Value, err: McpError) -> Self {
        Self::new(id, err.code, err.message)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(
                r#"{{"jsonrpc":"2.0","id":null,"error":{{"code":{INTERNAL_ERROR},"message":"Failed to serialize error"}}}}"#
            )
        })
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorObject {
    pub code: i32,
    pub message: String,
}

/// Structured failure returned by tool and resource handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct McpError {
    pub code: i32,
    pub message: String,
}

impl McpError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(INVALID_REQUEST, message)
    }

    pub fn method_not_found(message: impl Into<String>) -> Self {
        Self::new(METHOD_NOT_FOUND, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(INTERNAL_ERROR, message)
    }
}

impl fmt::Display for McpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.code)
    }
}

impl From<DocError> for McpError {
    fn from(err: DocError) -> Self {
        let code = match err.kind() {
            ErrorKind::InvalidRequest => INVALID_REQUEST,
            ErrorKind::NotFound => RESOURCE_NOT_FOUND,
            ErrorKind::Internal => INTERNAL_ERROR,
        };
        Self::new(code, err.to_string())
    }
}

// MCP Protocol Types
#[derive(Debug, Clone, Serialize)]
pub struct ServerInfo {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Serialize)]
pub struct ServerCapabilities {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resources: Option<ResourceCapabilities>,
    pub tools: ToolCapabilities,
}

#[derive(Debug, Serialize)]
pub struct ResourceCapabilities {}

#[derive(Debug, Serialize)]
pub struct ToolCapabilities {}

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct Resource {
    pub uri: String,
    pub name: String,
    pub description: String,
    #[serde(rename = "mimeType")]
    pub mime_type: String,
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct ResourceContent {
    pub uri: String,
    #[serde(rename = "mimeType")]
    pub mime_type: String,
    pub text: String,
}

#[derive(Debug, Serialize, Clone)]
pub struct Tool {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

#[derive(Debug, Serialize)]
pub struct ToolResult {
    pub content: Vec<ContentBlock>,
    #[serde(rename = "isError")]
    pub is_error: bool,
}

impl ToolResult {
    pub fn success(text: String) -> Self {
        Self {
            content: vec![ContentBlock::text(text)],
            is_error: false,
        }
    }

    /// Pretty-printed JSON payload as a single text block.
    pub fn json<T: Serialize>(value: &T) -> Result<Self, McpError> {
        serde_json::to_string_pretty(value)
            .map(Self::success)
            .map_err(|e| McpError::internal(format!("Failed to serialize response: {e}")))
    }
}

#[derive(Debug, Serialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub content_type: String,
    pub text: String,
}

impl ContentBlock {
    pub fn text(text: String) -> Self {
        Self {
            content_type: "text".to_string(),
            text,
        }
    }
}

pub type ToolHandler<C> =
    Arc<dyn Fn(Arc<C>, Value) -> BoxFuture<'static, Result<ToolResult, McpError>> + Send + Sync>;
pub type ResourceLister<C> = Arc<dyn Fn(Arc<C>) -> BoxFuture<'static, Vec<Resource>> + Send + Sync>;
pub type ResourceReader<C> = Arc<
    dyn Fn(Arc<C>, String) -> BoxFuture<'static, Result<ResourceContent, McpError>> + Send + Sync,
>;

pub struct ToolDef<C> {
    pub description: String,
    pub input_schema: Value,
    pub handler: ToolHandler<C>,
}

pub struct ResourceProvider<C> {
    pub list: ResourceLister<C>,
    pub read: ResourceReader<C>,
}

/// Minimal MCP server: a shared context plus registered tools and an
/// optional dynamic resource surface.
pub struct McpServer<C> {
    pub ctx: Arc<C>,
    pub info: ServerInfo,
    pub tools: BTreeMap<String, ToolDef<C>>,
    pub resources: Option<ResourceProvider<C>>,
}

impl<C> fmt::Debug for McpServer<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("McpServer")
            .field("info", &self.info)
            .field("tools", &self.tools.keys().collect::<Vec<_>>())
            .field("resources", &self.resources.is_some())
            .finish_non_exhaustive()
    }
}

impl<C: Send + Sync + 'static> McpServer<C> {
    pub fn new(ctx: C, name: &str, version: &str) -> Self {
        Self {
            ctx: Arc::new(ctx),
            info: ServerInfo {
                name: name.to_string(),
                version: version.to_string(),
            },
            tools: BTreeMap::new(),
            resources: None,
        }
    }

    pub fn tool<A, F, Fut>(mut self, name: &str, description: &str, handler: F) -> Self
    where
        A: DeserializeOwned + schemars::JsonSchema + Send + 'static,
        F: Fn(Arc<C>, A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<ToolResult, McpError>> + Send + 'static,
    {
        let schema = schema_for!(A);
        let input_schema =
            serde_json::to_value(&schema).unwrap_or_else(|_| json!({ "type": "object" }));
        let handler = Arc::new(handler);
        let handler = Arc::new(
            move |ctx: Arc<C>, arguments: Value| -> BoxFuture<'static, Result<ToolResult, McpError>> {
                let handler = Arc::clone(&handler);
                Box::pin(async move {
                    // Tools whose arguments are all optional may be called without any.
                    let arguments = if arguments.is_null() { json!({}) } else { arguments };
                    let args: A = serde_json::from_value(arguments)
                        .map_err(|err| McpError::invalid_request(format!("Invalid tool arguments: {err}")))?;
                    handler(ctx, args).await
                })
            },
        );

        self.tools.insert(
            name.to_string(),
            ToolDef {
                description: description.to_string(),
                input_schema,
                handler,
            },
        );
        self
    }

    /// Register the resource surface: `list` enumerates what is currently
    /// available, `read` resolves a URI.
    pub fn resources<L, LFut, R, RFut>(mut self, list: L, read: R) -> Self
    where
        L: Fn(Arc<C>) -> LFut + Send + Sync + 'static,
        LFut: Future<Output = Vec<Resource>> + Send + 'static,
        R: Fn(Arc<C>, String) -> RFut + Send + Sync + 'static,
        RFut: Future<Output = Result<ResourceContent, McpError>> + Send + 'static,
    {
        let list = Arc::new(list);
        let read = Arc::new(read);
        self.resources = Some(ResourceProvider {
            list: Arc::new(move |ctx: Arc<C>| -> BoxFuture<'static, Vec<Resource>> {
                let list = Arc::clone(&list);
                Box::pin(async move { list(ctx).await })
            }),
            read: Arc::new(
                move |ctx: Arc<C>, uri: String| -> BoxFuture<'static, Result<ResourceContent, McpError>> {
                    let read = Arc::clone(&read);
                    Box::pin(async move { read(ctx, uri).await })
                },
            ),
        });
        self
    }

    pub fn list_tools(&self) -> Vec<Tool> {
        self.tools
            .iter()
            .map(|(name, def)| Tool {
                name: name.clone(),
                description: def.description.clone(),
                input_schema: def.input_schema.clone(),
            })
            .collect()
    }

    pub async fn list_resources(&self) -> Vec<Resource> {
        match &self.resources {
            Some(provider) => (provider.list)(Arc::clone(&self.ctx)).await,
            None => Vec::new(),
        }
    }

    pub async fn call_tool(&self, name: &str, arguments: Value) -> Result<ToolResult, McpError> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| McpError::method_not_found(format!("Unknown tool: {name}")))?;
        (tool.handler)(Arc::clone(&self.ctx), arguments).await
    }

    pub async fn read_resource(&self, uri: &str) -> Result<ResourceContent, McpError> {
        let provider = self
            .resources
            .as_ref()
            .ok_or_else(|| McpError::new(RESOURCE_NOT_FOUND, format!("Resource not found: {uri}")))?;
        (provider.read)(Arc::clone(&self.ctx), uri.to_string()).await
    }

    pub fn initialize_result(&self, protocol_version: &str) -> Value {
        json!({
            "protocolVersion": protocol_version,
            "capabilities": ServerCapabilities {
                resources: self.resources.as_ref().map(|_| ResourceCapabilities {}),
                tools: ToolCapabilities {},
            },
            "serverInfo": self.info,
        })
    }

    pub async fn run_stdio(&self) -> Result<(), String> {
        self.serve(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
            .await
    }

    /// Serve newline-delimited JSON-RPC messages until `reader` reaches EOF.
    pub async fn serve<R, W>(&self, mut reader: R, mut writer: W) -> Result<(), String>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut line = String::new();

        loop {
            line.clear();
            let read = reader
                .read_line(&mut line)
                .await
                .map_err(|e| format!("Error reading from stdin: {e}"))?;
            if read == 0 {
                tracing::debug!("Input closed, stopping MCP server");
                break;
            }

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            if let Some(response) = self.handle_message(trimmed).await {
                Self::write_response(&mut writer, &response).await?;
            }
        }

        Ok(())
    }

    async fn write_response<W: AsyncWrite + Unpin>(
        writer: &mut W,
        response: &str,
    ) -> Result<(), String> {
        writer
            .write_all(response.as_bytes())
            .await
            .map_err(|e| format!("Failed to write response: {e}"))?;
        writer
            .write_all(b"\n")
            .await
            .map_err(|e| format!("Failed to write newline: {e}"))?;
        writer
            .flush()
            .await
            .map_err(|e| format!("Failed to flush stdout: {e}"))?;
        Ok(())
    }

    /// Handle one raw message. Returns `None` for notifications.
    pub async fn handle_message(&self, msg: &str) -> Option<String> {
        let Ok(request) = serde_json::from_str::<JsonRpcRequest>(msg) else {
            return Some(JsonRpcError::parse_error().to_json());
        };

        if request.validate().is_err() {
            return Some(JsonRpcError::parse_error().to_json());
        }

        if request.is_notification() {
            tracing::debug!("Received notification {}", request.method);
            return None;
        }

        let id = request.id.unwrap_or(Value::Null);
        let params = request.params.unwrap_or(Value::Null);
        tracing::debug!("Handling {}", request.method);

        let response = match request.method.as_str() {
            "initialize" => {
                JsonRpcResponse::new(id, self.initialize_result(PROTOCOL_VERSION)).to_json()
            }
            "ping" => JsonRpcResponse::new(id, json!({})).to_json(),
            "resources/list" => {
                JsonRpcResponse::new(id, json!({ "resources": self.list_resources().await }))
                    .to_json()
            }
            "resources/read" => self.handle_resources_read(id, params).await,
            "tools/list" => {
                JsonRpcResponse::new(id, json!({ "tools": self.list_tools() })).to_json()
            }
            "tools/call" => self.handle_tools_call(id, params).await,
            method => JsonRpcError::method_not_found(id, method).to_json(),
        };

        Some(response)
    }

    async fn handle_resources_read(&self, id: Value, params: Value) -> String {
        let Some(uri) = params.get("uri").and_then(|v| v.as_str()) else {
            return JsonRpcError::invalid_request(id, "Missing 'uri' parameter").to_json();
        };

        match self.read_resource(uri).await {
            Ok(content) => JsonRpcResponse::new(id, json!({ "contents": vec![content] })).to_json(),
            Err(err) => {
                tracing::debug!("resources/read {} failed: {}", uri, err);
                JsonRpcError::from_mcp(id, err).to_json()
            }
        }
    }

    async fn handle_tools_call(&self, id: Value, params: Value) -> String {
        let Some(tool_name) = params.get("name").and_then(|v| v.as_str()) else {
            return JsonRpcError::invalid_request(id, "Missing 'name' parameter").to_json();
        };

        let arguments = params.get("arguments").cloned().unwrap_or(Value::Null);

        match self.call_tool(tool_name, arguments).await {
            Ok(result) => match serde_json::to_value(result) {
                Ok(result) => JsonRpcResponse::new(id, result).to_json(),
                Err(err) => JsonRpcError::new(id, INTERNAL_ERROR, err.to_string()).to_json(),
            },
            Err(err) => {
                tracing::debug!("tools/call {} failed: {}", tool_name, err);
                JsonRpcError::from_mcp(id, err).to_json()
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[derive(Deserialize, schemars::JsonSchema)]
    struct EchoArgs {
        text: String,
    }

    fn echo_server() -> McpServer<()> {
        McpServer::new((), "test", "0.0.0").tool(
            "echo",
            "Echo text back",
            |_ctx: Arc<()>, args: EchoArgs| async move {
                Ok::<_, McpError>(ToolResult::success(args.text))
            },
        )
    }

    async fn call(server: &McpServer<()>, msg: Value) -> Value {
        let response = server.handle_message(&msg.to_string()).await.expect("response");
        serde_json::from_str(&response).unwrap()
    }

    #[tokio::test]
    async fn garbage_is_a_parse_error() {
        let server = echo_server();
        let response = server.handle_message("{not json").await.unwrap();
        let response: Value = serde_json::from_str(&response).unwrap();
        assert_eq!(response["error"]["code"], PARSE_ERROR);
    }

    #[tokio::test]
    async fn wrong_version_is_a_parse_error() {
        let server = echo_server();
        let response = call(&server, json!({"jsonrpc": "1.0", "id": 1, "method": "ping"})).await;
        assert_eq!(response["error"]["code"], PARSE_ERROR);
    }

    #[tokio::test]
    async fn notifications_get_no_response() {
        let server = echo_server();
        let msg = json!({"jsonrpc": "2.0", "method": "notifications/initialized"});
        assert!(server.handle_message(&msg.to_string()).await.is_none());
    }

    #[tokio::test]
    async fn requests_without_id_get_no_response() {
        let server = echo_server();
        let msg = json!({"jsonrpc": "2.0", "method": "ping"});
        assert!(server.handle_message(&msg.to_string()).await.is_none());

        let msg = json!({"jsonrpc": "2.0", "method": "tools/call",
                         "params": {"name": "echo", "arguments": {"text": "hi"}}});
        assert!(server.handle_message(&msg.to_string()).await.is_none());
    }

    #[tokio::test]
    async fn missing_tool_arguments_are_invalid_requests() {
        let server = echo_server();
        let response = call(
            &server,
            json!({"jsonrpc": "2.0", "id": 9, "method": "tools/call",
                   "params": {"name": "echo", "arguments": {}}}),
        )
        .await;
        assert_eq!(response["error"]["code"], INVALID_REQUEST);
        let message = response["error"]["message"].as_str().unwrap();
        assert!(message.contains("missing field `text`"), "{message}");

        let response = call(
            &server,
            json!({"jsonrpc": "2.0", "id": 10, "method": "tools/call", "params": {}}),
        )
        .await;
        assert_eq!(response["error"]["code"], INVALID_REQUEST);
    }

    #[tokio::test]
    async fn initialize_reports_server_info_and_capabilities() {
        let server = echo_server();
        let response = call(&server, json!({"jsonrpc": "2.0", "id": 1, "method": "initialize"})).await;
        assert_eq!(response["result"]["protocolVersion"], PROTOCOL_VERSION);
        assert_eq!(response["result"]["serverInfo"]["name"], "test");
        assert!(response["result"]["capabilities"]["tools"].is_object());
        assert!(response["result"]["capabilities"].get("resources").is_none());
    }

    #[tokio::test]
    async fn tools_list_includes_generated_schema() {
        let server = echo_server();
        let response = call(&server, json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"})).await;
        let tool = &response["result"]["tools"][0];
        assert_eq!(tool["name"], "echo");
        assert_eq!(tool["inputSchema"]["properties"]["text"]["type"], "string");
    }

    #[tokio::test]
    async fn tool_call_round_trips_arguments() {
        let server = echo_server();
        let response = call(
            &server,
            json!({"jsonrpc": "2.0", "id": 3, "method": "tools/call",
                   "params": {"name": "echo", "arguments": {"text": "hi"}}}),
        )
        .await;
        assert_eq!(response["id"], 3);
        assert_eq!(response["result"]["content"][0]["text"], "hi");
        assert_eq!(response["result"]["isError"], false);
    }

    #[tokio::test]
    async fn bad_arguments_are_invalid_requests() {
        let server = echo_server();
        let response = call(
            &server,
            json!({"jsonrpc": "2.0", "id": 4, "method": "tools/call",
                   "params": {"name": "echo", "arguments": {"text": 5}}}),
        )
        .await;
        assert_eq!(response["error"]["code"], INVALID_REQUEST);
    }

    #[tokio::test]
    async fn unknown_tool_and_method() {
        let server = echo_server();
        let response = call(
            &server,
            json!({"jsonrpc": "2.0", "id": 5, "method": "tools/call", "params": {"name": "nope"}}),
        )
        .await;
        assert_eq!(response["error"]["code"], METHOD_NOT_FOUND);

        let response = call(&server, json!({"jsonrpc": "2.0", "id": 6, "method": "prompts/list"})).await;
        assert_eq!(response["error"]["code"], METHOD_NOT_FOUND);
    }

    #[tokio::test]
    async fn resources_without_provider_are_empty() {
        let server = echo_server();
        let response = call(&server, json!({"jsonrpc": "2.0", "id": 7, "method": "resources/list"})).await;
        assert_eq!(response["result"]["resources"], json!([]));

        let response = call(
            &server,
            json!({"jsonrpc": "2.0", "id": 8, "method": "resources/read", "params": {}}),
        )
        .await;
        assert_eq!(response["error"]["code"], INVALID_REQUEST);
    }

    #[test]
    fn doc_errors_map_to_codes() {
        let err: McpError = DocError::InvalidRequest("bad".into()).into();
        assert_eq!(err.code, INVALID_REQUEST);
        let err: McpError = DocError::NotFound { id: "js-files".into() }.into();
        assert_eq!(err.code, RESOURCE_NOT_FOUND);
        let err: McpError = DocError::ReadFailure {
            path: "x".into(),
            source: std::io::Error::other("boom"),
        }
        .into();
        assert_eq!(err.code, INTERNAL_ERROR);
    }
}
