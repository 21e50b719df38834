use crate::protocol::{McpError, McpServer, Resource, ResourceContent, ToolResult};
use schemars::{JsonSchema, Schema, SchemaGenerator, json_schema};
use sdkdocs_core::{DocCatalog, DocSummary, Sdk, SdkFilter, Topic};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::sync::Arc;

pub const SERVER_NAME: &str = "sdk-docs";
pub const MIME_MARKDOWN: &str = "text/markdown";

/// Shared state handed to every tool and resource handler.
#[derive(Debug)]
pub struct AppContext {
    pub catalog: DocCatalog,
}

pub fn build_server(ctx: AppContext) -> McpServer<AppContext> {
    McpServer::new(ctx, SERVER_NAME, env!("CARGO_PKG_VERSION"))
        .resources(list_resources, read_resource)
        .tool(
            "search_sdk_docs",
            "Search SDK documentation for specific topics, APIs, or code examples. Supports both JavaScript and Dart SDK documentation.",
            search_docs_tool,
        )
        .tool(
            "get_sdk_doc",
            "Retrieve a specific SDK documentation file by topic and SDK type.",
            get_doc_tool,
        )
        .tool(
            "list_sdk_docs",
            "List all available SDK documentation resources",
            list_docs_tool,
        )
}

// --- Resources ---

async fn list_resources(ctx: Arc<AppContext>) -> Vec<Resource> {
    ctx.catalog
        .available_documents()
        .await
        .into_iter()
        .map(|entry| Resource {
            uri: entry.key.uri(),
            name: entry.title.clone(),
            description: format!("{} documentation", entry.title),
            mime_type: MIME_MARKDOWN.to_string(),
        })
        .collect()
}

async fn read_resource(ctx: Arc<AppContext>, uri: String) -> Result<ResourceContent, McpError> {
    let doc = ctx.catalog.read_resource(&uri).await?;
    Ok(ResourceContent {
        uri,
        mime_type: MIME_MARKDOWN.to_string(),
        text: doc.content,
    })
}

// --- Tools ---

/// Topic name accepted by `get_sdk_doc`: any documentation topic or `overview`.
///
/// Kept as a string so an unknown topic is reported by the catalog as an
/// invalid request rather than rejected during argument parsing.
#[derive(Debug, Clone, Deserialize)]
#[serde(transparent)]
pub struct TopicName(pub String);

impl JsonSchema for TopicName {
    fn schema_name() -> Cow<'static, str> {
        "TopicName".into()
    }

    fn json_schema(_generator: &mut SchemaGenerator) -> Schema {
        let names: Vec<&str> = Topic::ALL
            .iter()
            .map(|topic| topic.as_str())
            .chain(["overview"])
            .collect();
        json_schema!({
            "type": "string",
            "enum": names,
        })
    }
}

/// SDK name accepted by `get_sdk_doc`. Left unparsed because it is ignored
/// for the overview topic and checked by the catalog for every other topic.
#[derive(Debug, Clone, Deserialize)]
#[serde(transparent)]
pub struct SdkName(pub String);

impl JsonSchema for SdkName {
    fn schema_name() -> Cow<'static, str> {
        "SdkName".into()
    }

    fn json_schema(_generator: &mut SchemaGenerator) -> Schema {
        let names: Vec<&str> = Sdk::ALL.iter().map(|sdk| sdk.as_str()).collect();
        json_schema!({
            "type": "string",
            "enum": names,
        })
    }
}

#[derive(Deserialize, JsonSchema)]
pub struct SearchDocsArgs {
    /// Search query (keywords, API names, concepts, etc.)
    pub query: String,
    /// Which SDK to search (js, dart, or both)
    #[serde(default)]
    pub sdk: SdkFilter,
    /// Optional: Filter by specific documentation topic
    #[serde(default)]
    pub topic: Option<Topic>,
}

#[derive(Deserialize, JsonSchema)]
pub struct GetDocArgs {
    /// The documentation topic to retrieve
    pub topic: TopicName,
    /// The SDK type (js or dart). Ignored if topic is "overview"
    #[serde(default)]
    pub sdk: Option<SdkName>,
}

#[derive(Deserialize, JsonSchema)]
pub struct ListDocsArgs {
    /// Filter by SDK type (js, dart, or both)
    #[serde(default)]
    pub sdk: SdkFilter,
}

async fn search_docs_tool(
    ctx: Arc<AppContext>,
    args: SearchDocsArgs,
) -> Result<ToolResult, McpError> {
    let response = ctx.catalog.search(&args.query, args.sdk, args.topic).await;
    tracing::info!(
        "search_sdk_docs '{}': {} of {} results",
        args.query,
        response.results.len(),
        response.total
    );
    ToolResult::json(&response)
}

async fn get_doc_tool(ctx: Arc<AppContext>, args: GetDocArgs) -> Result<ToolResult, McpError> {
    let sdk = args.sdk.as_ref().map(|sdk| sdk.0.as_str());
    let doc = ctx.catalog.resolve_topic(sdk, &args.topic.0).await?;
    Ok(ToolResult::success(doc.content))
}

async fn list_docs_tool(ctx: Arc<AppContext>, args: ListDocsArgs) -> Result<ToolResult, McpError> {
    #[derive(Serialize)]
    struct ListDocsResponse {
        docs: Vec<DocSummary>,
    }

    ToolResult::json(&ListDocsResponse {
        docs: ctx.catalog.list_documents(args.sdk),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::protocol::{INVALID_REQUEST, RESOURCE_NOT_FOUND};
    use serde_json::{Value, json};
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn server() -> (TempDir, McpServer<AppContext>) {
        let dir = TempDir::new().expect("Failed to create temp dir");
        write(dir.path(), "SDK_DOCUMENTATION.md", "# Overview\n");
        write(dir.path(), "js-sdk/FILES.md", "# Files\nUpload files.\n");
        write(dir.path(), "dart-sdk/FILES.md", "# Files (Dart)\n");
        let server = build_server(AppContext {
            catalog: DocCatalog::builtin(dir.path()),
        });
        (dir, server)
    }

    fn text(result: &ToolResult) -> &str {
        &result.content[0].text
    }

    #[test]
    fn registers_three_tools() {
        let (_dir, server) = server();
        let names: Vec<String> = server.list_tools().into_iter().map(|t| t.name).collect();
        assert_eq!(names, ["get_sdk_doc", "list_sdk_docs", "search_sdk_docs"]);
    }

    #[test]
    fn get_doc_schema_lists_overview_topic() {
        let (_dir, server) = server();
        let tool = server
            .list_tools()
            .into_iter()
            .find(|t| t.name == "get_sdk_doc")
            .unwrap();
        let schema = tool.input_schema.to_string();
        assert!(schema.contains("\"overview\""));
        assert!(schema.contains("\"file-api\""));
        assert!(schema.contains(r#""enum":["js","dart"]"#), "{schema}");
        assert_eq!(tool.input_schema["required"], json!(["topic"]));
    }

    #[tokio::test]
    async fn get_overview_ignores_sdk() {
        let (_dir, server) = server();
        for args in [
            json!({"topic": "overview"}),
            json!({"topic": "overview", "sdk": "dart"}),
            json!({"topic": "overview", "sdk": "both"}),
            json!({"topic": "overview", "sdk": "python"}),
            json!({"topic": "overview", "sdk": ""}),
        ] {
            let result = server.call_tool("get_sdk_doc", args).await.unwrap();
            assert_eq!(text(&result), "# Overview\n");
        }
    }

    #[tokio::test]
    async fn get_topic_requires_sdk() {
        let (_dir, server) = server();
        let err = server
            .call_tool("get_sdk_doc", json!({"topic": "files"}))
            .await
            .unwrap_err();
        assert_eq!(err.code, INVALID_REQUEST);

        let result = server
            .call_tool("get_sdk_doc", json!({"topic": "files", "sdk": "js"}))
            .await
            .unwrap();
        assert_eq!(text(&result), "# Files\nUpload files.\n");
    }

    #[tokio::test]
    async fn get_unknown_topic_is_invalid_request() {
        let (_dir, server) = server();
        let err = server
            .call_tool("get_sdk_doc", json!({"topic": "graphql", "sdk": "js"}))
            .await
            .unwrap_err();
        assert_eq!(err.code, INVALID_REQUEST);
    }

    #[tokio::test]
    async fn get_missing_file_is_not_found() {
        let (_dir, server) = server();
        let err = server
            .call_tool("get_sdk_doc", json!({"topic": "realtime", "sdk": "js"}))
            .await
            .unwrap_err();
        assert_eq!(err.code, RESOURCE_NOT_FOUND);
    }

    #[tokio::test]
    async fn invalid_sdk_is_invalid_request() {
        let (_dir, server) = server();
        let err = server
            .call_tool("list_sdk_docs", json!({"sdk": "python"}))
            .await
            .unwrap_err();
        assert_eq!(err.code, INVALID_REQUEST);

        for sdk in ["python", "both"] {
            let err = server
                .call_tool("get_sdk_doc", json!({"topic": "files", "sdk": sdk}))
                .await
                .unwrap_err();
            assert_eq!(err.code, INVALID_REQUEST);
            assert_eq!(err.message, format!("Unknown SDK type: {sdk}"));
        }
    }

    #[tokio::test]
    async fn get_requires_topic() {
        let (_dir, server) = server();
        let err = server
            .call_tool("get_sdk_doc", json!({"sdk": "js"}))
            .await
            .unwrap_err();
        assert_eq!(err.code, INVALID_REQUEST);
    }

    #[tokio::test]
    async fn list_defaults_to_both() {
        let (_dir, server) = server();
        let result = server.call_tool("list_sdk_docs", Value::Null).await.unwrap();
        let body: Value = serde_json::from_str(text(&result)).unwrap();
        let docs = body["docs"].as_array().unwrap();
        assert_eq!(docs.len(), 27);
        assert_eq!(docs[26]["sdk"], "overview");
    }

    #[tokio::test]
    async fn search_returns_json_payload() {
        let (_dir, server) = server();
        let result = server
            .call_tool("search_sdk_docs", json!({"query": "upload"}))
            .await
            .unwrap();
        let body: Value = serde_json::from_str(text(&result)).unwrap();
        assert_eq!(body["query"], "upload");
        assert_eq!(body["total"], 1);
        assert_eq!(body["results"][0]["uri"], "sdk-doc://js-files");
        assert_eq!(body["results"][0]["relevance"], 6);
    }

    #[tokio::test]
    async fn search_requires_query() {
        let (_dir, server) = server();
        let err = server
            .call_tool("search_sdk_docs", json!({"sdk": "js"}))
            .await
            .unwrap_err();
        assert_eq!(err.code, INVALID_REQUEST);
    }

    #[tokio::test]
    async fn resources_list_only_existing_files() {
        let (_dir, server) = server();
        let uris: Vec<String> = server
            .list_resources()
            .await
            .into_iter()
            .map(|r| r.uri)
            .collect();
        assert_eq!(
            uris,
            ["sdk-doc://js-files", "sdk-doc://dart-files", "sdk-doc://overview"]
        );
    }

    #[tokio::test]
    async fn resource_read_returns_markdown() {
        let (_dir, server) = server();
        let content = server.read_resource("sdk-doc://dart-files").await.unwrap();
        assert_eq!(content.text, "# Files (Dart)\n");
        assert_eq!(content.mime_type, MIME_MARKDOWN);
        assert_eq!(content.uri, "sdk-doc://dart-files");
    }

    #[tokio::test]
    async fn unknown_resource_is_invalid_request() {
        let (_dir, server) = server();
        let err = server
            .read_resource("sdk-doc://not-a-real-key")
            .await
            .unwrap_err();
        assert_eq!(err.code, INVALID_REQUEST);
    }
}
