use crate::{GlobalArgs, run_command};
use sdkdocs_mcp::{AppContext, build_server};

pub async fn run(global: &GlobalArgs) -> i32 {
    run_command(|| async {
        let catalog = global.catalog()?;
        tracing::info!(
            "SDK documentation MCP server running on stdio (docs: {})",
            catalog.root().display()
        );

        let server = build_server(AppContext { catalog });
        server
            .run_stdio()
            .await
            .map_err(|e| format!("MCP server error: {e}"))
    })
    .await
}
