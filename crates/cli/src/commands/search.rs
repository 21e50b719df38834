use crate::{GlobalArgs, run_command};
use clap::Args;
use sdkdocs_core::{SdkFilter, Topic};

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Search query (keywords, API names, concepts, etc.)
    pub query: String,

    /// Which SDK to search (js, dart, or both)
    #[arg(long, default_value = "both")]
    pub sdk: SdkFilter,

    /// Restrict the search to one topic
    #[arg(long)]
    pub topic: Option<Topic>,
}

pub async fn run(global: &GlobalArgs, args: SearchArgs) -> i32 {
    run_command(|| async {
        let catalog = global.catalog()?;
        let response = catalog.search(&args.query, args.sdk, args.topic).await;
        let json = serde_json::to_string_pretty(&response)
            .map_err(|e| format!("Failed to serialize results: {e}"))?;
        println!("{json}");
        Ok(())
    })
    .await
}
