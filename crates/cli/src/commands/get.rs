use crate::{GlobalArgs, run_command};
use clap::Args;

#[derive(Args, Debug)]
pub struct GetArgs {
    /// Documentation topic, or "overview"
    pub topic: String,

    /// SDK type (js or dart); required unless the topic is "overview"
    #[arg(long)]
    pub sdk: Option<String>,
}

pub async fn run(global: &GlobalArgs, args: GetArgs) -> i32 {
    run_command(|| async {
        let catalog = global.catalog()?;
        let doc = catalog
            .resolve_topic(args.sdk.as_deref(), &args.topic)
            .await
            .map_err(|e| e.to_string())?;
        print!("{}", doc.content);
        Ok(())
    })
    .await
}
