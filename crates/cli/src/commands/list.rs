use crate::GlobalArgs;
use clap::Args;
use sdkdocs_core::SdkFilter;

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Filter by SDK type (js, dart, or both)
    #[arg(long, default_value = "both")]
    pub sdk: SdkFilter,
}

pub fn run(global: &GlobalArgs, args: ListArgs) -> i32 {
    let catalog = match global.catalog() {
        Ok(catalog) => catalog,
        Err(err) => {
            eprintln!("{err}");
            return 1;
        }
    };

    for doc in catalog.list_documents(args.sdk) {
        println!("{:<24} {}", doc.id, doc.title);
    }
    0
}
