//! Command line interface for the SDK documentation server.

use clap::{Args, Parser, Subcommand};
use sdkdocs_core::{CatalogConfig, DocCatalog};
use std::ffi::OsString;
use std::future::Future;
use std::path::PathBuf;

mod commands;
mod logging;

pub use logging::init_tracing;

#[derive(Parser, Debug)]
#[command(
    name = "sdkdocs",
    version,
    about = "Serve the JS and Dart SDK reference docs over MCP"
)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Options shared by every subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Directory containing js-sdk/, dart-sdk/ and SDK_DOCUMENTATION.md
    #[arg(long, env = "SDK_DOCS_DIR", global = true)]
    pub docs_dir: Option<PathBuf>,

    /// TOML config file (defaults to ./sdkdocs.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

impl GlobalArgs {
    /// Build the catalog from config file, environment and flags.
    pub fn catalog(&self) -> Result<DocCatalog, String> {
        let cwd = std::env::current_dir()
            .map_err(|e| format!("Failed to determine current directory: {e}"))?;
        let config = CatalogConfig::load(self.config.as_deref(), &cwd)
            .map_err(|e| e.to_string())?
            .with_docs_dir(self.docs_dir.clone());
        Ok(config.into_catalog())
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the MCP server on stdio (default)
    Mcp,
    /// List available documents
    List(commands::list::ListArgs),
    /// Print a document
    Get(commands::get::GetArgs),
    /// Search the documents
    Search(commands::search::SearchArgs),
}

/// Parse `args` and run the selected command, returning the exit code.
pub async fn run_cli_async<I, T>(args: I) -> i32
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    match Cli::try_parse_from(args) {
        Ok(cli) => match cli.command {
            None | Some(Commands::Mcp) => commands::mcp::run(&cli.global).await,
            Some(Commands::List(args)) => commands::list::run(&cli.global, args),
            Some(Commands::Get(args)) => commands::get::run(&cli.global, args).await,
            Some(Commands::Search(args)) => commands::search::run(&cli.global, args).await,
        },
        Err(e) => {
            let code = e.exit_code();
            let _ = e.print();
            code
        }
    }
}

/// Run a fallible command body, printing its error to stderr.
pub(crate) async fn run_command<F, Fut>(f: F) -> i32
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<(), String>>,
{
    match f().await {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("{err}");
            1
        }
    }
}
