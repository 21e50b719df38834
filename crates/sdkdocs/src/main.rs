#[tokio::main]
async fn main() {
    sdkdocs_cli::init_tracing();
    let code = sdkdocs_cli::run_cli_async(std::env::args_os()).await;
    std::process::exit(code);
}
