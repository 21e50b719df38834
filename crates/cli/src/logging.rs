use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

/// Crates whose events are shown by default.
const CRATES: [&str; 3] = ["sdkdocs_cli", "sdkdocs_core", "sdkdocs_mcp"];

/// Install the global subscriber. Everything goes to stderr because stdout
/// carries the MCP protocol.
pub fn init_tracing() {
    if tracing_subscriber::registry()
        .with(fmt_layer_filter(std::env::var("SDKDOCS_LOG").ok().as_deref()))
        .try_init()
        .is_err()
    {
        eprintln!("Warning: tracing subscriber already initialized");
    }
}

fn fmt_layer_filter<S>(setting: Option<&str>) -> impl tracing_subscriber::Layer<S>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_filter(EnvFilter::new(filter_spec(setting)))
}

// SDKDOCS_LOG controls log level: "trace", "debug", "info", "warn", "error"
// or a full tracing filter spec like "sdkdocs_core=debug"
fn filter_spec(setting: Option<&str>) -> String {
    match setting {
        Some(level) if is_plain_level(level) => crate_directives(level),
        Some(spec) => spec.to_string(),
        None => crate_directives("info"),
    }
}

fn crate_directives(level: &str) -> String {
    CRATES
        .iter()
        .map(|krate| format!("{krate}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}

fn is_plain_level(s: &str) -> bool {
    matches!(
        s.to_ascii_lowercase().as_str(),
        "trace" | "debug" | "info" | "warn" | "error"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_level_applies_to_every_crate() {
        assert_eq!(
            filter_spec(Some("debug")),
            "sdkdocs_cli=debug,sdkdocs_core=debug,sdkdocs_mcp=debug"
        );
    }

    #[test]
    fn full_spec_is_passed_through() {
        assert_eq!(filter_spec(Some("sdkdocs_core=trace")), "sdkdocs_core=trace");
    }

    #[test]
    fn defaults_to_info() {
        assert_eq!(
            filter_spec(None),
            "sdkdocs_cli=info,sdkdocs_core=info,sdkdocs_mcp=info"
        );
    }
}
