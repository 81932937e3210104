use tracing::Level;

/// Initialize tracing/logging for the exporter.
///
/// Output is written to stderr; stdout is reserved for the JSON document.
pub fn init(default_level: &str) {
    let lvl = parse_level(default_level);

    // try_init so tests can call this multiple times without panicking
    let _ = tracing_subscriber::fmt()
        .with_max_level(lvl)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

pub(crate) fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "error" => Level::ERROR,
        "warn" | "warning" => Level::WARN,
        "debug" => Level::DEBUG,
        "trace" => Level::TRACE,
        _ => Level::INFO,
    }
}
