use tracing_subscriber::EnvFilter;

/// Output flavour for the process-wide subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Colours and timestamps for terminals and container logs
    Terminal,
    /// Plain lines without timestamps; the hosting platform stamps them
    Platform,
}

/// Install the global `tracing` subscriber.
///
/// `level` is an env-filter directive such as `info` or `info,scylla=warn`.
/// Driver events arrive through the same subscriber, so anything the filter
/// lets through above `debug` is the driver's non-verbose event stream.
/// Calling this twice is harmless: the second subscriber is discarded.
pub fn init(level: &str, format: LogFormat) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let _ = match format {
        LogFormat::Terminal => builder.try_init(),
        LogFormat::Platform => builder.with_ansi(false).without_time().try_init(),
    };
}
