//! Telemetry initialization.
//!
//! Controlled by `UDT_SYNC_LOG`:
//! - unset → no-op (no subscriber installed)
//! - `"stderr"` → JSON events to stderr
//! - `"pretty"` → human-readable events to stderr
//!
//! Filtering follows `RUST_LOG` (default `info`).

use tracing_subscriber::EnvFilter;

/// Environment variable selecting the log sink.
pub const LOG_ENV: &str = "UDT_SYNC_LOG";

/// Where log events go.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogSink {
    /// Logging disabled.
    Off,
    /// One JSON object per event on stderr.
    JsonStderr,
    /// Human-readable lines on stderr.
    PrettyStderr,
}

impl LogSink {
    /// Interpret the value of [`LOG_ENV`].
    #[must_use]
    pub fn from_env_value(value: Option<&str>) -> Self {
        match value {
            None | Some("") => Self::Off,
            Some("pretty") => Self::PrettyStderr,
            Some("stderr") => Self::JsonStderr,
            Some(other) => {
                eprintln!("warning: unknown {LOG_ENV} value '{other}', using 'stderr'");
                Self::JsonStderr
            }
        }
    }
}

/// Initialize telemetry based on `UDT_SYNC_LOG`.
pub fn init() {
    let value = std::env::var(LOG_ENV).ok();
    match LogSink::from_env_value(value.as_deref()) {
        LogSink::Off => {}
        LogSink::JsonStderr => init_stderr(true),
        LogSink::PrettyStderr => init_stderr(false),
    }
}

fn init_stderr(json: bool) {
    use tracing_subscriber::layer::SubscriberExt as _;
    use tracing_subscriber::util::SubscriberInitExt as _;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_span_events(tracing_subscriber::fmt::format::FmtSpan::CLOSE),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
