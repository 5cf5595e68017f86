use std::fmt;

use clap::ValueEnum;
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "STUBINFER_LOG";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn parse(spec: &str) -> Option<Self> {
        match spec.to_ascii_lowercase().as_str() {
            "error" | "err" => Some(Self::Error),
            "warn" | "warning" => Some(Self::Warn),
            "info" => Some(Self::Info),
            "debug" => Some(Self::Debug),
            "trace" | "verbose" => Some(Self::Trace),
            _ => None,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        };
        f.write_str(text)
    }
}

/// Filter directive: the flag wins, then `STUBINFER_LOG`, then `warn`.
fn resolve_directive(flag: Option<LogLevel>, env: Option<&str>) -> String {
    match (flag, env) {
        (Some(level), _) => level.to_string(),
        (None, Some(spec)) if !spec.trim().is_empty() => LogLevel::parse(spec.trim())
            .map(|level| level.to_string())
            .unwrap_or_else(|| spec.trim().to_string()),
        _ => LogLevel::Warn.to_string(),
    }
}

pub fn init_logging(flag: Option<LogLevel>) {
    let env = std::env::var(LOG_ENV).ok();
    let directive = resolve_directive(flag, env.as_deref());
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .without_time()
        .compact()
        .try_init();
}
