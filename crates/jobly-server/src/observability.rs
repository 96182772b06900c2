//! Logging setup.
//!
//! Logging starts at `info` before the configuration is read. Once it is,
//! [`LogLevel::set`] switches to `[logging] level`. A `RUST_LOG` present at
//! start-up wins over the configuration for the whole run.

use tracing_subscriber::{EnvFilter, Registry, filter::LevelFilter, fmt, prelude::*, reload};

/// Dependencies that are chatty below `warn`.
const NOISY_TARGETS: &[&str] = &["sqlx", "hyper", "h2"];

/// Handle for changing the log level after start-up.
#[derive(Clone)]
pub struct LogLevel {
    handle: Option<reload::Handle<EnvFilter, Registry>>,
    from_env: bool,
}

/// Installs the global subscriber. Later calls leave the first one in place.
pub fn init_tracing() -> LogLevel {
    let from_env = std::env::var_os("RUST_LOG").is_some();
    let filter = if from_env {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    } else {
        EnvFilter::new(directives(LevelFilter::INFO))
    };

    let (layer, handle) = reload::Layer::new(filter);
    let installed = tracing_subscriber::registry()
        .with(layer)
        .with(fmt::layer())
        .try_init()
        .is_ok();

    LogLevel {
        handle: installed.then_some(handle),
        from_env,
    }
}

impl LogLevel {
    /// Switches to `level` (`trace` through `error`, or `off`).
    pub fn set(&self, level: &str) -> Result<(), String> {
        let level = parse_level(level)?;
        if self.from_env {
            tracing::debug!(%level, "RUST_LOG is set; keeping it");
            return Ok(());
        }
        let Some(handle) = &self.handle else {
            return Ok(());
        };
        handle
            .reload(EnvFilter::new(directives(level)))
            .map_err(|e| format!("failed to change log level: {e}"))
    }
}

pub fn parse_level(level: &str) -> Result<LevelFilter, String> {
    level
        .trim()
        .parse::<LevelFilter>()
        .map_err(|_| format!("unknown log level: {level}"))
}

/// Filter directives for `level`, with [`NOISY_TARGETS`] capped at `warn`.
fn directives(level: LevelFilter) -> String {
    let noisy = level.min(LevelFilter::WARN);
    let mut out = level.to_string();
    for target in NOISY_TARGETS {
        out.push_str(&format!(",{target}={noisy}"));
    }
    out
}
