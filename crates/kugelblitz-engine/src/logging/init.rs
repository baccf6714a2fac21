use std::io::Write;
use std::sync::Once;

use crate::time::WallTime;

/// Logger configuration.
///
/// `env_filter` follows the `env_logger` filter syntax (e.g. "info", "warn",
/// "kugelblitz_engine=debug").
///
/// `write_style` controls ANSI coloring behavior.
///
/// `wall_clock` prefixes every line with a local `[HH:MM:SS]` stamp instead of
/// the default `env_logger` header.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    pub write_style: env_logger::WriteStyle,
    pub wall_clock: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            write_style: env_logger::WriteStyle::Auto,
            wall_clock: true,
        }
    }
}

static INIT: Once = Once::new();

/// Initializes the global logger once.
///
/// This function is idempotent; subsequent calls are ignored.
/// Intended usage is early in `main`, before the window is created.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();

        if let Some(filter) = config.env_filter {
            builder.parse_filters(&filter);
        } else if let Ok(filter) = std::env::var("RUST_LOG") {
            builder.parse_filters(&filter);
        } else {
            builder.filter_level(log::LevelFilter::Info);
        }

        builder.write_style(config.write_style);

        if config.wall_clock {
            builder.format(|buf, record| {
                writeln!(
                    buf,
                    "{} {:<5} {}",
                    WallTime::now(),
                    record.level(),
                    record.args()
                )
            });
        }

        // A host process (tests, embedding app) may already own the global logger.
        if builder.try_init().is_ok() {
            log::debug!("logging initialized");
        }
    });
}
