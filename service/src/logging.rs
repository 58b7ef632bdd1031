use crate::config::Config;
use log::LevelFilter;
use simplelog::{self, ConfigBuilder};

/// Dependency targets that are only worth seeing in Trace mode.
const FILTERED_MODULES: &[&str] = &["tower", "hyper", "axum", "tokio", "mio"];

pub struct Logger {}

impl Logger {
    /// Initializes the global terminal logger at the configured level.
    ///
    /// Below Trace, logs from noisy HTTP and runtime dependencies are dropped.
    /// Fails if a global logger was already installed.
    pub fn init_logger(config: &Config) -> Result<(), log::SetLoggerError> {
        let log_config = Self::build_log_config(Self::should_filter_dependencies(
            config.log_level_filter,
        ));

        simplelog::TermLogger::init(
            config.log_level_filter,
            log_config,
            simplelog::TerminalMode::Mixed,
            simplelog::ColorChoice::Auto,
        )
    }

    fn should_filter_dependencies(level: LevelFilter) -> bool {
        level != LevelFilter::Trace
    }

    fn build_log_config(apply_filters: bool) -> simplelog::Config {
        let mut builder = ConfigBuilder::new();
        builder.set_time_format_rfc3339();

        if apply_filters {
            for module in FILTERED_MODULES {
                builder.add_filter_ignore_str(module);
            }
        }

        builder.build()
    }
}
