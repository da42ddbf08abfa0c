//! Logging configuration for anomaly-watch.
//!
//! The library only emits `tracing` events; installing a subscriber is left to
//! the application. [`setup::init_logging`] is the one used by the command
//! line tool.

use tracing::Level;

/// Controls how chatty the detection pipeline is.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Base log level for anomaly-watch components
    pub base_level: Level,
    /// Whether to log every dropped row at trace level
    pub log_dropped_rows: bool,
    /// Whether to log data source operations
    pub log_data_operations: bool,
    /// Whether to emit JSON lines instead of plain text
    pub json_format: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            base_level: Level::INFO,
            log_dropped_rows: false,
            log_data_operations: true,
            json_format: false,
        }
    }
}

impl LogConfig {
    /// Creates a verbose configuration suitable for debugging.
    pub fn verbose() -> Self {
        Self {
            base_level: Level::DEBUG,
            log_dropped_rows: true,
            log_data_operations: true,
            json_format: false,
        }
    }

    /// Creates a quiet configuration that only reports problems.
    pub fn quiet() -> Self {
        Self {
            base_level: Level::WARN,
            log_dropped_rows: false,
            log_data_operations: false,
            json_format: false,
        }
    }

    /// Sets whether events are written as JSON lines.
    pub fn with_json_format(mut self, enabled: bool) -> Self {
        self.json_format = enabled;
        self
    }

    /// Subscriber settings matching this configuration.
    pub fn to_logging_config(&self) -> setup::LoggingConfig {
        let crate_level = if self.log_dropped_rows {
            Level::TRACE
        } else {
            self.base_level
        };
        setup::LoggingConfig::default()
            .with_level(self.base_level.min(Level::WARN))
            .with_crate_level(crate_level)
            .with_json_format(self.json_format)
    }
}

/// Logs a data source operation at info level when enabled in `$config`.
#[macro_export]
macro_rules! log_data_op {
    ($config:expr, $($arg:tt)*) => {
        if $config.log_data_operations {
            tracing::info!($($arg)*);
        }
    };
}

/// Truncates a cell value to `max_length` bytes for logging.
pub fn truncate_field(value: &str, max_length: usize) -> String {
    if value.len() <= max_length {
        return value.to_string();
    }
    let mut end = max_length;
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...(truncated)", &value[..end])
}

/// Subscriber installation.
pub mod setup {
    use tracing::Level;

    /// Configuration for the `tracing-subscriber` setup.
    #[derive(Debug, Clone)]
    pub struct LoggingConfig {
        /// Log level for everything outside this crate
        pub level: Level,
        /// Log level for anomaly-watch components
        pub crate_level: Level,
        /// Whether to use JSON output format
        pub json_format: bool,
        /// Environment filter override
        pub env_filter: Option<String>,
    }

    impl Default for LoggingConfig {
        fn default() -> Self {
            Self {
                level: Level::WARN,
                crate_level: Level::INFO,
                json_format: false,
                env_filter: None,
            }
        }
    }

    impl LoggingConfig {
        /// Sets the log level for other crates.
        pub fn with_level(mut self, level: Level) -> Self {
            self.level = level;
            self
        }

        /// Sets the log level for anomaly-watch components.
        pub fn with_crate_level(mut self, level: Level) -> Self {
            self.crate_level = level;
            self
        }

        /// Sets whether to use JSON output format.
        pub fn with_json_format(mut self, enabled: bool) -> Self {
            self.json_format = enabled;
            self
        }

        /// Sets a custom environment filter.
        pub fn with_env_filter(mut self, filter: impl Into<String>) -> Self {
            self.env_filter = Some(filter.into());
            self
        }

        /// Builds the environment filter string.
        pub fn env_filter(&self) -> String {
            if let Some(ref filter) = self.env_filter {
                filter.clone()
            } else {
                format!(
                    "{},anomaly_watch={}",
                    self.level.as_str().to_lowercase(),
                    self.crate_level.as_str().to_lowercase()
                )
            }
        }
    }

    /// Installs a global subscriber writing to stderr.
    ///
    /// `RUST_LOG` takes precedence over the configured filter.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use anomaly_watch::logging::LogConfig;
    /// use anomaly_watch::logging::setup::init_logging;
    ///
    /// init_logging(LogConfig::verbose().with_json_format(true).to_logging_config()).unwrap();
    /// ```
    pub fn init_logging(config: LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(config.env_filter()));

        let fmt_layer = if config.json_format {
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .boxed()
        } else {
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .boxed()
        };

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_config_defaults() {
        let config = LogConfig::default();
        assert_eq!(config.base_level, Level::INFO);
        assert!(!config.log_dropped_rows);
        assert!(config.log_data_operations);
    }

    #[test]
    fn test_log_config_verbose_traces_dropped_rows() {
        let config = LogConfig::verbose();
        assert_eq!(config.base_level, Level::DEBUG);
        let logging = config.to_logging_config();
        assert_eq!(logging.crate_level, Level::TRACE);
        assert_eq!(logging.env_filter(), "warn,anomaly_watch=trace");
    }

    #[test]
    fn test_log_config_quiet() {
        let logging = LogConfig::quiet().to_logging_config();
        assert_eq!(logging.env_filter(), "warn,anomaly_watch=warn");
    }

    #[test]
    fn test_env_filter_override() {
        let config = LogConfig::quiet()
            .to_logging_config()
            .with_env_filter("anomaly_watch=debug");
        assert_eq!(config.env_filter(), "anomaly_watch=debug");
        assert_eq!(
            setup::LoggingConfig::default().env_filter(),
            "warn,anomaly_watch=info"
        );
    }

    #[test]
    fn test_json_format_reaches_subscriber_config() {
        assert!(!LogConfig::default().to_logging_config().json_format);
        let logging = LogConfig::verbose().with_json_format(true).to_logging_config();
        assert!(logging.json_format);
        assert_eq!(logging.env_filter(), "warn,anomaly_watch=trace");
    }

    #[test]
    fn test_truncate_field() {
        assert_eq!(truncate_field("hello", 10), "hello");
        assert_eq!(
            truncate_field("2023-01-01T00:00:00Z and more", 10),
            "2023-01-01...(truncated)"
        );
        // never splits a multi-byte character
        assert_eq!(truncate_field("ééé", 3), "é...(truncated)");
    }
}
