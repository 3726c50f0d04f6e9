use std::sync::Once;

/// Logger configuration.
///
/// Filter precedence: `env_filter`, then `RUST_LOG`, then `default_level` with
/// the GPU stack held at `warn`. Filters use the `env_logger` syntax (e.g.
/// "lamina_engine=debug,wgpu_core=warn").
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    pub default_level: log::LevelFilter,
    pub write_style: env_logger::WriteStyle,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            default_level: log::LevelFilter::Info,
            write_style: env_logger::WriteStyle::Auto,
        }
    }
}

/// Crates that are chatty at `info` and only interesting when they complain.
const QUIET_MODULES: [&str; 3] = ["wgpu_core", "wgpu_hal", "naga"];

/// The filter string `init_logging` installs, given the value of `RUST_LOG`.
fn filter_spec(config: &LoggingConfig, rust_log: Option<&str>) -> String {
    if let Some(filter) = config.env_filter.as_deref().or(rust_log) {
        return filter.to_owned();
    }
    let mut spec = config.default_level.to_string().to_lowercase();
    for module in QUIET_MODULES {
        spec.push_str(&format!(",{module}=warn"));
    }
    spec
}

static INIT: Once = Once::new();

/// Installs the global `env_logger` once; later calls are no-ops.
///
/// Call early in `main`, before the window opens.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let rust_log = std::env::var("RUST_LOG").ok();
        let spec = filter_spec(&config, rust_log.as_deref());

        let mut builder = env_logger::Builder::new();
        builder.parse_filters(&spec);
        builder.write_style(config.write_style);

        // A test harness may already own the global logger.
        if builder.try_init().is_ok() {
            log::debug!("logging initialized ({spec})");
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_filter_wins_over_rust_log() {
        let config = LoggingConfig {
            env_filter: Some("lamina_gui=trace".into()),
            ..LoggingConfig::default()
        };
        assert_eq!(filter_spec(&config, Some("debug")), "lamina_gui=trace");
    }

    #[test]
    fn rust_log_is_used_verbatim() {
        assert_eq!(filter_spec(&LoggingConfig::default(), Some("debug")), "debug");
    }

    #[test]
    fn default_keeps_gpu_stack_quiet() {
        assert_eq!(
            filter_spec(&LoggingConfig::default(), None),
            "info,wgpu_core=warn,wgpu_hal=warn,naga=warn"
        );
    }

    #[test]
    fn repeated_init_is_harmless() {
        init_logging(LoggingConfig::default());
        init_logging(LoggingConfig::default());
    }
}
