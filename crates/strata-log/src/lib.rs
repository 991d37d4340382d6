//! Structured logging for the Strata baker.
//!
//! Console output carries uptime, target and worker thread names so that
//! per-tile messages from the bake pool can be told apart. Debug builds can
//! also write a JSON log for post-mortem analysis of a bake.

use std::path::Path;

use strata_config::Config;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Directives used when neither `RUST_LOG` nor the config set a level.
pub const DEFAULT_DIRECTIVES: &str = "info,png=warn";

/// File name of the JSON log inside `log_dir`.
pub const LOG_FILE: &str = "strata.log";

/// Filter directives for `config`, falling back to [`DEFAULT_DIRECTIVES`].
#[must_use]
pub fn filter_directives(config: Option<&Config>) -> String {
    match config {
        Some(config) if !config.debug.log_level.trim().is_empty() => {
            config.debug.log_level.trim().to_string()
        }
        _ => DEFAULT_DIRECTIVES.to_string(),
    }
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over the config level. When `debug_build` is set and
/// `log_dir` is writable, a JSON layer writing [`LOG_FILE`] is added.
/// Returns `false` if a global subscriber was already installed.
///
/// ```no_run
/// use strata_config::Config;
/// use strata_log::init_logging;
///
/// let config = Config::default();
/// init_logging(Some(std::path::Path::new("./logs")), true, Some(&config));
/// ```
pub fn init_logging(log_dir: Option<&Path>, debug_build: bool, config: Option<&Config>) -> bool {
    let directives = filter_directives(config);
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&directives));

    let console_layer = fmt::layer()
        .with_target(true)
        .with_thread_names(true) // bake workers are named
        .with_level(true)
        .with_timer(fmt::time::uptime());

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer);

    if debug_build
        && let Some(log_dir) = log_dir
        && std::fs::create_dir_all(log_dir).is_ok()
        && let Ok(log_file) = std::fs::File::create(log_dir.join(LOG_FILE))
    {
        let file_layer = fmt::layer()
            .with_writer(log_file)
            .with_ansi(false)
            .with_target(true)
            .with_thread_names(true)
            .with_timer(fmt::time::uptime())
            .json();

        return subscriber.with(file_layer).try_init().is_ok();
    }

    subscriber.try_init().is_ok()
}

/// An `EnvFilter` built from [`DEFAULT_DIRECTIVES`].
pub fn default_env_filter() -> EnvFilter {
    EnvFilter::new(DEFAULT_DIRECTIVES)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter() {
        let filter = format!("{}", default_env_filter());
        assert!(filter.contains("info"));
        assert!(filter.contains("png=warn"));
    }

    #[test]
    fn test_directives_follow_config() {
        let mut config = Config::default();
        config.debug.log_level = "debug,strata_tin=trace".to_string();
        assert_eq!(filter_directives(Some(&config)), "debug,strata_tin=trace");
    }

    #[test]
    fn test_blank_level_falls_back() {
        let mut config = Config::default();
        config.debug.log_level = "  ".to_string();
        assert_eq!(filter_directives(Some(&config)), DEFAULT_DIRECTIVES);
        assert_eq!(filter_directives(None), DEFAULT_DIRECTIVES);
    }

    #[test]
    fn test_crate_directives_parse() {
        for directives in [
            "info",
            "debug,strata_tin=trace",
            "warn,strata_bake=debug,strata_bounds=trace",
        ] {
            assert!(
                EnvFilter::try_new(directives).is_ok(),
                "failed to parse {directives}"
            );
        }
    }

    #[test]
    fn test_json_log_file_is_created() {
        let dir = tempfile::tempdir().unwrap();
        init_logging(Some(dir.path()), true, None);
        assert!(dir.path().join(LOG_FILE).exists());
        // A global subscriber is now installed, so a second one is refused.
        assert!(!init_logging(None, false, None));
    }
}
