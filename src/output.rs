//! # Terminal Output
//!
//! Standard output belongs to the captured manifests, so that
//! `applier render > all.yaml` yields a clean YAML stream. Everything meant
//! for a human (run summaries and failure notices) goes to standard error and
//! is styled according to this module.
//!
//! ## Respecting User Preferences
//!
//! - `--color=never|always|auto` - CLI flag for color control
//! - `NO_COLOR` - Disables colors when set (per https://no-color.org/)
//! - `CLICOLOR=0` - Disables colors
//! - `CLICOLOR_FORCE=1` - Forces colors even when stderr is not a TTY
//! - `TERM=dumb` - Disables colors for dumb terminals

use std::env;

use console::style;

/// Output configuration for controlling colors and emojis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputConfig {
    /// Whether colors and emojis should be used in output.
    pub use_color: bool,
}

impl OutputConfig {
    /// Create an output configuration from environment and the `--color` flag.
    ///
    /// `always` and `never` win over the environment. In `auto` mode colors
    /// are disabled by `NO_COLOR` (any value), `CLICOLOR=0`, `TERM=dumb`, or a
    /// stderr that is not a terminal unless `CLICOLOR_FORCE` is set.
    pub fn from_env_and_flag(color_flag: &str) -> Self {
        let use_color = match color_flag.to_lowercase().as_str() {
            "always" => true,
            "never" => false,
            _ => Self::detect_color_support(),
        };

        Self { use_color }
    }

    fn detect_color_support() -> bool {
        if env::var_os("NO_COLOR").is_some() {
            return false;
        }
        if env::var("CLICOLOR").is_ok_and(|v| v == "0") {
            return false;
        }
        if env::var("CLICOLOR_FORCE").is_ok_and(|v| v != "0" && !v.is_empty()) {
            return true;
        }
        if env::var("TERM").is_ok_and(|v| v == "dumb") {
            return false;
        }

        console::Term::stderr().features().colors_supported()
    }

    pub fn with_color() -> Self {
        Self { use_color: true }
    }

    pub fn without_color() -> Self {
        Self { use_color: false }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::from_env_and_flag("auto")
    }
}

/// Returns `emoji_str` when colors are enabled and `plain` otherwise.
pub fn emoji<'a>(config: &OutputConfig, emoji_str: &'a str, plain: &'a str) -> &'a str {
    if config.use_color {
        emoji_str
    } else {
        plain
    }
}

/// Kind of a status line printed to stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    DryRun,
    Failure,
}

/// Format a one-line status message for stderr.
pub fn status_line(config: &OutputConfig, status: Status, message: &str) -> String {
    let (marker, plain) = match status {
        Status::Success => ("✅", "[OK]"),
        Status::DryRun => ("🔎", "[DRY RUN]"),
        Status::Failure => ("❌", "[FAILED]"),
    };
    let prefix = emoji(config, marker, plain);

    if !config.use_color {
        return format!("{} {}", prefix, message);
    }

    let styled = match status {
        Status::Success => style(message).green(),
        Status::DryRun => style(message).cyan(),
        Status::Failure => style(message).red().bold(),
    };
    format!("{} {}", prefix, styled.force_styling(true))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_color_always() {
        assert!(OutputConfig::from_env_and_flag("always").use_color);
        assert!(OutputConfig::from_env_and_flag("ALWAYS").use_color);
    }

    #[test]
    fn test_color_never() {
        assert!(!OutputConfig::from_env_and_flag("never").use_color);
    }

    /// Run `f` with the color environment cleared and `vars` set.
    fn with_color_env(vars: &[(&str, &str)], f: impl FnOnce()) {
        const KEYS: [&str; 4] = ["NO_COLOR", "CLICOLOR", "CLICOLOR_FORCE", "TERM"];
        let saved: Vec<_> = KEYS.iter().map(|k| (*k, env::var_os(k))).collect();
        for key in KEYS {
            env::remove_var(key);
        }
        for (key, value) in vars {
            env::set_var(key, value);
        }

        f();

        for (key, value) in saved {
            match value {
                Some(value) => env::set_var(key, value),
                None => env::remove_var(key),
            }
        }
    }

    #[test]
    #[serial]
    fn test_auto_respects_no_color() {
        with_color_env(&[("NO_COLOR", ""), ("CLICOLOR_FORCE", "1")], || {
            assert!(!OutputConfig::from_env_and_flag("auto").use_color);
        });
    }

    #[test]
    #[serial]
    fn test_auto_respects_clicolor_zero() {
        with_color_env(&[("CLICOLOR", "0")], || {
            assert!(!OutputConfig::from_env_and_flag("auto").use_color);
        });
    }

    #[test]
    #[serial]
    fn test_auto_clicolor_force() {
        with_color_env(&[("CLICOLOR_FORCE", "1"), ("TERM", "dumb")], || {
            assert!(OutputConfig::from_env_and_flag("auto").use_color);
        });
    }

    #[test]
    #[serial]
    fn test_always_overrides_no_color() {
        with_color_env(&[("NO_COLOR", "1")], || {
            assert!(OutputConfig::from_env_and_flag("always").use_color);
        });
    }

    #[test]
    fn test_emoji_helper() {
        assert_eq!(emoji(&OutputConfig::with_color(), "🔎", "[DRY RUN]"), "🔎");
        assert_eq!(
            emoji(&OutputConfig::without_color(), "🔎", "[DRY RUN]"),
            "[DRY RUN]"
        );
    }

    #[test]
    fn test_status_line_plain() {
        let config = OutputConfig::without_color();
        assert_eq!(
            status_line(&config, Status::Success, "Applied 2 manifest(s)"),
            "[OK] Applied 2 manifest(s)"
        );
        assert_eq!(
            status_line(&config, Status::Failure, "Apply failed"),
            "[FAILED] Apply failed"
        );
    }

    #[test]
    fn test_status_line_colored() {
        let line = status_line(&OutputConfig::with_color(), Status::DryRun, "Rendered 1 manifest(s)");
        assert!(line.starts_with("🔎 "));
        assert!(line.contains("Rendered 1 manifest(s)"));
        assert!(line.contains("\u{1b}["));
    }
}
