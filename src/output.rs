//! # Output Configuration
//!
//! Controls how the CLI decorates its output: status markers, colored
//! resource ids and prefixed build output lines.
//!
//! ## Respecting User Preferences
//!
//! - `--color=never|always|auto` - CLI flag for color control
//! - `NO_COLOR` - Disables colors when set (per https://no-color.org/)
//! - `CLICOLOR=0` - Disables colors
//! - `CLICOLOR_FORCE=1` - Forces colors even in non-TTY
//! - `TERM=dumb` - Disables colors for dumb terminals
//!
//! Without color, markers fall back to bracketed plain text so logs and
//! piped output stay greppable.

use std::env;

use console::Style;

/// Output configuration for controlling colors and emojis.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// Whether colors and emojis should be used in output.
    pub use_color: bool,
}

impl OutputConfig {
    /// Create an output configuration from environment and CLI flag.
    ///
    /// `--color=always` forces colors on (overriding `NO_COLOR`),
    /// `--color=never` forces them off, anything else detects.
    pub fn from_env_and_flag(color_flag: &str) -> Self {
        let use_color = match color_flag.to_lowercase().as_str() {
            "always" => true,
            "never" => false,
            _ => Self::detect_color_support(),
        };

        Self { use_color }
    }

    fn detect_color_support() -> bool {
        // presence alone disables, even when empty
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
        console::Term::stdout().features().colors_supported()
    }

    #[cfg(test)]
    pub fn with_color() -> Self {
        Self { use_color: true }
    }

    #[cfg(test)]
    pub fn without_color() -> Self {
        Self { use_color: false }
    }

    /// Status marker for a line of output.
    pub fn marker(&self, marker: Marker) -> &'static str {
        let (fancy, plain) = match marker {
            Marker::Success => ("✅", "[OK]"),
            Marker::Skipped => ("⏭️ ", "[SKIP]"),
            Marker::Failure => ("❌", "[FAIL]"),
            Marker::Warning => ("⚠️ ", "[WARN]"),
            Marker::Working => ("🔨", "[BUILD]"),
            Marker::Clone => ("📥", "[CLONE]"),
        };
        emoji(self, fancy, plain)
    }

    /// A resource id, bold cyan when colors are on.
    pub fn resource_id(&self, id: &str) -> String {
        self.paint(Style::new().cyan().bold(), id)
    }

    /// A line of streamed build output, prefixed with its resource id.
    pub fn build_line(&self, id: &str, line: &str, is_stderr: bool) -> String {
        let prefix = format!("[{id}]");
        let prefix = if is_stderr {
            self.paint(Style::new().yellow(), &prefix)
        } else {
            self.paint(Style::new().dim(), &prefix)
        };
        format!("{prefix} {line}")
    }

    fn paint(&self, style: Style, text: &str) -> String {
        if self.use_color {
            style.force_styling(true).apply_to(text).to_string()
        } else {
            text.to_string()
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::from_env_and_flag("auto")
    }
}

/// Kinds of status line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Success,
    Skipped,
    Failure,
    Warning,
    Working,
    Clone,
}

/// Returns the emoji when colors are enabled, the plain text otherwise.
pub fn emoji<'a>(config: &OutputConfig, emoji_str: &'a str, plain: &'a str) -> &'a str {
    if config.use_color {
        emoji_str
    } else {
        plain
    }
}
