#![warn(clippy::all, clippy::pedantic)]
use std::{env, time::Duration};

pub const TAB_STOP: usize = 4;
pub const QUIT_TIMES: u8 = 3;
pub const MESSAGE_TIMEOUT: Duration = Duration::from_secs(5);
pub const ESCAPE_TIMEOUT: Duration = Duration::from_millis(100);

const TAB_STOP_VAR: &str = "WILO_TAB_STOP";

/// Tunables for a single editor session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Width a tab expands to when rendered.
    pub tab_stop: usize,
    /// Extra `Ctrl-Q` presses needed to discard unsaved changes.
    pub quit_times: u8,
    /// How long a status message stays on the message line.
    pub message_timeout: Duration,
    /// How long the input decoder waits for the rest of an escape sequence.
    pub escape_timeout: Duration,
}

impl Default for Config {
    /// Takes nothing.
    /// Builds a `Config` with the built-in defaults.
    fn default() -> Self {
        Self {
            tab_stop: TAB_STOP,
            quit_times: QUIT_TIMES,
            message_timeout: MESSAGE_TIMEOUT,
            escape_timeout: ESCAPE_TIMEOUT,
        }
    }
}

impl Config {
    /// Takes nothing.
    /// Builds a `Config` from the defaults, overridden by the environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::default().with_tab_stop(env::var(TAB_STOP_VAR).ok().as_deref())
    }

    /// Takes itself and an optional raw tab stop value.
    /// Applies the value when it parses to a width of at least one column.
    #[must_use]
    pub fn with_tab_stop(mut self, raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return self;
        };
        match raw.trim().parse::<usize>() {
            Ok(tab_stop) if tab_stop >= 1 => self.tab_stop = tab_stop,
            _ => tracing::warn!("ignoring {TAB_STOP_VAR}={raw:?}, expected a positive integer"),
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    #[test]
    fn defaults_match_constants() {
        let config = Config::default();
        assert_eq!(config.tab_stop, 4);
        assert_eq!(config.quit_times, 3);
        assert_eq!(config.message_timeout, Duration::from_secs(5));
        assert_eq!(config.escape_timeout, Duration::from_millis(100));
    }

    #[test_case(None, 4 ; "unset")]
    #[test_case(Some("8"), 8 ; "valid")]
    #[test_case(Some(" 2 "), 2 ; "padded")]
    #[test_case(Some("0"), 4 ; "zero rejected")]
    #[test_case(Some("wide"), 4 ; "garbage rejected")]
    fn tab_stop_override(raw: Option<&str>, expected: usize) {
        assert_eq!(Config::default().with_tab_stop(raw).tab_stop, expected);
    }
}
