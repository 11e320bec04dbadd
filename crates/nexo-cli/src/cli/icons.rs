//! Console icons shared by all commands.

use console::{style, StyledObject};

use nexo::archive::LogLevel;

pub fn success() -> StyledObject<&'static str> {
    style("✓").green()
}

pub fn info() -> StyledObject<&'static str> {
    style("→").cyan()
}

pub fn warn() -> StyledObject<&'static str> {
    style("!").yellow()
}

pub fn error() -> StyledObject<&'static str> {
    style("✗").red()
}

/// Dim arrow for secondary lines.
pub fn dim_arrow() -> StyledObject<&'static str> {
    style("→").dim()
}

/// Icon for a run log entry.
pub fn for_level(level: LogLevel) -> StyledObject<&'static str> {
    match level {
        LogLevel::Info => info(),
        LogLevel::Success => success(),
        LogLevel::Warn => warn(),
        LogLevel::Error => error(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_icons_match_plain_icons() {
        console::set_colors_enabled(false);
        assert_eq!(for_level(LogLevel::Success).to_string(), "✓");
        assert_eq!(for_level(LogLevel::Error).to_string(), "✗");
        assert_eq!(for_level(LogLevel::Warn).to_string(), "!");
        assert_eq!(for_level(LogLevel::Info).to_string(), dim_arrow().to_string());
    }
}
