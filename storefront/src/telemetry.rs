//! Log subscriber installation for the binary.

use tracing_subscriber::{EnvFilter, fmt};

/// Output format of log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines.
    Text,
    /// One JSON object per line.
    Json,
}

impl From<bool> for LogFormat {
    fn from(json: bool) -> Self {
        if json { Self::Json } else { Self::Text }
    }
}

/// Install the global subscriber, filtered by `RUST_LOG`.
///
/// Returns `false` when a subscriber was already installed; the existing one
/// is kept.
pub fn init(format: LogFormat) -> bool {
    let builder = fmt().with_env_filter(EnvFilter::from_default_env());
    let result = match format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Text => builder.try_init(),
    };
    if let Err(error) = result {
        tracing::warn!(%error, "tracing init failed");
        return false;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(true, LogFormat::Json)]
    #[case(false, LogFormat::Text)]
    fn format_follows_the_json_flag(#[case] json: bool, #[case] expected: LogFormat) {
        assert_eq!(LogFormat::from(json), expected);
    }

    #[rstest]
    fn second_initialisation_keeps_the_first_subscriber() {
        init(LogFormat::Text);
        assert!(!init(LogFormat::Json));
    }
}
