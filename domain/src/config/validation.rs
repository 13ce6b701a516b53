//! Structured configuration issues.
//!
//! Configuration loaders report problems as a list of [`ConfigIssue`]s rather
//! than failing on the first one, so the CLI can print every warning and only
//! refuse to run on errors.
//!
//! # Examples
//!
//! ```
//! use council_domain::{ConfigIssue, ConfigIssueCode, Severity};
//!
//! let issue = ConfigIssue::error(ConfigIssueCode::ZeroRounds, "council.rounds must be at least 1");
//! assert_eq!(issue.severity, Severity::Error);
//! assert!(ConfigIssue::has_errors(&[issue]));
//! ```

/// Severity level of a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Fatal: the configuration cannot work at all.
    Error,
    /// Non-fatal: the configuration works but may not behave as expected.
    Warning,
}

/// Identifies a specific configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigIssueCode {
    /// `council.rounds` is zero.
    ZeroRounds,
    /// `retry.max_attempts` is zero, so no agent call would ever be made.
    ZeroAttempts,
    /// `retry.multiplier` below 1.0 makes delays shrink.
    ShrinkingBackoff,
    /// `retry.initial_delay_ms` exceeds `retry.max_delay_ms`.
    InitialDelayAboveMax,
    /// `output.format` is not a known format.
    UnknownOutputFormat,
    /// A timeout of zero seconds.
    ZeroTimeout,
}

/// A detected issue in the configuration.
#[derive(Debug, Clone)]
pub struct ConfigIssue {
    pub severity: Severity,
    pub code: ConfigIssueCode,
    pub message: String,
}

impl ConfigIssue {
    pub fn error(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
        }
    }

    pub fn warning(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
        }
    }

    pub fn has_errors(issues: &[ConfigIssue]) -> bool {
        issues.iter().any(|i| i.severity == Severity::Error)
    }
}

impl std::fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let level = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{}: {}", level, self.message)
    }
}
