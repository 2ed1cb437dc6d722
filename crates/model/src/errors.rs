//! Domain error and severity types.
//!
//! [`DomainError`] is the only error shape callers of the bridge observe for a
//! classified failure. It is produced either from a taxonomy entry (transport
//! faults), a decoded legacy token, or a failed response envelope.
//!
//! [`Severity`] is a diagnostic concern: it decides at which level a failure is
//! logged, never what is returned.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info, warn};

// ---------------------------------------------------------------------------
// Severity
// ---------------------------------------------------------------------------

/// Lowest numeric code (inclusive) that is routed to alerting.
pub const ALERT_CODE_MIN: i64 = 2000;

/// Highest numeric code (inclusive) that is routed to alerting.
pub const ALERT_CODE_MAX: i64 = 3000;

/// Log routing band for a failure code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Expected business failure; logged at `warn`.
    Warn,
    /// Failure that must page someone; logged at `error`.
    Alert,
}

/// Tags a failure code with its [`Severity`].
///
/// Numeric codes in `[2000, 3000]` are [`Severity::Alert`], every other numeric
/// code is [`Severity::Warn`]. Absent, empty, or non-numeric codes are untagged.
pub fn severity_of(code: Option<&str>) -> Option<Severity> {
    let value: i64 = code?.trim().parse().ok()?;
    if (ALERT_CODE_MIN..=ALERT_CODE_MAX).contains(&value) {
        Some(Severity::Alert)
    } else {
        Some(Severity::Warn)
    }
}

// ---------------------------------------------------------------------------
// Envelope failure
// ---------------------------------------------------------------------------

/// Failure reported by a response envelope (`success == false`).
///
/// Both fields are optional because legacy services are not consistent about
/// filling them in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureInfo {
    pub code: Option<String>,
    pub description: Option<String>,
}

impl FailureInfo {
    pub fn new(code: Option<String>, description: Option<String>) -> Self {
        Self { code, description }
    }

    /// Returns the severity tag of this failure's code.
    pub fn severity(&self) -> Option<Severity> {
        severity_of(self.code.as_deref())
    }
}

// ---------------------------------------------------------------------------
// Domain error
// ---------------------------------------------------------------------------

/// A normalised, typed failure delivered to callers in place of a raw fault.
///
/// Immutable once constructed: fields are public for reading and pattern
/// matching, but there are no mutating methods.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("[{code}] {description}")]
pub struct DomainError {
    /// Stable error code (taxonomy code, remote envelope code, or legacy token code).
    pub code: String,
    /// Human-readable description.
    pub description: String,
    /// Log routing band derived from `code`; `None` when the code is not numeric.
    pub severity: Option<Severity>,
}

impl DomainError {
    /// Creates a [`DomainError`], deriving its severity from `code`.
    pub fn new(code: impl Into<String>, description: impl Into<String>) -> Self {
        let code = code.into();
        let severity = severity_of(Some(&code));
        Self {
            code,
            description: description.into(),
            severity,
        }
    }

    /// Emits one diagnostic event for this error, at the level its severity
    /// selects. `cause` is the raw fault the error was classified from, if any.
    pub fn emit_diagnostic(&self, context: &str, cause: Option<&dyn fmt::Display>) {
        let cause = cause.map(tracing::field::display);
        match self.severity {
            Some(Severity::Alert) => error!(
                code = %self.code,
                description = %self.description,
                cause,
                "{context}"
            ),
            Some(Severity::Warn) => warn!(
                code = %self.code,
                description = %self.description,
                cause,
                "{context}"
            ),
            None => info!(
                code = %self.code,
                description = %self.description,
                cause,
                "{context}"
            ),
        }
    }
}

impl From<FailureInfo> for DomainError {
    fn from(failure: FailureInfo) -> Self {
        let severity = failure.severity();
        Self {
            code: failure.code.unwrap_or_default(),
            description: failure.description.unwrap_or_default(),
            severity,
        }
    }
}
