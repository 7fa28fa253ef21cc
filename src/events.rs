//! Core event types for the pool watcher
//!
//! This module defines the structured record extracted from each access-log
//! line and the closed set of alert categories the monitor can raise.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Timestamp type for consistent time handling across the application
pub type Timestamp = DateTime<Utc>;

/// Structured view of a single access-log line
///
/// Every recognised field is optional: a field that does not appear in the
/// line is `None`, never an empty string.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogEvent {
    /// Active upstream pool (e.g. `blue`, `green`)
    pub pool: Option<String>,
    /// Release identifier reported by the upstream
    pub release: Option<String>,
    /// Upstream status code, taken from `upstream_status` or `status`
    pub upstream_status: Option<String>,
    /// Address of the upstream that served the request
    pub upstream_addr: Option<String>,
    /// Total request time as logged
    pub request_time: Option<String>,
    /// Upstream response time as logged
    pub upstream_response_time: Option<String>,
    /// The original line, trimmed
    pub raw: String,
}

impl LogEvent {
    /// Numeric status code, if the status is a plain run of ASCII digits
    pub fn status_code(&self) -> Option<u16> {
        let status = self.upstream_status.as_deref()?;
        if status.is_empty() || !status.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        status.parse().ok()
    }

    /// Whether the upstream answered with a 5xx status
    pub fn is_server_error(&self) -> bool {
        matches!(self.status_code(), Some(500..=599))
    }
}

/// Category of operator alert
///
/// Each category has its own independent cooldown.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    /// The active pool changed between two consecutive observations
    Failover,
    /// The rolling upstream 5xx rate crossed the configured threshold
    ErrorRate,
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlertKind::Failover => write!(f, "failover"),
            AlertKind::ErrorRate => write!(f, "error_rate"),
        }
    }
}
