use crate::aggregator::ErrorRate;
use crate::events::{AlertKind, LogEvent, Timestamp};
use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};

/// One labeled value attached to an alert
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AlertField {
    pub title: String,
    pub value: String,
    /// Display hint: render side by side with other short fields
    pub short: bool,
}

impl AlertField {
    fn short(title: &str, value: impl Into<String>) -> Self {
        Self {
            title: title.to_string(),
            value: value.into(),
            short: true,
        }
    }
}

/// A fully formatted operator alert, ready for a [`Notifier`](super::Notifier)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Alert {
    pub kind: AlertKind,
    /// Short plain-text label for clients that cannot render fields
    pub title: String,
    /// Human-readable one-line summary
    pub summary: String,
    pub fields: Vec<AlertField>,
}

fn or_unknown(value: Option<&str>) -> String {
    value.unwrap_or("unknown").to_string()
}

fn format_time(now: Timestamp) -> String {
    now.to_rfc3339_opts(SecondsFormat::Micros, true)
}

impl Alert {
    /// Build the alert for a pool transition `from -> to`
    ///
    /// Release and upstream address come from the event that revealed the new
    /// pool.
    pub fn failover(from: &str, to: &str, event: &LogEvent, now: Timestamp) -> Self {
        Self {
            kind: AlertKind::Failover,
            title: "Failover Detected".to_string(),
            summary: format!(
                ":rotating_light: *Failover detected*: pool changed from *{}* → *{}*",
                from, to
            ),
            fields: vec![
                AlertField::short("From", from),
                AlertField::short("To", to),
                AlertField::short("Recent Release", or_unknown(event.release.as_deref())),
                AlertField::short("Upstream", or_unknown(event.upstream_addr.as_deref())),
                AlertField::short("Time", format_time(now)),
            ],
        }
    }

    /// Build the alert for an error rate at or above `threshold_percent`
    pub fn error_rate(
        rate: &ErrorRate,
        threshold_percent: f64,
        last_pool: Option<&str>,
        now: Timestamp,
    ) -> Self {
        Self {
            kind: AlertKind::ErrorRate,
            title: "High error rate".to_string(),
            summary: format!(
                ":warning: *High upstream 5xx rate*: {:.2}% 5xx over last {} requests ({} errors). Threshold: {:?}%",
                rate.rate_percent, rate.total, rate.errors, threshold_percent
            ),
            fields: vec![
                AlertField::short("Window", rate.total.to_string()),
                AlertField::short("Errors", rate.errors.to_string()),
                AlertField::short("Threshold (%)", format!("{:?}", threshold_percent)),
                AlertField::short("Last Pool", or_unknown(last_pool)),
                AlertField::short("Time", format_time(now)),
            ],
        }
    }

    /// Look up a field value by title
    pub fn field(&self, title: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|field| field.title == title)
            .map(|field| field.value.as_str())
    }
}
