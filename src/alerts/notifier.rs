use crate::alerts::Alert;
use crate::error::AlertError;

/// Delivery channel for operator alerts
///
/// Implementations perform a single bounded attempt. The monitor treats any
/// `Err` as a failed dispatch and never retries.
#[cfg_attr(test, mockall::automock)]
pub trait Notifier {
    /// Deliver the alert's summary and labeled fields
    fn notify(&self, alert: &Alert) -> Result<(), AlertError>;
}
