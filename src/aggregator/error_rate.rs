//! Upstream 5xx rate over the sliding window

use crate::events::LogEvent;

/// Result of evaluating the error rate over a window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ErrorRate {
    /// `100 * errors / total`, not rounded
    pub rate_percent: f64,
    /// Number of events in the window, including ones without a usable status
    pub total: usize,
    /// Number of events whose status is in `500..=599`
    pub errors: usize,
}

impl ErrorRate {
    /// Whether the rate meets or exceeds `threshold_percent`
    pub fn exceeds(&self, threshold_percent: f64) -> bool {
        self.rate_percent >= threshold_percent
    }
}

/// Compute the 5xx rate over a window snapshot
///
/// Events with an absent or non-numeric status never count as errors but
/// still count toward the total. Returns `None` for an empty window.
///
/// # Examples
///
/// ```
/// use poolwatch::aggregator::{evaluate_error_rate, SlidingWindow};
/// use poolwatch::collectors::parse_line;
///
/// let mut window = SlidingWindow::new(10);
/// window.append(parse_line("status=200"));
/// window.append(parse_line("status=502"));
///
/// let rate = evaluate_error_rate(window.snapshot()).unwrap();
/// assert_eq!(rate.rate_percent, 50.0);
/// ```
pub fn evaluate_error_rate<'a, I>(events: I) -> Option<ErrorRate>
where
    I: IntoIterator<Item = &'a LogEvent>,
{
    let (total, errors) = events
        .into_iter()
        .fold((0usize, 0usize), |(total, errors), event| {
            (total + 1, errors + usize::from(event.is_server_error()))
        });

    if total == 0 {
        return None;
    }

    Some(ErrorRate {
        rate_percent: errors as f64 / total as f64 * 100.0,
        total,
        errors,
    })
}
