/// Fixed-capacity rolling buffer of log events
pub mod sliding_window;

/// Error-rate evaluation over the window
pub mod error_rate;

pub use error_rate::{evaluate_error_rate, ErrorRate};
pub use sliding_window::SlidingWindow;
