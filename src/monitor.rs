//! Failover and error-rate detection over a stream of access-log lines
//!
//! [`Monitor`] holds the fixed collaborators (settings, notifier, live config
//! provider). All mutable state for one run lives in a [`MonitorContext`],
//! which the caller owns and passes to every step.

use crate::aggregator::{evaluate_error_rate, ErrorRate, SlidingWindow};
use crate::alerts::{Alert, CooldownGate, Notifier};
use crate::collectors::parse_line;
use crate::config::{Config, ConfigProvider};
use crate::error::{MonitorError, StreamError};
use crate::events::{LogEvent, Timestamp};
use chrono::Utc;
use log::{debug, error, info, warn};

/// The error rate is evaluated on every N-th processed line
pub const ERROR_RATE_CHECK_INTERVAL: u64 = 10;

/// Detection settings fixed for the lifetime of a monitor
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorSettings {
    /// Percent of 5xx responses at which an error-rate alert is raised
    pub error_rate_threshold: f64,
    /// Capacity of the sliding window
    pub window_size: usize,
    /// Minimum time between two alerts of the same category
    pub cooldown: chrono::Duration,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl MonitorSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            error_rate_threshold: config.alerts.error_rate_threshold,
            window_size: config.alerts.window_size,
            cooldown: config.cooldown(),
        }
    }
}

/// Mutable state of one monitor run
#[derive(Debug, Clone)]
pub struct MonitorContext {
    window: SlidingWindow,
    last_pool: Option<String>,
    gate: CooldownGate,
    lines_processed: u64,
}

impl MonitorContext {
    /// Empty window, no known pool, every alert category idle
    pub fn new(settings: &MonitorSettings) -> Self {
        Self {
            window: SlidingWindow::new(settings.window_size),
            last_pool: None,
            gate: CooldownGate::new(settings.cooldown),
            lines_processed: 0,
        }
    }

    pub fn window(&self) -> &SlidingWindow {
        &self.window
    }

    /// Pool seen on the most recent line that carried one
    pub fn last_pool(&self) -> Option<&str> {
        self.last_pool.as_deref()
    }

    pub fn gate(&self) -> &CooldownGate {
        &self.gate
    }

    pub fn lines_processed(&self) -> u64 {
        self.lines_processed
    }
}

/// What happened to a candidate alert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertOutcome {
    /// The notifier accepted the alert
    Dispatched,
    /// The notifier failed; the attempt still starts the cooldown
    DispatchFailed,
    /// Dropped because the category fired too recently
    SuppressedCooldown,
    /// Dropped because maintenance mode is on
    SuppressedMaintenance,
}

/// Decisions taken while processing one line
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineReport {
    /// The parsed line
    pub event: LogEvent,
    /// Set when the line revealed a pool change
    pub failover: Option<AlertOutcome>,
    /// Set when the line triggered a periodic check
    pub error_rate_checked: Option<ErrorRate>,
    /// Set when the periodic check met the threshold
    pub error_rate: Option<AlertOutcome>,
}

/// Orchestrates parsing, windowing, detection, cooldown and notification
pub struct Monitor {
    settings: MonitorSettings,
    notifier: Box<dyn Notifier>,
    provider: Box<dyn ConfigProvider>,
}

impl Monitor {
    /// Create a monitor
    ///
    /// # Arguments
    ///
    /// * `settings` - Threshold, window size and cooldown
    /// * `notifier` - Delivery channel for alerts
    /// * `provider` - Live source of the maintenance-mode flag
    pub fn new(
        settings: MonitorSettings,
        notifier: Box<dyn Notifier>,
        provider: Box<dyn ConfigProvider>,
    ) -> Self {
        Self {
            settings,
            notifier,
            provider,
        }
    }

    pub fn settings(&self) -> &MonitorSettings {
        &self.settings
    }

    /// Fresh context for a run with this monitor's settings
    pub fn new_context(&self) -> MonitorContext {
        MonitorContext::new(&self.settings)
    }

    /// Process lines until the source ends or fails
    ///
    /// A tailing source never ends, so in practice this only returns on a
    /// fatal read error.
    ///
    /// # Errors
    ///
    /// Returns `MonitorError::StreamError` when the source yields an error.
    pub fn run<I>(&self, lines: I) -> Result<(), MonitorError>
    where
        I: IntoIterator<Item = Result<String, StreamError>>,
    {
        let mut context = self.new_context();
        info!(
            "Monitoring started: threshold={}%, window={}, cooldown={}s",
            self.settings.error_rate_threshold,
            self.settings.window_size,
            self.settings.cooldown.num_seconds()
        );

        for line in lines {
            let line = line?;
            self.process_line(&mut context, &line);
        }

        info!(
            "Log stream ended after {} lines",
            context.lines_processed()
        );
        Ok(())
    }

    /// Process one line at the current time
    pub fn process_line(&self, context: &mut MonitorContext, line: &str) -> LineReport {
        self.process_line_at(context, line, Utc::now())
    }

    /// Process one line as if it arrived at `now`
    pub fn process_line_at(
        &self,
        context: &mut MonitorContext,
        line: &str,
        now: Timestamp,
    ) -> LineReport {
        let event = parse_line(line);
        debug!(
            "Parsed pool={:?}, status={:?} from: {}",
            event.pool, event.upstream_status, event.raw
        );

        context.window.append(event.clone());
        context.lines_processed += 1;

        let maintenance = self.provider.maintenance_mode();
        let mut report = LineReport::default();

        if let (Some(pool), Some(previous)) = (event.pool.as_deref(), context.last_pool.as_deref())
        {
            if pool != previous {
                info!("Pool changed: {} -> {}", previous, pool);
                let alert = Alert::failover(previous, pool, &event, now);
                report.failover = Some(self.raise(&mut context.gate, alert, maintenance, now));
            }
        }

        if context.lines_processed % ERROR_RATE_CHECK_INTERVAL == 0 && !context.window.is_empty() {
            if let Some(rate) = evaluate_error_rate(context.window.snapshot()) {
                debug!(
                    "Error rate {:.2}% ({} of {})",
                    rate.rate_percent, rate.errors, rate.total
                );
                report.error_rate_checked = Some(rate);

                let threshold = self.settings.error_rate_threshold;
                if rate.exceeds(threshold) {
                    let alert =
                        Alert::error_rate(&rate, threshold, context.last_pool.as_deref(), now);
                    report.error_rate =
                        Some(self.raise(&mut context.gate, alert, maintenance, now));
                }
            }
        }

        if let Some(pool) = &event.pool {
            context.last_pool = Some(pool.clone());
        }

        report.event = event;
        report
    }

    /// Apply maintenance and cooldown rules, then dispatch
    fn raise(
        &self,
        gate: &mut CooldownGate,
        alert: Alert,
        maintenance: bool,
        now: Timestamp,
    ) -> AlertOutcome {
        if maintenance {
            info!(
                "Maintenance mode ON - suppressing {} alert: {}",
                alert.kind, alert.summary
            );
            return AlertOutcome::SuppressedMaintenance;
        }

        if gate.is_suppressed(alert.kind, now) {
            info!("{} alert suppressed due to cooldown", alert.kind);
            return AlertOutcome::SuppressedCooldown;
        }

        let outcome = match self.notifier.notify(&alert) {
            Ok(()) => AlertOutcome::Dispatched,
            Err(e) => {
                error!("Failed to send {} alert: {}", alert.kind, e);
                warn!("Not retrying; {} cooldown starts anyway", alert.kind);
                AlertOutcome::DispatchFailed
            }
        };

        gate.mark_fired(alert.kind, now);
        outcome
    }
}
