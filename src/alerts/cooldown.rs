use crate::events::{AlertKind, Timestamp};
use chrono::Duration;
use std::collections::HashMap;

/// Per-category cooldown for alert dispatch
///
/// A category is cooling while less than `cooldown` has elapsed since its last
/// dispatch, and idle otherwise. Categories never block each other.
#[derive(Debug, Clone)]
pub struct CooldownGate {
    /// Minimum time between two dispatches of the same category
    cooldown: Duration,
    /// When each category last fired
    last_fired: HashMap<AlertKind, Timestamp>,
}

impl Default for CooldownGate {
    fn default() -> Self {
        Self::new(Duration::seconds(300)) // Default: 5 minutes
    }
}

impl CooldownGate {
    /// Create a gate with every category idle
    ///
    /// # Arguments
    ///
    /// * `cooldown` - Minimum interval between two alerts of the same category
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last_fired: HashMap::new(),
        }
    }

    /// Check whether an alert of `kind` must be suppressed at `now`
    ///
    /// # Returns
    ///
    /// `true` if the category fired less than `cooldown` before `now`
    pub fn is_suppressed(&self, kind: AlertKind, now: Timestamp) -> bool {
        match self.last_fired.get(&kind) {
            Some(&fired) => now - fired < self.cooldown,
            None => false,
        }
    }

    /// Record that an alert of `kind` was dispatched at `now`
    ///
    /// Callers check [`is_suppressed`](Self::is_suppressed) first; this
    /// records unconditionally.
    pub fn mark_fired(&mut self, kind: AlertKind, now: Timestamp) {
        self.last_fired.insert(kind, now);
    }

    /// When `kind` last fired, if ever
    pub fn last_fired(&self, kind: AlertKind) -> Option<Timestamp> {
        self.last_fired.get(&kind).copied()
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }
}
