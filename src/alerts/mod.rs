/// Alert formatting, cooldown, and delivery
pub mod alert;
pub mod cooldown;
pub mod notifier;
pub mod webhook;

pub use alert::{Alert, AlertField};
pub use cooldown::CooldownGate;
pub use notifier::Notifier;
pub use webhook::WebhookNotifier;

#[cfg(test)]
pub use notifier::MockNotifier;
