//! Delivery side of the scheduler.
//!
//! The rescheduler only talks to the [`NotificationDispatcher`] and
//! [`PermissionGate`] traits. This module also holds their in-process
//! implementations and the push notifier fired notifications are sent through.
//!
//! # Modules
//!
//! - `dispatcher` - The dispatcher trait and the [`TimerDispatcher`] running one timer per notification
//! - `notifier` - [`PushNotifier`], posting fired notifications to an ntfy compatible server
//! - `permission` - The permission trait and [`ConfigPermissionGate`]

mod dispatcher;
mod notifier;
mod permission;

use thiserror::Error;

#[cfg(test)]
pub use crate::dispatch::dispatcher::MockNotificationDispatcher;
pub use crate::dispatch::dispatcher::{NotificationDispatcher, TimerDispatcher};
pub use crate::dispatch::notifier::PushNotifier;
#[cfg(test)]
pub use crate::dispatch::permission::MockPermissionGate;
pub use crate::dispatch::permission::{ConfigPermissionGate, PermissionGate};

/// Errors returned while handing notifications over or delivering them.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The dispatcher no longer accepts notifications.
    #[error("dispatcher is shut down")]
    Closed,
    /// The push request could not be sent.
    #[error("push request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// The push server answered with an error status.
    #[error("push server returned status {0}")]
    Status(u16),
}
