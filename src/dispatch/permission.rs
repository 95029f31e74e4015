//! Permission to deliver notifications.

use async_trait::async_trait;
use log::warn;
use mockall::automock;

/// Answers whether notifications may be delivered.
///
/// The rescheduler checks first and requests only when the check fails.
#[automock]
#[async_trait]
pub trait PermissionGate: Send + Sync {
    async fn check(&self) -> bool;

    /// Asks for the permission, returns whether it is granted afterwards.
    async fn request(&self) -> bool;
}

/// Permission derived from the `notifications.enabled` configuration flag.
///
/// There is nobody to ask at runtime: a request is answered with the
/// configured value.
pub struct ConfigPermissionGate {
    enabled: bool,
}

impl ConfigPermissionGate {
    pub fn new(enabled: bool) -> Self {
        ConfigPermissionGate { enabled }
    }
}

#[async_trait]
impl PermissionGate for ConfigPermissionGate {
    async fn check(&self) -> bool {
        self.enabled
    }

    async fn request(&self) -> bool {
        if !self.enabled {
            warn!("notifications are disabled in the configuration");
        }
        self.enabled
    }
}
