//! Scheduler output.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of alert a notification was built for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AlertKind {
    Prayer,
    PreAlert,
    Iqama,
    Athkar,
    Duha,
    LastThird,
    Reminder,
    Custom,
}

impl AlertKind {
    /// Delivery channel of notifications carrying a sound.
    pub fn channel(&self) -> &'static str {
        match self {
            AlertKind::Prayer => "prayer",
            AlertKind::PreAlert => "pre-alert",
            AlertKind::Iqama => "iqama",
            AlertKind::Athkar => "athkar",
            AlertKind::Duha => "duha",
            AlertKind::LastThird => "last-third",
            AlertKind::Reminder => "reminder",
            AlertKind::Custom => "custom",
        }
    }
}

/// Channel of notifications without sound, whatever their kind.
pub const SILENT_CHANNEL: &str = "silent";

/// Identification of the alert a notification comes from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(rename = "type")]
    pub kind: AlertKind,
    /// Setting or custom alert key, e.g. `"fajr"`
    pub name: String,
}

/// A concrete notification to deliver at `scheduled_at`.
///
/// Created fresh on every build and never persisted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationDescriptor {
    /// Deterministic id, also used as cancellation key
    pub id: i32,
    pub scheduled_at: DateTime<Utc>,
    pub title: String,
    pub body: String,
    /// Sound file name in the sounds directory, `None` for silence
    pub sound_file: Option<String>,
    pub channel: Option<String>,
    pub metadata: Metadata,
}

impl fmt::Display for NotificationDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "id={}, at={}, type={}, name={}, sound={}",
            self.id,
            self.scheduled_at,
            self.metadata.kind.channel(),
            self.metadata.name,
            self.sound_file.as_deref().unwrap_or("none")
        )
    }
}
