//! When to rebuild: a pure state transition over what the last build saw.

use std::fmt;

use chrono::NaiveDate;
use log::error;

use crate::{
    alerts::{AlertSetting, CustomRelativeAlert},
    prayers::Location,
    schedule::ids::fnv1a,
};

/// Reason of a rebuild.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Trigger {
    /// First evaluation since the process started
    Startup,
    /// The local date changed since the last build
    DayBoundary,
    /// Settings, custom alerts or location changed since the last build
    SettingsChanged,
    /// The last build failed or missed prayer times
    Retry,
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Trigger::Startup => "startup",
            Trigger::DayBoundary => "day boundary",
            Trigger::SettingsChanged => "settings changed",
            Trigger::Retry => "retry",
        };
        write!(f, "{}", name)
    }
}

/// What the last triggered build was made from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SchedulerState {
    pub last_build_date: Option<NaiveDate>,
    pub last_fingerprint: Option<u32>,
    /// The build of the last trigger did not complete
    pub retry: bool,
}

impl SchedulerState {
    /// Compares the current date and snapshot fingerprint with the last build.
    ///
    /// Returns the state to keep and the trigger of the rebuild to run, if any.
    /// A day boundary wins over a settings change happening at the same time,
    /// and both win over a retry.
    pub fn evaluate(&self, today: NaiveDate, fingerprint: u32) -> (SchedulerState, Option<Trigger>) {
        let next = SchedulerState {
            last_build_date: Some(today),
            last_fingerprint: Some(fingerprint),
            retry: false,
        };

        let trigger = match self.last_build_date {
            None => Some(Trigger::Startup),
            Some(date) if date != today => Some(Trigger::DayBoundary),
            Some(_) if self.last_fingerprint != Some(fingerprint) => Some(Trigger::SettingsChanged),
            Some(_) if self.retry => Some(Trigger::Retry),
            Some(_) => None,
        };

        (next, trigger)
    }

    /// Marks the last triggered build as incomplete, the next evaluation retries it.
    pub fn build_failed(self) -> SchedulerState {
        SchedulerState {
            retry: true,
            ..self
        }
    }
}

/// FNV-1a hash of the JSON form of a snapshot.
pub fn fingerprint(
    settings: &[AlertSetting],
    custom_alerts: &[CustomRelativeAlert],
    location: Option<&Location>,
) -> u32 {
    match serde_json::to_vec(&(settings, custom_alerts, location)) {
        Ok(bytes) => fnv1a(&bytes),
        Err(e) => {
            error!("failed to fingerprint settings: {}", e);
            0
        }
    }
}
