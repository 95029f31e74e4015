//! User alert preferences.
//!
//! This module provides the [`AlertSetting`] struct, one per alert category
//! (a prayer, the athkar, duha, the last third of the night or a periodic
//! reminder), and the [`AlertTime`] options it selects from.

use chrono::{Datelike, NaiveDate, Weekday};
use log::warn;
use serde::{Deserialize, Serialize};

/// Sound id meaning "use the setting's general sound".
pub const DEFAULT_SOUND: &str = "default";
/// Sound id meaning "explicitly silent".
pub const NO_SOUND: &str = "none";

fn default_sound() -> String {
    DEFAULT_SOUND.to_string()
}

fn default_iqama_offset() -> u32 {
    10
}

/// One selectable timing option of an [`AlertSetting`].
///
/// The meaning of `id` depends on the category: a signed minute offset
/// (`"+40"`), a duha policy (`"quarter-day"`) or a clock time (`"09:00"`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertTime {
    pub id: String,
    pub enabled: bool,
}

impl AlertTime {
    /// Creates a disabled option.
    pub fn new(id: &str) -> Self {
        AlertTime {
            id: id.to_string(),
            enabled: false,
        }
    }
}

/// Day condition of a periodic reminder.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Recurrence {
    /// Fires on the listed days of the week
    Weekly { days: Vec<Weekday> },
    /// Fires on the listed days of the month
    Monthly { days: Vec<u32> },
}

impl Recurrence {
    /// Whether the reminder fires on `date`.
    pub fn matches(&self, date: NaiveDate) -> bool {
        match self {
            Recurrence::Weekly { days } => days.contains(&date.weekday()),
            Recurrence::Monthly { days } => days.contains(&date.day()),
        }
    }
}

/// Alert preferences of one category.
///
/// Owned and mutated by user actions, read-only to the scheduler.
///
/// # Invariant
///
/// At most one entry of `alert_times` is enabled. Use [`AlertSetting::select_alert_time`]
/// to change the selection.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertSetting {
    /// Category key, e.g. `"fajr"`, `"morning-athkar"`, `"duha"`
    pub id: String,
    /// Whether the category produces alerts at all
    pub enabled: bool,
    /// Display name used in notification titles
    pub name_label: String,
    /// Selectable timing options
    #[serde(default)]
    pub alert_times: Vec<AlertTime>,
    /// General sound of the category
    #[serde(default = "default_sound")]
    pub selected_sound: String,
    /// Whether the category has an iqama at all
    #[serde(default)]
    pub has_iqama: bool,
    #[serde(default)]
    pub iqama_enabled: bool,
    /// Minutes between the prayer and its iqama
    #[serde(default = "default_iqama_offset")]
    pub iqama_offset_minutes: u32,
    #[serde(default = "default_sound")]
    pub iqama_sound: String,
    #[serde(default)]
    pub pre_alert_enabled: bool,
    /// Minutes before the prayer for the pre-alert
    #[serde(default)]
    pub pre_alert_minutes: u32,
    #[serde(default = "default_sound")]
    pub pre_alert_sound: String,
    /// Day condition, only set on periodic reminders
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<Recurrence>,
}

impl AlertSetting {
    /// Creates an enabled setting with default sounds and no options.
    pub fn new(id: &str, name_label: &str) -> Self {
        AlertSetting {
            id: id.to_string(),
            enabled: true,
            name_label: name_label.to_string(),
            alert_times: vec![],
            selected_sound: default_sound(),
            has_iqama: false,
            iqama_enabled: false,
            iqama_offset_minutes: default_iqama_offset(),
            iqama_sound: default_sound(),
            pre_alert_enabled: false,
            pre_alert_minutes: 0,
            pre_alert_sound: default_sound(),
            recurrence: None,
        }
    }

    /// Returns the enabled timing option, if any.
    pub fn selected_alert_time(&self) -> Option<&AlertTime> {
        self.alert_times.iter().find(|time| time.enabled)
    }

    /// Enables the option `id` and disables all its siblings.
    ///
    /// Returns `false` and leaves the options untouched if `id` is unknown.
    pub fn select_alert_time(&mut self, id: &str) -> bool {
        if !self.alert_times.iter().any(|time| time.id == id) {
            return false;
        }

        self.alert_times
            .iter_mut()
            .for_each(|time| time.enabled = time.id == id);
        true
    }

    /// Enables or disables the option `id`.
    ///
    /// Enabling goes through [`AlertSetting::select_alert_time`], disabling only
    /// touches `id`.
    pub fn set_alert_time_enabled(&mut self, id: &str, enabled: bool) -> bool {
        if enabled {
            return self.select_alert_time(id);
        }

        match self.alert_times.iter_mut().find(|time| time.id == id) {
            Some(time) => {
                time.enabled = false;
                true
            }
            None => false,
        }
    }

    /// Repairs options violating the single-selection invariant.
    ///
    /// Keeps the first enabled option. Returns `true` if something changed.
    pub fn normalize_alert_times(&mut self) -> bool {
        let Some(first) = self.selected_alert_time().map(|time| time.id.clone()) else {
            return false;
        };

        let enabled_count = self.alert_times.iter().filter(|time| time.enabled).count();
        if enabled_count <= 1 {
            return false;
        }

        warn!(
            "setting {} had {} selected alert times, keeping {}",
            self.id, enabled_count, first
        );
        self.select_alert_time(&first)
    }
}
