//! Alert preferences and their persistence.
//!
//! This module holds everything the user configures. The scheduler only
//! reads it, through a snapshot taken at the start of each rebuild.
//!
//! - [`AlertSetting`]: Preferences of one alert category
//! - [`CustomRelativeAlert`]: A user-authored alert relative to a prayer
//! - [`SettingsStore`]: Load/save contract, implemented by [`JsonSettingsStore`]
//!
//! # Example Usage
//!
//! ```no_run
//! let store = JsonSettingsStore::new("./muezzin-data".to_string());
//!
//! let mut settings = store.load().await;
//! if let Some(duha) = settings.iter_mut().find(|s| s.id == "duha") {
//!     duha.enabled = true;
//!     duha.select_alert_time("quarter-day");
//! }
//! store.save(&settings).await?;
//! ```

mod alert_setting;
mod custom_alert;
mod defaults;
mod settings_store;

use thiserror::Error;

pub use crate::alerts::alert_setting::{
    AlertSetting, AlertTime, DEFAULT_SOUND, NO_SOUND, Recurrence,
};
pub use crate::alerts::custom_alert::CustomRelativeAlert;
pub use crate::alerts::defaults::{
    DUHA, EVENING_ATHKAR, LAST_THIRD, MORNING_ATHKAR, QUARTER_DAY, default_settings,
};
#[cfg(test)]
pub use crate::alerts::settings_store::MockSettingsStore;
pub use crate::alerts::settings_store::{JsonSettingsStore, SettingsStore};

/// Errors returned when persisting settings.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to serialize settings: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("failed to write settings: {0}")]
    Io(#[from] std::io::Error),
}
