//! Settings persistence layer.
//!
//! This module provides the [`SettingsStore`] trait the scheduler snapshots
//! from, and [`JsonSettingsStore`] which keeps the settings as JSON files in
//! the data directory.

use async_trait::async_trait;
use log::{debug, error, info, warn};
use mockall::automock;
use serde::{Serialize, de::DeserializeOwned};
use tokio::fs;

use crate::{
    alerts::{AlertSetting, CustomRelativeAlert, StoreError, default_settings},
    prayers::Location,
    utils::get_path,
};

const SETTINGS_FILE: &str = "settings.json";
const CUSTOM_ALERTS_FILE: &str = "custom_alerts.json";
const LOCATION_FILE: &str = "location.json";

/// Storage of the user alert preferences.
///
/// Loading never fails: a missing or unreadable collection degrades to its
/// default so a rebuild can always run.
#[automock]
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Loads the alert settings.
    async fn load(&self) -> Vec<AlertSetting>;
    /// Persists the alert settings.
    async fn save(&self, settings: &[AlertSetting]) -> Result<(), StoreError>;
    /// Loads the custom relative alerts.
    async fn load_custom(&self) -> Vec<CustomRelativeAlert>;
    /// Loads the persisted location override, if any.
    async fn load_location(&self) -> Option<Location>;
    /// Persists a location override.
    async fn save_location(&self, location: &Location) -> Result<(), StoreError>;
}

/// Handles loading and persisting settings as JSON files.
///
/// # Examples
///
/// ```no_run
/// let store = JsonSettingsStore::new("./muezzin-data".to_string());
///
/// let mut settings = store.load().await;
/// settings[0].enabled = false;
/// store.save(&settings).await?;
/// ```
#[derive(Clone)]
pub struct JsonSettingsStore {
    /// Directory holding the JSON files.
    dir: String,
}

impl JsonSettingsStore {
    /// Creates a new `JsonSettingsStore` over the directory `dir`.
    pub fn new(dir: String) -> Self {
        JsonSettingsStore { dir }
    }

    /// Reads and deserializes `file`, returning `None` if it is missing or corrupted.
    async fn read<T: DeserializeOwned>(&self, file: &str) -> Option<T> {
        let path = get_path(&self.dir, file);
        let Ok(serialized) = fs::read_to_string(&path).await else {
            warn!("no persisted {} found", file);
            return None;
        };

        match serde_json::from_str(&serialized) {
            Ok(value) => {
                debug!("loaded persisted {}", file);
                Some(value)
            }
            Err(e) => {
                error!("failed to deserialize persisted {}: {}", file, e);
                None
            }
        }
    }

    /// Serializes `value` and writes it to `file`.
    async fn write<T: Serialize + ?Sized>(&self, file: &str, value: &T) -> Result<(), StoreError> {
        let serialized = serde_json::to_string_pretty(value)?;
        fs::create_dir_all(&self.dir).await?;
        fs::write(get_path(&self.dir, file), serialized).await?;

        info!("persisted {}", file);
        Ok(())
    }
}

#[async_trait]
impl SettingsStore for JsonSettingsStore {
    /// Loads the settings, falling back to [`default_settings`].
    ///
    /// Every setting is normalized so at most one alert time is selected.
    async fn load(&self) -> Vec<AlertSetting> {
        let Some(mut settings) = self.read::<Vec<AlertSetting>>(SETTINGS_FILE).await else {
            info!("starting with default settings");
            return default_settings();
        };

        settings.iter_mut().for_each(|setting| {
            setting.normalize_alert_times();
        });
        settings
    }

    async fn save(&self, settings: &[AlertSetting]) -> Result<(), StoreError> {
        self.write(SETTINGS_FILE, settings).await
    }

    async fn load_custom(&self) -> Vec<CustomRelativeAlert> {
        self.read(CUSTOM_ALERTS_FILE).await.unwrap_or_default()
    }

    async fn load_location(&self) -> Option<Location> {
        self.read(LOCATION_FILE).await
    }

    async fn save_location(&self, location: &Location) -> Result<(), StoreError> {
        self.write(LOCATION_FILE, location).await
    }
}
