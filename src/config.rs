//! Configuration file structures for muezzin.
//!
//! The configuration is a YAML file. Every value can be overridden with an
//! environment variable prefixed with `MUEZZIN_`, nested keys being separated
//! by `__` (e.g. `MUEZZIN_NOTIFICATIONS__PUSH_URL`).
//!
//! # Configuration File Format
//!
//! ```yaml
//! # Where the prayer times are computed. latitude and longitude may be
//! # omitted when a location is set with `muezzin set-location`.
//! location:
//!   latitude: 21.4225
//!   longitude: 39.8262
//!   timezone: "Asia/Riyadh"
//!
//! # Parameters forwarded to the prayer-times provider
//! calculation:
//!   method: 4
//!   madhab: shafi
//!   high_latitude_rule: middle-of-the-night
//!   adjustments: { fajr: 0, sunrise: 0, dhuhr: 2, asr: 0, maghrib: 3, isha: 0 }
//!
//! # Prayer-times API
//! provider:
//!   url: "https://api.aladhan.com"
//!
//! # Delivery of fired notifications
//! notifications:
//!   enabled: true
//!   push_url: "https://ntfy.sh/my-prayers"
//!   player: ["paplay"]
//!   sounds_dir: "/usr/share/muezzin/sounds"
//!
//! # Seconds between two checks for a day change or a settings change
//! scheduler:
//!   check_interval: 60
//! ```

use chrono_tz::Tz;
use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::Deserialize;

use crate::prayers::{CalculationParameters, Location};

const ENV_PREFIX: &str = "MUEZZIN_";
const DEFAULT_PROVIDER_URL: &str = "https://api.aladhan.com";
const DEFAULT_CHECK_INTERVAL: u64 = 60;
const DEFAULT_SOUNDS_DIR: &str = "sounds";

/// Root configuration structure.
///
/// Only the `location` section is required, every other section has defaults.
///
/// # Examples
///
/// ```no_run
/// let config = Config::load("config.yaml")?;
/// println!("timezone: {}", config.location.timezone);
/// ```
#[derive(Debug, Deserialize)]
pub struct Config {
    pub location: LocationConfig,
    #[serde(default)]
    pub calculation: CalculationParameters,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub notifications: NotificationsConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
}

impl Config {
    /// Loads the YAML file at `path` and applies the `MUEZZIN_` environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, or if the merged values do
    /// not form a valid configuration (missing timezone, unknown madhab, ...).
    pub fn load(path: &str) -> Result<Self, figment::Error> {
        Figment::new()
            .merge(Yaml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
    }
}

/// User location and timezone.
#[derive(Debug, Deserialize)]
pub struct LocationConfig {
    /// Latitude in degrees, positive north
    pub latitude: Option<f64>,
    /// Longitude in degrees, positive east
    pub longitude: Option<f64>,
    /// IANA timezone defining the local days, e.g. `Europe/Paris`.
    pub timezone: Tz,
}

impl LocationConfig {
    /// Configured location, `None` unless both coordinates are set.
    pub fn location(&self) -> Option<Location> {
        match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => Some(Location {
                latitude,
                longitude,
            }),
            _ => None,
        }
    }
}

/// Prayer-times API settings.
#[derive(Debug, Deserialize)]
pub struct ProviderConfig {
    /// Base url of the Aladhan compatible API
    pub url: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        ProviderConfig {
            url: DEFAULT_PROVIDER_URL.to_string(),
        }
    }
}

/// Delivery of fired notifications.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct NotificationsConfig {
    /// Master switch, notifications are not scheduled when `false`
    pub enabled: bool,
    /// ntfy compatible topic url fired notifications are posted to
    pub push_url: Option<String>,
    /// Command playing a sound file, the file path is appended as last argument.
    ///
    /// Empty disables playback.
    pub player: Vec<String>,
    /// Directory holding the catalog sound files
    pub sounds_dir: String,
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        NotificationsConfig {
            enabled: true,
            push_url: None,
            player: vec![],
            sounds_dir: DEFAULT_SOUNDS_DIR.to_string(),
        }
    }
}

/// Daemon loop settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Seconds between two evaluations of the scheduler state
    pub check_interval: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        SchedulerConfig {
            check_interval: DEFAULT_CHECK_INTERVAL,
        }
    }
}
