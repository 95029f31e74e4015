//! Turning prayer times and alert preferences into notifications.
//!
//! The [`ScheduleBuilder`] asks the provider for today, tomorrow and the day
//! after (the last one only for the fajr ending tomorrow's night), then runs
//! every [`CategoryStrategy`] over today and tomorrow. Every candidate goes
//! through the same pipeline: window validation, future-only check, sound
//! resolution, id allocation.
//!
//! # Modules
//!
//! - `builder` - The build pipeline
//! - `derived` - Duha and last-third-of-night calculators
//! - `descriptor` - The [`NotificationDescriptor`] output
//! - `ids` - Deterministic id allocation
//! - `strategies` - One strategy per alert category
//! - `strategy` - The [`CategoryStrategy`] trait and its context
//!
//! # Example Usage
//!
//! ```no_run
//! let builder = ScheduleBuilder::new(provider, params, timezone, SoundResolver::new(SoundCatalog::builtin()));
//! let now = Utc::now();
//! let schedule = builder
//!     .build(&location, builder.today(now), now, &settings, &custom_alerts)
//!     .await?;
//! if !schedule.is_complete() {
//!     println!("no prayer times for {:?}", schedule.missing_dates);
//! }
//! ```

mod builder;
pub mod derived;
mod descriptor;
pub mod ids;
pub mod strategies;
mod strategy;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use thiserror::Error;

use crate::prayers::Location;

pub use crate::schedule::builder::{Schedule, ScheduleBuilder};
pub use crate::schedule::descriptor::{AlertKind, Metadata, NotificationDescriptor, SILENT_CHANNEL};
pub use crate::schedule::strategy::{
    AlertTarget, CategoryStrategy, DayContext, SoundSource, Validation,
};

/// Errors of a build.
///
/// The two first variants are preconditions and abort the whole build. The
/// others only drop the category of the day they occurred in.
#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("invalid location {0}")]
    InvalidLocation(Location),
    #[error("no calculation method configured")]
    MissingCalculationMethod,
    #[error("no prayer times for {0}")]
    MissingTimes(NaiveDate),
    #[error("dhuhr {dhuhr} is not after sunrise {sunrise}")]
    InvalidMorning {
        sunrise: DateTime<Utc>,
        dhuhr: DateTime<Utc>,
    },
    #[error("next fajr {next_fajr} is not after maghrib {maghrib}")]
    InvalidNight {
        maghrib: DateTime<Utc>,
        next_fajr: DateTime<Utc>,
    },
    #[error("invalid option {option:?} for {setting}")]
    InvalidOption { setting: String, option: String },
    #[error("local time {0} does not exist")]
    NonexistentLocalTime(NaiveDateTime),
    #[error("offset of {0} minutes is out of range")]
    OffsetOutOfRange(i64),
}
