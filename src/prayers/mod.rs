//! Prayer times: data structures and the provider boundary.
//!
//! The scheduler never computes astronomical angles itself. It asks a
//! [`PrayerEventProvider`] for the six instants of a date and works from those.
//!
//! # Modules
//!
//! - `provider` - The provider trait and its HTTP implementation
//! - `response_structs` - Internal data structures for API responses
//! - `structs` - Prayers, prayer times, location and calculation parameters

mod provider;
mod response_structs;
mod structs;

use chrono::NaiveDate;
use thiserror::Error;

#[cfg(test)]
pub use crate::prayers::provider::MockPrayerEventProvider;
pub use crate::prayers::provider::{AladhanProvider, PrayerEventProvider};
pub use crate::prayers::structs::{
    CalculationParameters, HighLatitudeRule, Location, Madhab, Prayer, PrayerAdjustments,
    PrayerTimes,
};

/// Errors returned by a [`PrayerEventProvider`].
#[derive(Debug, Error)]
pub enum ProviderError {
    /// No calculation method was configured.
    #[error("no calculation method configured")]
    MissingMethod,
    /// The HTTP request failed or returned an error status.
    #[error("prayer times request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// The API answered with a non-success code in the body.
    #[error("prayer times api returned code {0}")]
    Api(u16),
    /// A timing could not be parsed.
    #[error("invalid {name} timing {value:?}")]
    InvalidTiming { name: &'static str, value: String },
    /// The timings are not in day order.
    #[error("prayer times of {0} are not in day order")]
    Unordered(NaiveDate),
}
