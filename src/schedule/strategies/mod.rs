//! One [`CategoryStrategy`] per alert category.
//!
//! The builder runs the strategies of [`default_strategies`] in order. Adding a
//! category means adding a strategy to that list, the builder does not change.

mod athkar;
mod custom;
mod duha;
mod last_third;
mod prayer;
mod reminder;

pub use crate::schedule::strategies::athkar::AthkarStrategy;
pub use crate::schedule::strategies::custom::CustomAlertStrategy;
pub use crate::schedule::strategies::duha::DuhaStrategy;
pub use crate::schedule::strategies::last_third::LastThirdStrategy;
pub use crate::schedule::strategies::prayer::{IqamaStrategy, MainPrayerStrategy, PreAlertStrategy};
pub use crate::schedule::strategies::reminder::ReminderStrategy;

use crate::schedule::CategoryStrategy;

/// Returns every category, in the order descriptors are emitted.
pub fn default_strategies() -> Vec<Box<dyn CategoryStrategy>> {
    vec![
        Box::new(MainPrayerStrategy),
        Box::new(PreAlertStrategy),
        Box::new(IqamaStrategy),
        Box::new(AthkarStrategy),
        Box::new(DuhaStrategy),
        Box::new(LastThirdStrategy),
        Box::new(ReminderStrategy),
        Box::new(CustomAlertStrategy),
    ]
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::{
        alerts::{AlertSetting, CustomRelativeAlert},
        prayers::PrayerTimes,
        schedule::DayContext,
    };
    use chrono::{DateTime, NaiveDate, TimeZone, Utc};

    /// Instant of March 2024, in UTC.
    pub(crate) fn at(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, day, hour, minute, 0).unwrap()
    }

    fn times_of(day: u32) -> PrayerTimes {
        PrayerTimes {
            date: NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
            fajr: at(day, 5, 0),
            sunrise: at(day, 6, 0),
            dhuhr: at(day, 12, 0),
            asr: at(day, 15, 0),
            maghrib: at(day, 18, 0),
            isha: at(day, 19, 30),
        }
    }

    /// Prayer times of 2024-03-11.
    pub(crate) fn create_test_times() -> PrayerTimes {
        times_of(11)
    }

    /// Prayer times of 2024-03-12.
    pub(crate) fn create_next_times() -> PrayerTimes {
        times_of(12)
    }

    /// Context of `times`' day built at midnight UTC, without next-day times.
    pub(crate) fn context<'a>(
        times: &'a PrayerTimes,
        settings: &'a [AlertSetting],
        custom_alerts: &'a [CustomRelativeAlert],
    ) -> DayContext<'a> {
        DayContext {
            day_offset: 0,
            date: times.date,
            now: at(11, 0, 0),
            timezone: chrono_tz::UTC,
            times: Some(times),
            next_times: None,
            settings,
            custom_alerts,
        }
    }

    #[test]
    fn test_categories_are_unique() {
        let strategies = default_strategies();
        let mut categories: Vec<&str> = strategies.iter().map(|s| s.category()).collect();
        categories.sort();
        categories.dedup();
        assert_eq!(categories.len(), strategies.len());
    }
}
