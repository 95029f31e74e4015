//! The per-category building block of the scheduler.
//!
//! Every alert category implements [`CategoryStrategy`]. The builder asks a
//! strategy for its [`AlertTarget`]s of a day, then for a candidate instant of
//! each target, then for the validation of that candidate. The steps after
//! validation (future-only check, sound, id, descriptor) are common to all
//! categories and live in the builder.

use chrono::{DateTime, Days, NaiveDate, Utc};
use chrono_tz::Tz;

use crate::{
    alerts::{AlertSetting, CustomRelativeAlert},
    prayers::{Prayer, PrayerTimes},
    schedule::{AlertKind, ScheduleError, derived::shift_minutes, ids::IdBand},
    sounds::SoundType,
    utils::parse_signed_minutes,
};

/// Everything a strategy may read while building one day.
pub struct DayContext<'a> {
    /// 0 for today, 1 for tomorrow
    pub day_offset: u32,
    /// Local date being built
    pub date: NaiveDate,
    /// Instant the build started at
    pub now: DateTime<Utc>,
    pub timezone: Tz,
    /// Prayer times of `date`, `None` if the provider failed
    pub times: Option<&'a PrayerTimes>,
    /// Prayer times of the day after `date`
    pub next_times: Option<&'a PrayerTimes>,
    pub settings: &'a [AlertSetting],
    pub custom_alerts: &'a [CustomRelativeAlert],
}

impl<'a> DayContext<'a> {
    pub fn times(&self) -> Result<&'a PrayerTimes, ScheduleError> {
        self.times.ok_or(ScheduleError::MissingTimes(self.date))
    }

    pub fn next_times(&self) -> Result<&'a PrayerTimes, ScheduleError> {
        self.next_times.ok_or_else(|| {
            ScheduleError::MissingTimes(self.date + Days::new(1))
        })
    }

    /// Returns the setting `id` if it exists and is enabled.
    pub fn enabled_setting(&self, id: &str) -> Option<&'a AlertSetting> {
        self.settings
            .iter()
            .find(|setting| setting.id == id && setting.enabled)
    }
}

/// Where the sound of a target comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SoundSource {
    /// A preference of an alert setting
    Setting {
        setting_id: String,
        sound_type: SoundType,
    },
    /// The explicit sound of a custom alert, falling back on its base prayer
    Custom {
        sound_id: String,
        base_setting_id: String,
    },
}

/// One notification slot a strategy wants to fill for a day.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AlertTarget {
    /// Key the id is derived from, unique within the band
    pub key: String,
    pub band: IdBand,
    pub kind: AlertKind,
    /// Setting or custom alert the target comes from
    pub name: String,
    pub title: String,
    pub body: String,
    pub sound: SoundSource,
    /// Event the target is anchored on, if any
    pub anchor: Option<Prayer>,
    /// Signed minute offset from the anchor
    pub offset_minutes: i64,
    /// Selected alert time option of the setting
    pub option: Option<String>,
}

impl AlertTarget {
    /// Anchor time of the target's day plus its offset.
    pub fn anchored_candidate(&self, ctx: &DayContext) -> Result<Option<DateTime<Utc>>, ScheduleError> {
        let Some(anchor) = self.anchor else {
            return Ok(None);
        };
        let time = ctx.times()?.get(anchor);
        shift_minutes(time, self.offset_minutes).map(Some)
    }

    /// Signed minute offset of the selected option, `0` when none is selected.
    pub fn option_minutes(&self) -> Result<i64, ScheduleError> {
        match self.option.as_deref() {
            None => Ok(0),
            Some(option) => {
                parse_signed_minutes(option).ok_or_else(|| ScheduleError::InvalidOption {
                    setting: self.name.clone(),
                    option: option.to_string(),
                })
            }
        }
    }
}

/// Outcome of validating a candidate instant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Validation {
    /// The candidate is scheduled as is
    Accepted(DateTime<Utc>),
    /// The candidate was outside its window and replaced by a documented default
    Clamped {
        candidate: DateTime<Utc>,
        clamped: DateTime<Utc>,
    },
    /// The candidate is not scheduled
    Dropped(String),
}

/// Alert category computing candidate instants from a [`DayContext`].
pub trait CategoryStrategy: Send + Sync {
    /// Category name, used in logs.
    fn category(&self) -> &'static str;

    /// Slots of the day. Disabled settings produce no target.
    fn targets(&self, ctx: &DayContext) -> Vec<AlertTarget>;

    /// Raw instant of a target, `None` when the target has nothing to schedule.
    fn compute_candidate(
        &self,
        target: &AlertTarget,
        ctx: &DayContext,
    ) -> Result<Option<DateTime<Utc>>, ScheduleError>;

    /// Checks the candidate against the category's validity window.
    ///
    /// Categories without window accept every candidate.
    fn validate(
        &self,
        _target: &AlertTarget,
        candidate: DateTime<Utc>,
        _ctx: &DayContext,
    ) -> Result<Validation, ScheduleError> {
        Ok(Validation::Accepted(candidate))
    }
}
