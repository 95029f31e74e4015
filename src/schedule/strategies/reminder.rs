//! Periodic reminders at a fixed local clock time.

use chrono::{DateTime, TimeZone, Utc};

use crate::{
    schedule::{
        AlertKind, CategoryStrategy, DayContext, ScheduleError,
        ids::IdBand,
        strategy::{AlertTarget, SoundSource},
    },
    sounds::SoundType,
    utils::parse_clock_time,
};

/// Reminders whose recurrence matches the day being built.
///
/// They do not depend on the prayer times, so a provider failure for the day
/// leaves them untouched.
pub struct ReminderStrategy;

impl CategoryStrategy for ReminderStrategy {
    fn category(&self) -> &'static str {
        "reminder"
    }

    fn targets(&self, ctx: &DayContext) -> Vec<AlertTarget> {
        ctx.settings
            .iter()
            .filter(|setting| setting.enabled)
            .filter(|setting| {
                setting
                    .recurrence
                    .as_ref()
                    .is_some_and(|recurrence| recurrence.matches(ctx.date))
            })
            .map(|setting| AlertTarget {
                key: setting.id.clone(),
                band: IdBand::Reminder,
                kind: AlertKind::Reminder,
                name: setting.id.clone(),
                title: setting.name_label.clone(),
                body: format!("Reminder: {}", setting.name_label),
                sound: SoundSource::Setting {
                    setting_id: setting.id.clone(),
                    sound_type: SoundType::Main,
                },
                anchor: None,
                offset_minutes: 0,
                option: setting.selected_alert_time().map(|time| time.id.clone()),
            })
            .collect()
    }

    /// Converts the local clock time of the day to UTC.
    ///
    /// A time skipped by a DST transition is an error, a repeated one maps to
    /// its earlier instant.
    fn compute_candidate(
        &self,
        target: &AlertTarget,
        ctx: &DayContext,
    ) -> Result<Option<DateTime<Utc>>, ScheduleError> {
        let Some(option) = target.option.as_deref() else {
            return Ok(None);
        };
        let time = parse_clock_time(option).ok_or_else(|| ScheduleError::InvalidOption {
            setting: target.name.clone(),
            option: option.to_string(),
        })?;

        let local = ctx.date.and_time(time);
        let instant = ctx
            .timezone
            .from_local_datetime(&local)
            .earliest()
            .ok_or(ScheduleError::NonexistentLocalTime(local))?;

        Ok(Some(instant.with_timezone(&Utc)))
    }
}
