//! The build pipeline shared by every alert category.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Days, NaiveDate, Utc};
use chrono_tz::Tz;
use futures::future::join_all;
use log::{debug, info, warn};

use crate::{
    alerts::{AlertSetting, CustomRelativeAlert},
    prayers::{CalculationParameters, Location, PrayerEventProvider, PrayerTimes},
    schedule::{
        AlertTarget, CategoryStrategy, DayContext, Metadata, NotificationDescriptor,
        SILENT_CHANNEL, ScheduleError, SoundSource, Validation, ids,
        strategies::default_strategies,
    },
    sounds::SoundResolver,
};

/// Days built on every rebuild: today and tomorrow.
pub const BUILD_DAYS: u32 = 2;

/// Output of [`ScheduleBuilder::build`].
#[derive(Debug)]
pub struct Schedule {
    /// Notifications to submit, sorted by instant then id
    pub descriptors: Vec<NotificationDescriptor>,
    /// Dates the provider failed for. The categories depending on them were dropped.
    pub missing_dates: Vec<NaiveDate>,
}

impl Schedule {
    /// Whether every date needed by the build had prayer times.
    pub fn is_complete(&self) -> bool {
        self.missing_dates.is_empty()
    }
}

/// Builds the notifications of today and tomorrow.
///
/// A builder is immutable and can be shared between concurrent rebuilds.
pub struct ScheduleBuilder {
    provider: Arc<dyn PrayerEventProvider>,
    params: CalculationParameters,
    timezone: Tz,
    resolver: SoundResolver,
    strategies: Vec<Box<dyn CategoryStrategy>>,
}

impl ScheduleBuilder {
    /// Create a new [ScheduleBuilder] running every category.
    ///
    /// # Arguments
    ///
    /// * `provider` - Source of the prayer times.
    /// * `params` - Calculation parameters forwarded to the provider.
    /// * `timezone` - Timezone of the user, defining day boundaries and reminder clock times.
    /// * `resolver` - Sound resolver.
    pub fn new(
        provider: Arc<dyn PrayerEventProvider>,
        params: CalculationParameters,
        timezone: Tz,
        resolver: SoundResolver,
    ) -> Self {
        ScheduleBuilder {
            provider,
            params,
            timezone,
            resolver,
            strategies: default_strategies(),
        }
    }

    /// Local date of `now` in the user timezone.
    pub fn today(&self, now: DateTime<Utc>) -> NaiveDate {
        now.with_timezone(&self.timezone).date_naive()
    }

    /// Builds the notifications of `today` and the next day.
    ///
    /// Fails only on invalid preconditions. A provider failure for one date
    /// drops the categories depending on it, the build continues and the date
    /// is reported in [`Schedule::missing_dates`].
    ///
    /// # Arguments
    ///
    /// * `location` - Where the prayer times are computed.
    /// * `today` - Local date of the first built day.
    /// * `now` - Only instants strictly after `now` are scheduled.
    /// * `settings` - Snapshot of the alert settings.
    /// * `custom_alerts` - Snapshot of the custom alerts.
    pub async fn build(
        &self,
        location: &Location,
        today: NaiveDate,
        now: DateTime<Utc>,
        settings: &[AlertSetting],
        custom_alerts: &[CustomRelativeAlert],
    ) -> Result<Schedule, ScheduleError> {
        if !location.is_valid() {
            return Err(ScheduleError::InvalidLocation(*location));
        }
        if self.params.method.is_none() {
            return Err(ScheduleError::MissingCalculationMethod);
        }

        // One more day than built: the night of the last day ends at its fajr.
        let dates: Vec<NaiveDate> = (0..=BUILD_DAYS)
            .map(|offset| today + Days::new(u64::from(offset)))
            .collect();
        let results = join_all(
            dates
                .iter()
                .map(|date| self.provider.compute(location, *date, &self.params)),
        )
        .await;

        let mut missing_dates = Vec::new();
        let times: Vec<Option<PrayerTimes>> = dates
            .iter()
            .zip(results)
            .map(|(date, result)| match result {
                Ok(times) => Some(times),
                Err(e) => {
                    warn!("failed to get prayer times of {}: {}", date, e);
                    missing_dates.push(*date);
                    None
                }
            })
            .collect();

        Ok(Schedule {
            descriptors: self.build_with_times(today, now, &times, settings, custom_alerts),
            missing_dates,
        })
    }

    /// Builds from already fetched prayer times.
    ///
    /// `times[i]` holds the prayer times of `today + i`, `None` when missing.
    /// Deterministic for given inputs.
    pub fn build_with_times(
        &self,
        today: NaiveDate,
        now: DateTime<Utc>,
        times: &[Option<PrayerTimes>],
        settings: &[AlertSetting],
        custom_alerts: &[CustomRelativeAlert],
    ) -> Vec<NotificationDescriptor> {
        let mut descriptors = Vec::new();
        let mut ids = HashSet::new();

        for day_offset in 0..BUILD_DAYS {
            let index = day_offset as usize;
            let ctx = DayContext {
                day_offset,
                date: today + Days::new(u64::from(day_offset)),
                now,
                timezone: self.timezone,
                times: times.get(index).and_then(Option::as_ref),
                next_times: times.get(index + 1).and_then(Option::as_ref),
                settings,
                custom_alerts,
            };

            for strategy in &self.strategies {
                for target in strategy.targets(&ctx) {
                    match self.process(strategy.as_ref(), &target, &ctx) {
                        Ok(Some(descriptor)) => {
                            if ids.insert(descriptor.id) {
                                descriptors.push(descriptor);
                            } else {
                                warn!(
                                    "duplicate notification id {} for {} on {}, skipping",
                                    descriptor.id, target.key, ctx.date
                                );
                            }
                        }
                        Ok(None) => {}
                        Err(e) => warn!(
                            "skipping {} alert {} on {}: {}",
                            strategy.category(),
                            target.key,
                            ctx.date,
                            e
                        ),
                    }
                }
            }
        }

        descriptors.sort_by_key(|descriptor| (descriptor.scheduled_at, descriptor.id));
        info!(
            "built {} notifications for {} and the next day",
            descriptors.len(),
            today
        );
        descriptors
    }

    /// Runs one target through validation, the future check, sound and id.
    fn process(
        &self,
        strategy: &dyn CategoryStrategy,
        target: &AlertTarget,
        ctx: &DayContext,
    ) -> Result<Option<NotificationDescriptor>, ScheduleError> {
        let Some(candidate) = strategy.compute_candidate(target, ctx)? else {
            return Ok(None);
        };

        let scheduled_at = match strategy.validate(target, candidate, ctx)? {
            Validation::Accepted(at) => at,
            Validation::Clamped { candidate, clamped } => {
                info!(
                    "{} on {} moved from {} to {}",
                    target.key, ctx.date, candidate, clamped
                );
                clamped
            }
            Validation::Dropped(reason) => {
                warn!("dropping {} on {}: {}", target.key, ctx.date, reason);
                return Ok(None);
            }
        };

        if scheduled_at <= ctx.now {
            debug!("{} on {} is in the past", target.key, ctx.date);
            return Ok(None);
        }

        let sound_file = match &target.sound {
            SoundSource::Setting {
                setting_id,
                sound_type,
            } => self.resolver.resolve(setting_id, *sound_type, ctx.settings),
            SoundSource::Custom {
                sound_id,
                base_setting_id,
            } => self
                .resolver
                .resolve_custom(sound_id, base_setting_id, ctx.settings),
        };
        let channel = match sound_file {
            Some(_) => target.kind.channel(),
            None => SILENT_CHANNEL,
        };

        let descriptor = NotificationDescriptor {
            id: ids::allocate(target.band, &target.key, ctx.day_offset),
            scheduled_at,
            title: target.title.clone(),
            body: target.body.clone(),
            sound_file,
            channel: Some(channel.to_string()),
            metadata: Metadata {
                kind: target.kind,
                name: target.name.clone(),
            },
        };
        debug!("scheduling {}", descriptor);
        Ok(Some(descriptor))
    }
}
