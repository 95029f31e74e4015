//! Morning and evening athkar, relative to fajr and asr.

use chrono::{DateTime, Utc};

use crate::{
    alerts::{EVENING_ATHKAR, MORNING_ATHKAR},
    prayers::Prayer,
    schedule::{
        AlertKind, CategoryStrategy, DayContext, ScheduleError, Validation,
        derived::shift_minutes,
        ids::IdBand,
        strategy::{AlertTarget, SoundSource},
    },
    sounds::SoundType,
};

/// Athkar settings with the event they start from and the event closing their window.
const ATHKAR: [(&str, Prayer, Prayer); 2] = [
    (MORNING_ATHKAR, Prayer::Fajr, Prayer::Dhuhr),
    (EVENING_ATHKAR, Prayer::Asr, Prayer::Maghrib),
];

fn window_end(id: &str) -> Option<Prayer> {
    ATHKAR
        .iter()
        .find(|(setting_id, _, _)| *setting_id == id)
        .map(|(_, _, end)| *end)
}

pub struct AthkarStrategy;

impl CategoryStrategy for AthkarStrategy {
    fn category(&self) -> &'static str {
        "athkar"
    }

    fn targets(&self, ctx: &DayContext) -> Vec<AlertTarget> {
        ATHKAR
            .iter()
            .filter_map(|(id, start, _)| {
                let setting = ctx.enabled_setting(id)?;
                let option = setting.selected_alert_time().map(|time| time.id.clone());

                Some(AlertTarget {
                    key: id.to_string(),
                    band: IdBand::Athkar,
                    kind: AlertKind::Athkar,
                    name: id.to_string(),
                    title: setting.name_label.clone(),
                    body: format!("Time for the {}", setting.name_label.to_lowercase()),
                    sound: SoundSource::Setting {
                        setting_id: id.to_string(),
                        sound_type: SoundType::Main,
                    },
                    anchor: Some(*start),
                    offset_minutes: 0,
                    option,
                })
            })
            .collect()
    }

    fn compute_candidate(
        &self,
        target: &AlertTarget,
        ctx: &DayContext,
    ) -> Result<Option<DateTime<Utc>>, ScheduleError> {
        let Some(anchor) = target.anchor else {
            return Ok(None);
        };
        let offset = target.option_minutes()?;

        shift_minutes(ctx.times()?.get(anchor), offset).map(Some)
    }

    /// Keeps the candidate inside `[start, end)`, dropping it otherwise.
    fn validate(
        &self,
        target: &AlertTarget,
        candidate: DateTime<Utc>,
        ctx: &DayContext,
    ) -> Result<Validation, ScheduleError> {
        let (Some(start), Some(end)) = (target.anchor, window_end(&target.key)) else {
            return Ok(Validation::Accepted(candidate));
        };
        let times = ctx.times()?;
        let (start_at, end_at) = (times.get(start), times.get(end));

        if start_at <= candidate && candidate < end_at {
            Ok(Validation::Accepted(candidate))
        } else {
            Ok(Validation::Dropped(format!(
                "{} is outside {} to {}",
                candidate, start, end
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        alerts::{AlertSetting, AlertTime},
        schedule::strategies::tests::{at, context, create_test_times},
    };

    fn athkar_setting(id: &str, selected: &str) -> AlertSetting {
        let mut setting = AlertSetting::new(id, "Morning athkar");
        setting.alert_times = vec![AlertTime::new(selected)];
        setting.select_alert_time(selected);
        setting
    }

    fn validated(setting: AlertSetting) -> Validation {
        let times = create_test_times();
        let settings = vec![setting];
        let ctx = context(&times, &settings, &[]);

        let target = &AthkarStrategy.targets(&ctx)[0];
        let candidate = AthkarStrategy
            .compute_candidate(target, &ctx)
            .unwrap()
            .unwrap();
        AthkarStrategy.validate(target, candidate, &ctx).unwrap()
    }

    #[test]
    fn test_morning_athkar_in_window() {
        assert_eq!(
            validated(athkar_setting(MORNING_ATHKAR, "+40")),
            Validation::Accepted(at(11, 5, 40))
        );
    }

    #[test]
    fn test_morning_athkar_at_dhuhr_is_dropped() {
        assert!(matches!(
            validated(athkar_setting(MORNING_ATHKAR, "+420")),
            Validation::Dropped(_)
        ));
    }

    #[test]
    fn test_evening_athkar_anchored_on_asr() {
        assert_eq!(
            validated(athkar_setting(EVENING_ATHKAR, "+60")),
            Validation::Accepted(at(11, 16, 0))
        );
    }

    #[test]
    fn test_evening_athkar_before_asr_is_dropped() {
        assert!(matches!(
            validated(athkar_setting(EVENING_ATHKAR, "-15")),
            Validation::Dropped(_)
        ));
    }

    #[test]
    fn test_unparsable_option_is_an_error() {
        let times = create_test_times();
        let settings = vec![athkar_setting(MORNING_ATHKAR, "after fajr")];
        let ctx = context(&times, &settings, &[]);

        let target = &AthkarStrategy.targets(&ctx)[0];
        assert!(matches!(
            AthkarStrategy.compute_candidate(target, &ctx),
            Err(ScheduleError::InvalidOption { .. })
        ));
    }

    #[test]
    fn test_unrepresentable_offset_is_an_error() {
        let times = create_test_times();
        let settings = vec![athkar_setting(MORNING_ATHKAR, "+999999999999999999")];
        let ctx = context(&times, &settings, &[]);

        let target = &AthkarStrategy.targets(&ctx)[0];
        assert!(matches!(
            AthkarStrategy.compute_candidate(target, &ctx),
            Err(ScheduleError::OffsetOutOfRange(999_999_999_999_999_999))
        ));
    }

    #[test]
    fn test_only_enabled_athkar_have_targets() {
        let times = create_test_times();
        let mut evening = athkar_setting(EVENING_ATHKAR, "+0");
        evening.enabled = false;
        let settings = vec![athkar_setting(MORNING_ATHKAR, "+0"), evening];
        let ctx = context(&times, &settings, &[]);

        let targets = AthkarStrategy.targets(&ctx);
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].key, MORNING_ATHKAR);
        assert_eq!(targets[0].anchor, Some(Prayer::Fajr));
    }
}
