//! Duha, the forenoon prayer between sunrise and dhuhr.

use chrono::{DateTime, Utc};

use crate::{
    alerts::{DUHA, QUARTER_DAY},
    schedule::{
        AlertKind, CategoryStrategy, DayContext, ScheduleError, Validation,
        derived::{DuhaPolicy, duha_candidate, validate_duha},
        ids::IdBand,
        strategy::{AlertTarget, SoundSource},
    },
    sounds::SoundType,
};

pub struct DuhaStrategy;

impl CategoryStrategy for DuhaStrategy {
    fn category(&self) -> &'static str {
        "duha"
    }

    fn targets(&self, ctx: &DayContext) -> Vec<AlertTarget> {
        let Some(setting) = ctx.enabled_setting(DUHA) else {
            return vec![];
        };
        let option = setting
            .selected_alert_time()
            .map_or(QUARTER_DAY, |time| time.id.as_str());

        vec![AlertTarget {
            key: DUHA.to_string(),
            band: IdBand::Athkar,
            kind: AlertKind::Duha,
            name: DUHA.to_string(),
            title: setting.name_label.clone(),
            body: "It is time for the Duha prayer".to_string(),
            sound: SoundSource::Setting {
                setting_id: DUHA.to_string(),
                sound_type: SoundType::Main,
            },
            anchor: None,
            offset_minutes: 0,
            option: Some(option.to_string()),
        }]
    }

    fn compute_candidate(
        &self,
        target: &AlertTarget,
        ctx: &DayContext,
    ) -> Result<Option<DateTime<Utc>>, ScheduleError> {
        let option = target.option.as_deref().unwrap_or(QUARTER_DAY);
        let policy = DuhaPolicy::parse(option).ok_or_else(|| ScheduleError::InvalidOption {
            setting: DUHA.to_string(),
            option: option.to_string(),
        })?;

        let times = ctx.times()?;
        duha_candidate(times.sunrise, times.dhuhr, policy).map(Some)
    }

    fn validate(
        &self,
        _target: &AlertTarget,
        candidate: DateTime<Utc>,
        ctx: &DayContext,
    ) -> Result<Validation, ScheduleError> {
        let times = ctx.times()?;
        Ok(validate_duha(candidate, times.sunrise, times.dhuhr))
    }
}
