//! The last third of the night, from the day's maghrib to the next fajr.

use chrono::{DateTime, Utc};

use crate::{
    alerts::LAST_THIRD,
    schedule::{
        AlertKind, CategoryStrategy, DayContext, ScheduleError,
        derived::{last_third_start, shift_minutes},
        ids::IdBand,
        strategy::{AlertTarget, SoundSource},
    },
    sounds::SoundType,
};

/// Alert at the start of the last third of the night.
///
/// The night of day `d` starts at maghrib of `d` and ends at fajr of `d + 1`,
/// so the candidate usually falls on the next calendar day. The two-thirds
/// point is inside the night by construction, only the future check applies.
pub struct LastThirdStrategy;

impl CategoryStrategy for LastThirdStrategy {
    fn category(&self) -> &'static str {
        "last-third"
    }

    fn targets(&self, ctx: &DayContext) -> Vec<AlertTarget> {
        let Some(setting) = ctx.enabled_setting(LAST_THIRD) else {
            return vec![];
        };
        let option = setting.selected_alert_time().map(|time| time.id.clone());

        vec![AlertTarget {
            key: LAST_THIRD.to_string(),
            band: IdBand::Athkar,
            kind: AlertKind::LastThird,
            name: LAST_THIRD.to_string(),
            title: setting.name_label.clone(),
            body: "The last third of the night has begun".to_string(),
            sound: SoundSource::Setting {
                setting_id: LAST_THIRD.to_string(),
                sound_type: SoundType::Main,
            },
            anchor: None,
            offset_minutes: 0,
            option,
        }]
    }

    fn compute_candidate(
        &self,
        target: &AlertTarget,
        ctx: &DayContext,
    ) -> Result<Option<DateTime<Utc>>, ScheduleError> {
        let offset = target.option_minutes()?;
        let maghrib = ctx.times()?.maghrib;
        let next_fajr = ctx.next_times()?.fajr;
        let start = last_third_start(maghrib, next_fajr)?;

        shift_minutes(start, offset).map(Some)
    }
}
