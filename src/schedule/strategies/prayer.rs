//! Alerts anchored on the prayers themselves: the prayer, its pre-alert and its iqama.

use chrono::{DateTime, Utc};

use crate::{
    alerts::AlertSetting,
    prayers::Prayer,
    schedule::{
        AlertKind, CategoryStrategy, DayContext, ScheduleError,
        ids::IdBand,
        strategy::{AlertTarget, SoundSource},
    },
    sounds::SoundType,
};

/// Enabled prayer settings of the day, in prayer order.
fn prayer_settings<'a>(ctx: &DayContext<'a>) -> Vec<(Prayer, &'a AlertSetting)> {
    Prayer::ALL
        .into_iter()
        .filter_map(|prayer| ctx.enabled_setting(prayer.key()).map(|setting| (prayer, setting)))
        .collect()
}

fn sound(prayer: Prayer, sound_type: SoundType) -> SoundSource {
    SoundSource::Setting {
        setting_id: prayer.key().to_string(),
        sound_type,
    }
}

/// The alert at the prayer time.
pub struct MainPrayerStrategy;

impl CategoryStrategy for MainPrayerStrategy {
    fn category(&self) -> &'static str {
        "prayer"
    }

    fn targets(&self, ctx: &DayContext) -> Vec<AlertTarget> {
        prayer_settings(ctx)
            .into_iter()
            .map(|(prayer, setting)| {
                let body = match prayer {
                    Prayer::Sunrise => "The sun has risen, the time of Fajr has ended".to_string(),
                    _ => format!("It is time for {}", setting.name_label),
                };
                AlertTarget {
                    key: prayer.key().to_string(),
                    band: IdBand::MainPrayer,
                    kind: AlertKind::Prayer,
                    name: prayer.key().to_string(),
                    title: setting.name_label.clone(),
                    body,
                    sound: sound(prayer, SoundType::Main),
                    anchor: Some(prayer),
                    offset_minutes: 0,
                    option: None,
                }
            })
            .collect()
    }

    fn compute_candidate(
        &self,
        target: &AlertTarget,
        ctx: &DayContext,
    ) -> Result<Option<DateTime<Utc>>, ScheduleError> {
        target.anchored_candidate(ctx)
    }
}

/// The alert some minutes before the prayer time.
pub struct PreAlertStrategy;

impl CategoryStrategy for PreAlertStrategy {
    fn category(&self) -> &'static str {
        "pre-alert"
    }

    fn targets(&self, ctx: &DayContext) -> Vec<AlertTarget> {
        prayer_settings(ctx)
            .into_iter()
            .filter(|(_, setting)| setting.pre_alert_enabled && setting.pre_alert_minutes > 0)
            .map(|(prayer, setting)| AlertTarget {
                key: format!("{}:pre", prayer.key()),
                band: IdBand::PrePrayer,
                kind: AlertKind::PreAlert,
                name: prayer.key().to_string(),
                title: format!("{} in {} minutes", setting.name_label, setting.pre_alert_minutes),
                body: format!(
                    "{} starts in {} minutes",
                    setting.name_label, setting.pre_alert_minutes
                ),
                sound: sound(prayer, SoundType::Pre),
                anchor: Some(prayer),
                offset_minutes: -i64::from(setting.pre_alert_minutes),
                option: None,
            })
            .collect()
    }

    fn compute_candidate(
        &self,
        target: &AlertTarget,
        ctx: &DayContext,
    ) -> Result<Option<DateTime<Utc>>, ScheduleError> {
        target.anchored_candidate(ctx)
    }
}

/// The call to start the congregational prayer.
pub struct IqamaStrategy;

impl CategoryStrategy for IqamaStrategy {
    fn category(&self) -> &'static str {
        "iqama"
    }

    fn targets(&self, ctx: &DayContext) -> Vec<AlertTarget> {
        prayer_settings(ctx)
            .into_iter()
            .filter(|(prayer, setting)| {
                prayer.supports_iqama() && setting.has_iqama && setting.iqama_enabled
            })
            .map(|(prayer, setting)| AlertTarget {
                key: format!("{}:iqama", prayer.key()),
                band: IdBand::PrePrayer,
                kind: AlertKind::Iqama,
                name: prayer.key().to_string(),
                title: format!("Iqama of {}", setting.name_label),
                body: format!("The iqama of {} is now", setting.name_label),
                sound: sound(prayer, SoundType::Iqama),
                anchor: Some(prayer),
                offset_minutes: i64::from(setting.iqama_offset_minutes),
                option: None,
            })
            .collect()
    }

    fn compute_candidate(
        &self,
        target: &AlertTarget,
        ctx: &DayContext,
    ) -> Result<Option<DateTime<Utc>>, ScheduleError> {
        target.anchored_candidate(ctx)
    }
}
