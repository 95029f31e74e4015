//! User-authored alerts relative to a prayer.

use chrono::{DateTime, Utc};

use crate::{
    schedule::{
        AlertKind, CategoryStrategy, DayContext, ScheduleError,
        ids::IdBand,
        strategy::{AlertTarget, SoundSource},
    },
    utils::describe_offset,
};

pub struct CustomAlertStrategy;

impl CategoryStrategy for CustomAlertStrategy {
    fn category(&self) -> &'static str {
        "custom"
    }

    fn targets(&self, ctx: &DayContext) -> Vec<AlertTarget> {
        ctx.custom_alerts
            .iter()
            .filter(|alert| alert.enabled)
            .map(|alert| {
                let title = if alert.label.trim().is_empty() {
                    "Reminder".to_string()
                } else {
                    alert.label.clone()
                };
                AlertTarget {
                    key: alert.id.clone(),
                    band: IdBand::Custom,
                    kind: AlertKind::Custom,
                    name: alert.id.clone(),
                    title,
                    body: format!(
                        "{} {}",
                        describe_offset(alert.offset_minutes),
                        alert.base_prayer
                    ),
                    sound: SoundSource::Custom {
                        sound_id: alert.sound_id.clone(),
                        base_setting_id: alert.base_prayer.key().to_string(),
                    },
                    anchor: Some(alert.base_prayer),
                    offset_minutes: alert.offset_minutes,
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        alerts::CustomRelativeAlert,
        prayers::Prayer,
        schedule::strategies::tests::{at, context, create_test_times},
    };

    fn custom(id: &str, base_prayer: Prayer, offset_minutes: i64) -> CustomRelativeAlert {
        CustomRelativeAlert {
            id: id.to_string(),
            enabled: true,
            base_prayer,
            offset_minutes,
            label: String::new(),
            sound_id: "soft-chime".to_string(),
        }
    }

    #[test]
    fn test_offset_from_base_prayer() {
        let times = create_test_times();
        let alerts = vec![custom("tahajjud", Prayer::Fajr, -45)];
        let ctx = context(&times, &[], &alerts);

        let targets = CustomAlertStrategy.targets(&ctx);
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].title, "Reminder");
        assert_eq!(targets[0].body, "45 minutes before Fajr");
        assert_eq!(
            targets[0].sound,
            SoundSource::Custom {
                sound_id: "soft-chime".to_string(),
                base_setting_id: "fajr".to_string()
            }
        );
        assert_eq!(
            CustomAlertStrategy
                .compute_candidate(&targets[0], &ctx)
                .unwrap(),
            Some(at(11, 4, 15))
        );
    }

    #[test]
    fn test_disabled_custom_alert_is_skipped() {
        let times = create_test_times();
        let mut disabled = custom("off", Prayer::Asr, 5);
        disabled.enabled = false;
        let mut labelled = custom("on", Prayer::Isha, 30);
        labelled.label = "Witr".to_string();
        let alerts = vec![disabled, labelled];
        let ctx = context(&times, &[], &alerts);

        let targets = CustomAlertStrategy.targets(&ctx);
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].title, "Witr");
        assert_eq!(targets[0].body, "30 minutes after Isha");
    }
}
