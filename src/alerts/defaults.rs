//! Settings seeded on first start.

use chrono::Weekday;

use crate::{
    alerts::{AlertSetting, AlertTime, Recurrence},
    prayers::Prayer,
};

/// Key of the morning athkar setting, anchored on fajr.
pub const MORNING_ATHKAR: &str = "morning-athkar";
/// Key of the evening athkar setting, anchored on asr.
pub const EVENING_ATHKAR: &str = "evening-athkar";
/// Key of the duha setting.
pub const DUHA: &str = "duha";
/// Key of the last third of the night setting.
pub const LAST_THIRD: &str = "last-third";
/// Duha option placing the alert midway between sunrise and dhuhr.
pub const QUARTER_DAY: &str = "quarter-day";

fn with_times(mut setting: AlertSetting, ids: &[&str], selected: &str) -> AlertSetting {
    setting.alert_times = ids.iter().map(|id| AlertTime::new(id)).collect();
    setting.select_alert_time(selected);
    setting
}

fn reminder(id: &str, label: &str, recurrence: Recurrence, time: &str) -> AlertSetting {
    let mut setting = with_times(AlertSetting::new(id, label), &[time], time);
    setting.enabled = false;
    setting.recurrence = Some(recurrence);
    setting
}

/// Returns the settings a new user starts with.
///
/// The six prayers are enabled, everything else is opt-in.
pub fn default_settings() -> Vec<AlertSetting> {
    let mut settings: Vec<AlertSetting> = Prayer::ALL
        .into_iter()
        .map(|prayer| {
            let mut setting = AlertSetting::new(prayer.key(), &prayer.to_string());
            setting.has_iqama = prayer.supports_iqama();
            setting.pre_alert_minutes = 15;
            setting
        })
        .collect();

    let athkar_times = ["+0", "+15", "+30", "+60"];
    let mut morning = with_times(
        AlertSetting::new(MORNING_ATHKAR, "Morning athkar"),
        &athkar_times,
        "+15",
    );
    morning.enabled = false;
    let mut evening = with_times(
        AlertSetting::new(EVENING_ATHKAR, "Evening athkar"),
        &athkar_times,
        "+15",
    );
    evening.enabled = false;

    let mut duha = with_times(
        AlertSetting::new(DUHA, "Duha"),
        &[QUARTER_DAY, "+20", "-30"],
        QUARTER_DAY,
    );
    duha.enabled = false;

    let mut last_third = with_times(
        AlertSetting::new(LAST_THIRD, "Last third of the night"),
        &["+0", "-15", "-30"],
        "+0",
    );
    last_third.enabled = false;

    settings.extend([morning, evening, duha, last_third]);
    settings.push(reminder(
        "friday-kahf",
        "Surat Al-Kahf",
        Recurrence::Weekly {
            days: vec![Weekday::Fri],
        },
        "09:00",
    ));
    settings.push(reminder(
        "sunnah-fasting",
        "Fasting tomorrow",
        Recurrence::Weekly {
            days: vec![Weekday::Sun, Weekday::Wed],
        },
        "21:00",
    ));
    settings.push(reminder(
        "monthly-sadaqah",
        "Monthly sadaqah",
        Recurrence::Monthly { days: vec![1] },
        "10:00",
    ));

    settings
}
