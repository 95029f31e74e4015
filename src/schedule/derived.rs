//! Instants derived from the prayer times: duha and the last third of the night.

use chrono::{DateTime, TimeDelta, Utc};

use crate::{
    alerts::QUARTER_DAY,
    schedule::{ScheduleError, Validation},
    utils::parse_signed_minutes,
};

/// Earliest duha alert, in minutes after sunrise.
pub const DUHA_EARLIEST_MINUTES: i64 = 15;
/// Duha alert used when the configured one is out of its window.
pub const DUHA_FALLBACK_MINUTES: i64 = 30;

/// How the duha alert is placed in the morning.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DuhaPolicy {
    /// Midway between sunrise and dhuhr.
    ///
    /// The name is historical: it is the midpoint of the morning, not a
    /// quarter of the whole day.
    QuarterDay,
    /// Minutes after sunrise
    AfterSunrise(i64),
    /// Minutes before dhuhr
    BeforeDhuhr(i64),
}

impl DuhaPolicy {
    /// Parses an alert time option: `"quarter-day"`, `"+20"` or `"-30"`.
    pub fn parse(option: &str) -> Option<DuhaPolicy> {
        if option == QUARTER_DAY {
            return Some(DuhaPolicy::QuarterDay);
        }

        parse_signed_minutes(option).and_then(|minutes| {
            if minutes < 0 {
                minutes.checked_neg().map(DuhaPolicy::BeforeDhuhr)
            } else {
                Some(DuhaPolicy::AfterSunrise(minutes))
            }
        })
    }
}

/// Raw duha instant of a morning, before window validation.
pub fn duha_candidate(
    sunrise: DateTime<Utc>,
    dhuhr: DateTime<Utc>,
    policy: DuhaPolicy,
) -> Result<DateTime<Utc>, ScheduleError> {
    if dhuhr <= sunrise {
        return Err(ScheduleError::InvalidMorning { sunrise, dhuhr });
    }

    match policy {
        DuhaPolicy::QuarterDay => Ok(sunrise + (dhuhr - sunrise) / 2),
        DuhaPolicy::AfterSunrise(minutes) => shift_minutes(sunrise, minutes),
        DuhaPolicy::BeforeDhuhr(minutes) => shift_minutes(dhuhr, -minutes),
    }
}

/// Shifts `time` by a signed number of minutes.
///
/// # Errors
///
/// Returns [`ScheduleError::OffsetOutOfRange`] when the offset or the shifted
/// instant cannot be represented.
pub fn shift_minutes(time: DateTime<Utc>, minutes: i64) -> Result<DateTime<Utc>, ScheduleError> {
    TimeDelta::try_minutes(minutes)
        .and_then(|delta| time.checked_add_signed(delta))
        .ok_or(ScheduleError::OffsetOutOfRange(minutes))
}

/// Validates a duha candidate against `[sunrise + 15 min, dhuhr)`.
///
/// Out-of-window candidates are clamped to sunrise + 30 min. If the morning is
/// so short that the fallback itself is outside the window, the alert is dropped.
pub fn validate_duha(
    candidate: DateTime<Utc>,
    sunrise: DateTime<Utc>,
    dhuhr: DateTime<Utc>,
) -> Validation {
    let earliest = sunrise + TimeDelta::minutes(DUHA_EARLIEST_MINUTES);
    let in_window = |instant: DateTime<Utc>| earliest <= instant && instant < dhuhr;

    if in_window(candidate) {
        return Validation::Accepted(candidate);
    }

    let fallback = sunrise + TimeDelta::minutes(DUHA_FALLBACK_MINUTES);
    if in_window(fallback) {
        Validation::Clamped {
            candidate,
            clamped: fallback,
        }
    } else {
        Validation::Dropped(format!(
            "morning from {} to {} is too short for duha",
            sunrise, dhuhr
        ))
    }
}

/// Duration of the night from maghrib to the next fajr.
pub fn night_duration(
    maghrib: DateTime<Utc>,
    next_fajr: DateTime<Utc>,
) -> Result<TimeDelta, ScheduleError> {
    let night = next_fajr - maghrib;
    if night <= TimeDelta::zero() {
        return Err(ScheduleError::InvalidNight { maghrib, next_fajr });
    }
    Ok(night)
}

/// Start of the last third of the night: maghrib plus two thirds of the night.
pub fn last_third_start(
    maghrib: DateTime<Utc>,
    next_fajr: DateTime<Utc>,
) -> Result<DateTime<Utc>, ScheduleError> {
    let night = night_duration(maghrib, next_fajr)?;
    Ok(maghrib + TimeDelta::seconds(night.num_seconds() * 2 / 3))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, day, hour, minute, 0).unwrap()
    }

    #[test]
    fn test_parse_policy() {
        assert_eq!(DuhaPolicy::parse("quarter-day"), Some(DuhaPolicy::QuarterDay));
        assert_eq!(DuhaPolicy::parse("+20"), Some(DuhaPolicy::AfterSunrise(20)));
        assert_eq!(DuhaPolicy::parse("-30"), Some(DuhaPolicy::BeforeDhuhr(30)));
        assert_eq!(DuhaPolicy::parse("noon"), None);
        assert_eq!(DuhaPolicy::parse("-9223372036854775808"), None);
    }

    #[test]
    fn test_quarter_day_is_midpoint() {
        let candidate = duha_candidate(at(11, 6, 0), at(11, 12, 0), DuhaPolicy::QuarterDay).unwrap();
        assert_eq!(candidate, at(11, 9, 0));
    }

    #[test]
    fn test_offset_policies() {
        let sunrise = at(11, 6, 0);
        let dhuhr = at(11, 12, 0);

        assert_eq!(
            duha_candidate(sunrise, dhuhr, DuhaPolicy::AfterSunrise(20)).unwrap(),
            at(11, 6, 20)
        );
        assert_eq!(
            duha_candidate(sunrise, dhuhr, DuhaPolicy::BeforeDhuhr(30)).unwrap(),
            at(11, 11, 30)
        );
    }

    #[test]
    fn test_shift_minutes() {
        assert_eq!(shift_minutes(at(11, 6, 0), -45).unwrap(), at(11, 5, 15));
        assert!(matches!(
            shift_minutes(at(11, 6, 0), 1_000_000_000_000),
            Err(ScheduleError::OffsetOutOfRange(1_000_000_000_000))
        ));
        assert!(matches!(
            shift_minutes(at(11, 6, 0), i64::MIN),
            Err(ScheduleError::OffsetOutOfRange(i64::MIN))
        ));
    }

    #[test]
    fn test_huge_duha_offset_is_an_error() {
        let result = duha_candidate(
            at(11, 6, 0),
            at(11, 12, 0),
            DuhaPolicy::AfterSunrise(999_999_999_999_999_999),
        );
        assert!(matches!(result, Err(ScheduleError::OffsetOutOfRange(_))));
    }

    #[test]
    fn test_duha_candidate_rejects_inverted_morning() {
        let result = duha_candidate(at(11, 12, 0), at(11, 6, 0), DuhaPolicy::QuarterDay);
        assert!(matches!(result, Err(ScheduleError::InvalidMorning { .. })));
    }

    #[test]
    fn test_validate_duha_window() {
        let sunrise = at(11, 6, 0);
        let dhuhr = at(11, 12, 0);

        assert_eq!(
            validate_duha(at(11, 6, 15), sunrise, dhuhr),
            Validation::Accepted(at(11, 6, 15))
        );
        assert_eq!(
            validate_duha(at(11, 6, 10), sunrise, dhuhr),
            Validation::Clamped {
                candidate: at(11, 6, 10),
                clamped: at(11, 6, 30)
            }
        );
        assert_eq!(
            validate_duha(at(11, 12, 0), sunrise, dhuhr),
            Validation::Clamped {
                candidate: at(11, 12, 0),
                clamped: at(11, 6, 30)
            }
        );
    }

    #[test]
    fn test_validate_duha_short_morning() {
        let validation = validate_duha(at(11, 6, 20), at(11, 6, 0), at(11, 6, 25));
        assert!(matches!(validation, Validation::Dropped(_)));
    }

    #[test]
    fn test_duha_always_inside_window() {
        let sunrise = at(11, 6, 0);
        let dhuhr = at(11, 12, 0);
        let earliest = sunrise + TimeDelta::minutes(DUHA_EARLIEST_MINUTES);
        let mut policies = vec![DuhaPolicy::QuarterDay];
        for minutes in (0..=480).step_by(5) {
            policies.push(DuhaPolicy::AfterSunrise(minutes));
            policies.push(DuhaPolicy::BeforeDhuhr(minutes));
        }

        for policy in policies {
            let candidate = duha_candidate(sunrise, dhuhr, policy).unwrap();
            let scheduled = match validate_duha(candidate, sunrise, dhuhr) {
                Validation::Accepted(at) => at,
                Validation::Clamped { clamped, .. } => clamped,
                Validation::Dropped(reason) => panic!("unexpected drop: {}", reason),
            };
            assert!(earliest <= scheduled && scheduled < dhuhr, "{:?}", policy);
        }
    }

    #[test]
    fn test_last_third_crosses_midnight() {
        let start = last_third_start(at(11, 18, 0), at(12, 5, 0)).unwrap();
        assert_eq!(start, at(12, 1, 20));
    }

    #[test]
    fn test_night_duration() {
        let night = night_duration(at(11, 18, 0), at(12, 5, 0)).unwrap();
        assert_eq!(night, TimeDelta::hours(11));
    }

    #[test]
    fn test_invalid_night() {
        let result = last_third_start(at(12, 5, 0), at(11, 18, 0));
        assert!(matches!(result, Err(ScheduleError::InvalidNight { .. })));
    }
}
