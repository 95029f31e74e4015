//! Prayer-time provider backed by the Aladhan HTTP API.
//!
//! This module provides the [`PrayerEventProvider`] trait the scheduler depends
//! on and the [`AladhanProvider`] that implements it over HTTP.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use log::{debug, info};
use mockall::automock;
use reqwest::Client;

use crate::prayers::{
    CalculationParameters, HighLatitudeRule, Location, Madhab, PrayerTimes, ProviderError,
    response_structs::TimingsResponse,
};

/// Source of the six prayer instants of a date.
///
/// The provider must accept any date, the scheduler asks for the day after
/// tomorrow to get the fajr ending tomorrow's night.
#[automock]
#[async_trait]
pub trait PrayerEventProvider: Send + Sync {
    /// Computes the prayer times of `date` at `location`.
    async fn compute(
        &self,
        location: &Location,
        date: NaiveDate,
        params: &CalculationParameters,
    ) -> Result<PrayerTimes, ProviderError>;
}

/// HTTP client for the Aladhan prayer-times API.
///
/// # Examples
///
/// ```no_run
/// let provider = AladhanProvider::new("https://api.aladhan.com", chrono_tz::Asia::Riyadh);
/// let times = provider.compute(&location, date, &params).await?;
/// println!("fajr at {}", times.fajr);
/// ```
pub struct AladhanProvider {
    /// API base url, without trailing slash
    url: String,
    /// Timezone the returned local times are expressed in
    timezone: Tz,
    /// HTTP client
    client: Client,
}

impl AladhanProvider {
    /// Create a new [AladhanProvider].
    ///
    /// # Arguments
    ///
    /// * `url` - The base URL of the API, e.g. `https://api.aladhan.com`.
    /// * `timezone` - The user timezone.
    pub fn new(url: &str, timezone: Tz) -> Self {
        AladhanProvider {
            url: url.trim_end_matches('/').to_string(),
            timezone,
            client: Client::new(),
        }
    }

    /// Builds the query string of a timings request.
    fn query(&self, location: &Location, method: u8, params: &CalculationParameters) -> Vec<(&'static str, String)> {
        let school = match params.madhab {
            Madhab::Shafi => 0,
            Madhab::Hanafi => 1,
        };
        let latitude_adjustment = match params.high_latitude_rule {
            HighLatitudeRule::MiddleOfTheNight => 1,
            HighLatitudeRule::SeventhOfTheNight => 2,
            HighLatitudeRule::TwilightAngle => 3,
        };
        // Imsak,Fajr,Sunrise,Dhuhr,Asr,Maghrib,Sunset,Isha,Midnight
        let adjustments = &params.adjustments;
        let tune = format!(
            "0,{},{},{},{},{},0,{},0",
            adjustments.fajr,
            adjustments.sunrise,
            adjustments.dhuhr,
            adjustments.asr,
            adjustments.maghrib,
            adjustments.isha
        );

        vec![
            ("latitude", location.latitude.to_string()),
            ("longitude", location.longitude.to_string()),
            ("method", method.to_string()),
            ("school", school.to_string()),
            ("latitudeAdjustmentMethod", latitude_adjustment.to_string()),
            ("tune", tune),
            ("timezonestring", self.timezone.name().to_string()),
            ("iso8601", "true".to_string()),
        ]
    }
}

/// Parses one RFC 3339 timing into a UTC instant.
fn parse_timing(name: &'static str, value: &str) -> Result<DateTime<Utc>, ProviderError> {
    DateTime::parse_from_rfc3339(value)
        .map(|time| time.with_timezone(&Utc))
        .map_err(|_| ProviderError::InvalidTiming {
            name,
            value: value.to_string(),
        })
}

#[async_trait]
impl PrayerEventProvider for AladhanProvider {
    /// Request `/v1/timings/{DD-MM-YYYY}` to get the timings of a date.
    ///
    /// This api call returns a json object with the local timings:
    /// ```
    /// {
    ///   code: 200,
    ///   data: { timings: { Fajr: "2024-03-11T05:02:00+03:00", Sunrise: "...", ... } }
    /// }
    /// ```
    /// The timings are converted to UTC instants and must be in day order.
    async fn compute(
        &self,
        location: &Location,
        date: NaiveDate,
        params: &CalculationParameters,
    ) -> Result<PrayerTimes, ProviderError> {
        let method = params.method.ok_or(ProviderError::MissingMethod)?;
        let url = format!("{}/v1/timings/{}", &self.url, date.format("%d-%m-%Y"));
        info!("request prayer times for {} at {}", date, location);
        debug!("request {}", &url);

        let response: TimingsResponse = self
            .client
            .get(&url)
            .query(&self.query(location, method, params))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if response.code != 200 {
            return Err(ProviderError::Api(response.code));
        }

        let timings = response.data.timings;
        debug!("response from {} -> {}", &url, &timings);

        let times = PrayerTimes {
            date,
            fajr: parse_timing("fajr", &timings.fajr)?,
            sunrise: parse_timing("sunrise", &timings.sunrise)?,
            dhuhr: parse_timing("dhuhr", &timings.dhuhr)?,
            asr: parse_timing("asr", &timings.asr)?,
            maghrib: parse_timing("maghrib", &timings.maghrib)?,
            isha: parse_timing("isha", &timings.isha)?,
        };

        if !times.is_ordered() {
            return Err(ProviderError::Unordered(date));
        }

        Ok(times)
    }
}
