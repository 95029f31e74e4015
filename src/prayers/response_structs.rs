//! Response structures for the prayer-times API.
//!
//! Only the parts of the `/v1/timings` payload the provider reads are modelled.

use serde::Deserialize;
use std::fmt;

/// Envelope of `/v1/timings/{date}`.
#[derive(Deserialize, Debug)]
pub struct TimingsResponse {
    /// HTTP-like status code repeated in the body.
    pub code: u16,
    pub data: TimingsData,
}

/// Payload of a timings response.
#[derive(Deserialize, Debug)]
pub struct TimingsData {
    pub timings: Timings,
}

/// Prayer timings as returned with `iso8601=true`, e.g. `2024-03-11T05:02:00+03:00`.
///
/// The API returns more entries (imsak, sunset, midnight...), they are ignored.
#[derive(Deserialize, Debug)]
#[serde(rename_all = "PascalCase")]
pub struct Timings {
    pub fajr: String,
    pub sunrise: String,
    pub dhuhr: String,
    pub asr: String,
    pub maghrib: String,
    pub isha: String,
}

impl fmt::Display for Timings {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "fajr={}, sunrise={}, dhuhr={}, asr={}, maghrib={}, isha={}",
            self.fajr, self.sunrise, self.dhuhr, self.asr, self.maghrib, self.isha
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_ignores_extra_timings() {
        let body = r#"{
            "code": 200,
            "status": "OK",
            "data": {
                "timings": {
                    "Fajr": "2024-03-11T05:02:00+03:00",
                    "Sunrise": "2024-03-11T06:17:00+03:00",
                    "Dhuhr": "2024-03-11T12:20:00+03:00",
                    "Asr": "2024-03-11T15:44:00+03:00",
                    "Sunset": "2024-03-11T18:23:00+03:00",
                    "Maghrib": "2024-03-11T18:23:00+03:00",
                    "Isha": "2024-03-11T19:53:00+03:00",
                    "Imsak": "2024-03-11T04:52:00+03:00",
                    "Midnight": "2024-03-12T00:20:00+03:00"
                },
                "meta": { "method": { "id": 4 } }
            }
        }"#;

        let response: TimingsResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.code, 200);
        assert_eq!(response.data.timings.fajr, "2024-03-11T05:02:00+03:00");
        assert_eq!(response.data.timings.isha, "2024-03-11T19:53:00+03:00");
    }
}
