//! User-authored alerts relative to a prayer.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::prayers::Prayer;

/// An alert at a signed offset from one of the six prayer events.
///
/// # Examples
///
/// ```
/// let alert = CustomRelativeAlert {
///     id: "tahajjud".to_string(),
///     enabled: true,
///     base_prayer: Prayer::Fajr,
///     offset_minutes: -45,
///     label: "Tahajjud".to_string(),
///     sound_id: "soft-chime".to_string(),
/// };
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomRelativeAlert {
    /// Unique identifier, also used to derive the notification id
    pub id: String,
    pub enabled: bool,
    /// Event the offset is measured from
    pub base_prayer: Prayer,
    /// Minutes from the base event, negative means before
    pub offset_minutes: i64,
    pub label: String,
    /// Catalog sound id, or one of the `default`/`none` sentinels
    pub sound_id: String,
}

impl fmt::Display for CustomRelativeAlert {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "id={}, base={}, offset={}, label={}",
            self.id, self.base_prayer, self.offset_minutes, self.label
        )
    }
}
