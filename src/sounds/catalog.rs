//! Static table of the alert sounds.

use std::fmt;

use crate::alerts::{DEFAULT_SOUND, NO_SOUND};

/// Sound used when nothing more specific resolves.
pub const APP_DEFAULT_SOUND: &str = "adhan-makkah";

/// A nameable sound entry.
///
/// Sentinel entries (`default`, `none`) have no path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AlertSound {
    pub id: String,
    pub display_name: String,
    /// File name inside the sounds directory
    pub path: Option<String>,
}

impl AlertSound {
    fn new(id: &str, display_name: &str, path: Option<&str>) -> Self {
        AlertSound {
            id: id.to_string(),
            display_name: display_name.to_string(),
            path: path.map(str::to_string),
        }
    }
}

impl fmt::Display for AlertSound {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.path {
            Some(path) => write!(f, "{} ({}) -> {}", self.id, self.display_name, path),
            None => write!(f, "{} ({})", self.id, self.display_name),
        }
    }
}

/// Whether `name` can be used as a plain file name in the sounds directory.
pub fn is_filename_safe(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
}

/// The set of sounds an alert can refer to, plus the application default.
#[derive(Clone, Debug)]
pub struct SoundCatalog {
    sounds: Vec<AlertSound>,
    default_id: String,
}

impl SoundCatalog {
    /// Creates a catalog from explicit entries.
    pub fn new(sounds: Vec<AlertSound>, default_id: &str) -> Self {
        SoundCatalog {
            sounds,
            default_id: default_id.to_string(),
        }
    }

    /// The sounds shipped with the application.
    pub fn builtin() -> Self {
        let sounds = vec![
            AlertSound::new(DEFAULT_SOUND, "Default", None),
            AlertSound::new(NO_SOUND, "Silent", None),
            AlertSound::new("adhan-makkah", "Adhan (Makkah)", Some("adhan_makkah.mp3")),
            AlertSound::new("adhan-madinah", "Adhan (Madinah)", Some("adhan_madinah.mp3")),
            AlertSound::new("adhan-alaqsa", "Adhan (Al-Aqsa)", Some("adhan_alaqsa.mp3")),
            AlertSound::new("adhan-egypt", "Adhan (Egypt)", Some("adhan_egypt.mp3")),
            AlertSound::new("takbir", "Takbir", Some("takbir.mp3")),
            AlertSound::new("soft-chime", "Soft chime", Some("soft_chime.mp3")),
            AlertSound::new("bell", "Bell", Some("bell.mp3")),
        ];
        SoundCatalog::new(sounds, APP_DEFAULT_SOUND)
    }

    /// Looks up an entry by id.
    pub fn get(&self, id: &str) -> Option<&AlertSound> {
        self.sounds.iter().find(|sound| sound.id == id)
    }

    /// Id of the application-wide default sound.
    pub fn default_id(&self) -> &str {
        &self.default_id
    }

    pub fn sounds(&self) -> &[AlertSound] {
        &self.sounds
    }
}
