//! Alert sounds: catalog, resolution and playback.
//!
//! - [`SoundCatalog`]: The table of known sounds with the `default` and `none` sentinels
//! - [`SoundResolver`]: Turns a preference into a catalog file through an ordered fallback chain
//! - [`AudioSession`]: Owns the single sound currently playing

mod audio_session;
mod catalog;
mod resolver;

use thiserror::Error;

pub use crate::sounds::audio_session::AudioSession;
pub use crate::sounds::catalog::{AlertSound, SoundCatalog};
pub use crate::sounds::resolver::{SoundResolver, SoundType};

/// Errors that can occur while playing a sound.
#[derive(Debug, Error)]
pub enum AudioError {
    /// No player command is configured.
    #[error("no audio player configured")]
    NoPlayer,
    /// The sound file is not a plain file name.
    #[error("invalid sound file {0:?}")]
    InvalidSound(String),
    /// The player process could not be started.
    #[error("failed to start audio player: {0}")]
    Spawn(#[from] std::io::Error),
}
