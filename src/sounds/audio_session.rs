//! Playback of alert sounds.
//!
//! This module provides the [`AudioSession`], the single owner of the sound
//! currently playing. Sounds are played by spawning an external player
//! command, e.g. `paplay` or `afplay`, with the sound file as last argument.

use std::path::PathBuf;

use log::{debug, info, warn};
use tokio::process::{Child, Command};

use crate::sounds::{AudioError, catalog::is_filename_safe};

/// Owns at most one playback at a time.
///
/// # Examples
///
/// ```no_run
/// let mut session = AudioSession::new(vec!["paplay".to_string()], "/usr/share/muezzin".into());
/// session.play("adhan_makkah.mp3").await?;
/// // Starting another sound stops the adhan first
/// session.play("bell.mp3").await?;
/// session.stop().await;
/// ```
pub struct AudioSession {
    /// Player program followed by its arguments
    player: Vec<String>,
    /// Directory containing the sound files
    sounds_dir: PathBuf,
    /// Process of the sound currently playing
    active: Option<Child>,
}

impl AudioSession {
    pub fn new(player: Vec<String>, sounds_dir: PathBuf) -> Self {
        AudioSession {
            player,
            sounds_dir,
            active: None,
        }
    }

    /// Plays `sound_file`, stopping any sound already playing.
    ///
    /// # Errors
    ///
    /// - [`AudioError::NoPlayer`] if no player command is configured
    /// - [`AudioError::InvalidSound`] if `sound_file` is not a plain file name
    /// - [`AudioError::Spawn`] if the player could not be started
    pub async fn play(&mut self, sound_file: &str) -> Result<(), AudioError> {
        self.stop().await;

        let Some((program, args)) = self.player.split_first() else {
            return Err(AudioError::NoPlayer);
        };
        if !is_filename_safe(sound_file) {
            return Err(AudioError::InvalidSound(sound_file.to_string()));
        }

        let path = self.sounds_dir.join(sound_file);
        debug!("playing {} with {}", path.display(), program);

        let child = Command::new(program)
            .args(args)
            .arg(&path)
            .kill_on_drop(true)
            .spawn()?;
        self.active = Some(child);

        info!("playing sound {}", sound_file);
        Ok(())
    }

    /// Stops the sound currently playing, if any.
    pub async fn stop(&mut self) {
        let Some(mut child) = self.active.take() else {
            return;
        };

        if let Ok(Some(_)) = child.try_wait() {
            return;
        }
        if let Err(e) = child.kill().await {
            warn!("failed to stop sound: {}", e);
        }
    }

    /// Whether a sound is still playing.
    pub fn is_playing(&mut self) -> bool {
        match self.active.as_mut() {
            Some(child) => matches!(child.try_wait(), Ok(None)),
            None => false,
        }
    }
}
