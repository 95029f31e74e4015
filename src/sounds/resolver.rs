//! Sound selection through an ordered fallback chain.
//!
//! A sound preference is resolved by walking a list of [`ResolverStep`]s. Each
//! step names a candidate sound id and either yields a catalog-verified file,
//! terminates with explicit silence, or falls through to the next step.

use log::{debug, error, warn};

use crate::{
    alerts::{AlertSetting, DEFAULT_SOUND, NO_SOUND},
    sounds::{SoundCatalog, catalog::is_filename_safe},
};

/// Which preference of a setting is being resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SoundType {
    /// The alert at the event itself
    Main,
    /// The alert ahead of the event
    Pre,
    /// The alert at the iqama
    Iqama,
}

/// Origin of a candidate sound id.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tier {
    /// The type-specific preference
    Preference,
    /// The setting's general sound
    General,
    /// The application-wide default
    ApplicationDefault,
}

/// One entry of the fallback chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResolverStep<'a> {
    pub tier: Tier,
    /// Candidate id, `None` when the tier has nothing configured
    pub sound_id: Option<&'a str>,
}

enum StepOutcome {
    Sound(String),
    Silence,
    FallThrough,
}

/// Resolves sound preferences into sound files of a [`SoundCatalog`].
///
/// Every value returned is the path of a catalog entry and is filename-safe.
pub struct SoundResolver {
    catalog: SoundCatalog,
}

impl SoundResolver {
    pub fn new(catalog: SoundCatalog) -> Self {
        SoundResolver { catalog }
    }

    /// Resolves the `sound_type` sound of the setting `setting_id`.
    ///
    /// Returns `None` for explicit silence or when no tier resolves.
    pub fn resolve(
        &self,
        setting_id: &str,
        sound_type: SoundType,
        settings: &[AlertSetting],
    ) -> Option<String> {
        let setting = settings.iter().find(|setting| setting.id == setting_id);
        let preference = setting.map(|setting| match sound_type {
            SoundType::Main => setting.selected_sound.as_str(),
            SoundType::Pre => setting.pre_alert_sound.as_str(),
            SoundType::Iqama => setting.iqama_sound.as_str(),
        });

        let steps = self.steps(preference, setting);
        debug!("resolving {:?} sound of {} through {:?}", sound_type, setting_id, steps);
        self.evaluate(&steps)
    }

    /// Resolves the sound of a custom alert.
    ///
    /// The alert's own `sound_id` is the preference, the base prayer setting
    /// provides the general tier.
    pub fn resolve_custom(
        &self,
        sound_id: &str,
        base_setting_id: &str,
        settings: &[AlertSetting],
    ) -> Option<String> {
        let setting = settings.iter().find(|setting| setting.id == base_setting_id);
        let steps = self.steps(Some(sound_id), setting);
        self.evaluate(&steps)
    }

    /// Builds the fallback chain of a preference.
    pub fn steps<'a>(
        &'a self,
        preference: Option<&'a str>,
        setting: Option<&'a AlertSetting>,
    ) -> Vec<ResolverStep<'a>> {
        vec![
            ResolverStep {
                tier: Tier::Preference,
                sound_id: preference,
            },
            ResolverStep {
                tier: Tier::General,
                sound_id: setting.map(|setting| setting.selected_sound.as_str()),
            },
            ResolverStep {
                tier: Tier::ApplicationDefault,
                sound_id: Some(self.catalog.default_id()),
            },
        ]
    }

    /// Walks the chain until one step yields a sound or silence.
    fn evaluate(&self, steps: &[ResolverStep]) -> Option<String> {
        for step in steps {
            match self.evaluate_step(step) {
                StepOutcome::Sound(path) => return Some(path),
                StepOutcome::Silence => return None,
                StepOutcome::FallThrough => continue,
            }
        }

        error!(
            "no sound could be resolved, default sound {} is missing from the catalog",
            self.catalog.default_id()
        );
        None
    }

    fn evaluate_step(&self, step: &ResolverStep) -> StepOutcome {
        let Some(sound_id) = step.sound_id else {
            return StepOutcome::FallThrough;
        };

        match sound_id {
            // Only an explicit choice for this alert silences it
            NO_SOUND if step.tier == Tier::Preference => StepOutcome::Silence,
            NO_SOUND | DEFAULT_SOUND => StepOutcome::FallThrough,
            id => match self.catalog.get(id).and_then(|sound| sound.path.as_deref()) {
                Some(path) if is_filename_safe(path) => StepOutcome::Sound(path.to_string()),
                Some(path) => {
                    warn!("sound {} has an unsafe file name {:?}, skipping", id, path);
                    StepOutcome::FallThrough
                }
                None => {
                    warn!("{:?} sound {} is not in the catalog, skipping", step.tier, id);
                    StepOutcome::FallThrough
                }
            },
        }
    }
}
