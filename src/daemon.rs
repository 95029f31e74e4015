//! Daemon wiring the scheduler to its collaborators.
//!
//! This module provides the [`Daemon`] run by `muezzin run`. It owns the
//! rescheduler, the timer dispatcher and the delivery side, and decides when a
//! rebuild is due.
//!
//! # Runtime Behavior
//!
//! Every `check_interval` seconds the daemon snapshots the settings store and
//! fingerprints it, then hands the local date and the fingerprint to
//! [`SchedulerState::evaluate`]. When a rebuild is due it is spawned on its own
//! task, so a slow provider never delays the next check. Concurrent rebuilds
//! are arbitrated by the [`Rescheduler`], the most recent one wins.
//!
//! A rebuild that fails, or that is submitted without some prayer times, is
//! reported back to the loop and retried at the next check.
//!
//! ```text
//! tick → snapshot → evaluate → (trigger) → rebuild → cancel all → schedule
//!   ↑                                         ↓                      ↓
//!   └──────────── failed, retry ──────────────┘      timer fires → push + sound
//! ```

use std::{path::PathBuf, sync::Arc, time::Duration};

use chrono::Utc;
use log::{debug, error, info, warn};
use tokio::{
    sync::{Mutex, mpsc},
    time,
};

use crate::{
    alerts::SettingsStore,
    config::Config,
    dispatch::{ConfigPermissionGate, PushNotifier, TimerDispatcher},
    prayers::AladhanProvider,
    rescheduler::{RebuildOutcome, Rescheduler, SchedulerState, Trigger, fingerprint},
    schedule::{NotificationDescriptor, ScheduleBuilder},
    sounds::{AudioError, AudioSession, SoundCatalog, SoundResolver},
};

/// Creates the schedule builder described by `config`.
pub fn create_builder(config: &Config) -> ScheduleBuilder {
    let provider = Arc::new(AladhanProvider::new(
        &config.provider.url,
        config.location.timezone,
    ));

    ScheduleBuilder::new(
        provider,
        config.calculation.clone(),
        config.location.timezone,
        SoundResolver::new(SoundCatalog::builtin()),
    )
}

/// Creates the callback delivering a fired notification.
///
/// The notification is pushed when a push url is configured, and its sound is
/// played through the shared audio session.
fn create_delivery(
    notifier: Option<PushNotifier>,
    audio: Arc<Mutex<AudioSession>>,
) -> impl Fn(NotificationDescriptor) + Send + Sync + 'static {
    move |descriptor: NotificationDescriptor| {
        let notifier = notifier.clone();
        let audio = Arc::clone(&audio);

        tokio::spawn(async move {
            if let Some(notifier) = notifier {
                if let Err(e) = notifier.notify(&descriptor).await {
                    error!("failed to push notification {}: {}", descriptor.id, e);
                }
            }

            let Some(sound_file) = descriptor.sound_file.as_deref() else {
                return;
            };
            match audio.lock().await.play(sound_file).await {
                Ok(()) => {}
                Err(AudioError::NoPlayer) => debug!("no player configured, {} not played", sound_file),
                Err(e) => error!("failed to play {}: {}", sound_file, e),
            }
        });
    }
}

/// Long running scheduler process.
///
/// # Examples
///
/// ```no_run
/// let config = Config::load("config.yaml")?;
/// let store = Arc::new(JsonSettingsStore::new("./muezzin-data".to_string()));
///
/// let daemon = Daemon::new(&config, store);
/// daemon.start().await; // Runs until ctrl-c
/// ```
pub struct Daemon {
    rescheduler: Arc<Rescheduler>,
    store: Arc<dyn SettingsStore>,
    dispatcher: Arc<TimerDispatcher>,
    /// Seconds between two evaluations
    check_interval: u64,
}

impl Daemon {
    /// Creates the daemon and every collaborator from `config`.
    ///
    /// # Arguments
    ///
    /// * `config` - Loaded configuration.
    /// * `store` - Settings store, shared with nothing else in the process.
    pub fn new(config: &Config, store: Arc<dyn SettingsStore>) -> Self {
        let audio = Arc::new(Mutex::new(AudioSession::new(
            config.notifications.player.clone(),
            PathBuf::from(&config.notifications.sounds_dir),
        )));
        let notifier = config.notifications.push_url.as_deref().map(PushNotifier::new);
        let dispatcher = Arc::new(TimerDispatcher::new(create_delivery(notifier, audio)));

        let rescheduler = Arc::new(Rescheduler::new(
            create_builder(config),
            Arc::clone(&store),
            dispatcher.clone(),
            Arc::new(ConfigPermissionGate::new(config.notifications.enabled)),
            config.location.location(),
        ));

        Daemon {
            rescheduler,
            store,
            dispatcher,
            check_interval: config.scheduler.check_interval.max(1),
        }
    }

    /// Runs the check loop until ctrl-c, then cancels every pending notification.
    pub async fn start(self) {
        info!("checking settings every {} seconds", self.check_interval);
        let mut interval = time::interval(Duration::from_secs(self.check_interval));
        let mut state = SchedulerState::default();
        let (failures_tx, mut failures_rx) = mpsc::unbounded_channel();

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    let (next, trigger) = self.tick(state).await;
                    state = next;
                    if let Some(trigger) = trigger {
                        self.spawn_rebuild(trigger, failures_tx.clone());
                    }
                }
                Some(trigger) = failures_rx.recv() => {
                    info!("rebuild on {} will be retried at the next check", trigger);
                    state = state.build_failed();
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("stopping");
                    break;
                }
            }
        }

        self.dispatcher.shutdown().await;
    }

    /// Evaluates the scheduler state against a fresh snapshot.
    async fn tick(&self, state: SchedulerState) -> (SchedulerState, Option<Trigger>) {
        let settings = self.store.load().await;
        let custom_alerts = self.store.load_custom().await;
        let location = self.rescheduler.current_location().await;

        let today = self.rescheduler.builder().today(Utc::now());
        let fingerprint = fingerprint(&settings, &custom_alerts, location.as_ref());
        debug!("evaluating {} with fingerprint {:08x}", today, fingerprint);

        state.evaluate(today, fingerprint)
    }

    /// Spawns the rebuild of `trigger`, sending the trigger to `failures` when
    /// it has to be retried.
    fn spawn_rebuild(&self, trigger: Trigger, failures: mpsc::UnboundedSender<Trigger>) {
        let rescheduler = Arc::clone(&self.rescheduler);

        tokio::spawn(async move {
            if !rebuild(&rescheduler, trigger).await && failures.send(trigger).is_err() {
                debug!("daemon stopped, rebuild on {} not retried", trigger);
            }
        });
    }
}

/// Runs the rebuild of `trigger` and logs its outcome.
///
/// Returns `false` when the notifications of the day could not all be
/// submitted and the rebuild should be retried.
async fn rebuild(rescheduler: &Rescheduler, trigger: Trigger) -> bool {
    match rescheduler.rebuild_and_submit(trigger).await {
        Ok(RebuildOutcome::Submitted(count)) => {
            debug!("rebuild on {} submitted {} notifications", trigger, count);
            true
        }
        Ok(RebuildOutcome::Partial(count)) => {
            warn!(
                "rebuild on {} submitted only {} notifications, prayer times missing",
                trigger, count
            );
            false
        }
        Ok(RebuildOutcome::Superseded) => {
            debug!("rebuild on {} superseded", trigger);
            true
        }
        Ok(RebuildOutcome::PermissionDenied) => {
            warn!("rebuild on {} skipped, notifications not permitted", trigger);
            true
        }
        Err(e) => {
            error!("rebuild on {} failed: {}", trigger, e);
            false
        }
    }
}
