//! Last-write-wins rebuild and submission of the notifications.

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use chrono::{DateTime, Utc};
use log::{error, info, warn};
use tokio::sync::Mutex;

use crate::{
    alerts::SettingsStore,
    dispatch::{NotificationDispatcher, PermissionGate},
    prayers::Location,
    rescheduler::{RescheduleError, Trigger},
    schedule::ScheduleBuilder,
};

/// Result of a rebuild that ran to its end.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RebuildOutcome {
    /// The dispatcher now holds this many notifications from this rebuild
    Submitted(usize),
    /// Submitted, but prayer times were missing for some dates and the
    /// categories depending on them are absent
    Partial(usize),
    /// A more recent rebuild started meanwhile, this one was discarded
    Superseded,
    /// Notifications are not permitted, nothing was built
    PermissionDenied,
}

/// Runs rebuilds and hands their result to the dispatcher.
///
/// Rebuilds may run concurrently. Each one takes a generation number when it
/// starts; only the one holding the latest generation when it reaches the
/// submit section is submitted. The submit section itself is serialized, so
/// two `cancel_all`/`schedule` sequences never interleave.
///
/// # Examples
///
/// ```no_run
/// let rescheduler = Arc::new(Rescheduler::new(builder, store, dispatcher, permission, None));
/// tokio::spawn(async move { rescheduler.rebuild_and_submit(Trigger::Startup).await });
/// ```
pub struct Rescheduler {
    builder: ScheduleBuilder,
    store: Arc<dyn SettingsStore>,
    dispatcher: Arc<dyn NotificationDispatcher>,
    permission: Arc<dyn PermissionGate>,
    /// Location used when the store has no override
    configured_location: Option<Location>,
    generation: AtomicU64,
    submit_lock: Mutex<()>,
}

impl Rescheduler {
    pub fn new(
        builder: ScheduleBuilder,
        store: Arc<dyn SettingsStore>,
        dispatcher: Arc<dyn NotificationDispatcher>,
        permission: Arc<dyn PermissionGate>,
        configured_location: Option<Location>,
    ) -> Self {
        Rescheduler {
            builder,
            store,
            dispatcher,
            permission,
            configured_location,
            generation: AtomicU64::new(0),
            submit_lock: Mutex::new(()),
        }
    }

    pub fn builder(&self) -> &ScheduleBuilder {
        &self.builder
    }

    /// Location override of the store, or the configured one.
    pub async fn current_location(&self) -> Option<Location> {
        match self.store.load_location().await {
            Some(location) => Some(location),
            None => self.configured_location,
        }
    }

    /// Rebuilds the notifications of today and tomorrow and submits them.
    pub async fn rebuild_and_submit(&self, trigger: Trigger) -> Result<RebuildOutcome, RescheduleError> {
        self.rebuild_and_submit_at(trigger, Utc::now()).await
    }

    /// Same as [`Rescheduler::rebuild_and_submit`] with an explicit `now`.
    pub async fn rebuild_and_submit_at(
        &self,
        trigger: Trigger,
        now: DateTime<Utc>,
    ) -> Result<RebuildOutcome, RescheduleError> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        info!("rebuilding notifications on {} (generation {})", trigger, generation);

        if !self.permission.check().await && !self.permission.request().await {
            warn!("notifications are not permitted, nothing scheduled");
            return Ok(RebuildOutcome::PermissionDenied);
        }

        let settings = self.store.load().await;
        let custom_alerts = self.store.load_custom().await;
        let location = self
            .current_location()
            .await
            .ok_or(RescheduleError::MissingLocation)?;

        let today = self.builder.today(now);
        let schedule = self
            .builder
            .build(&location, today, now, &settings, &custom_alerts)
            .await?;
        let complete = schedule.is_complete();
        let descriptors = schedule.descriptors;

        let _guard = self.submit_lock.lock().await;
        if self.generation.load(Ordering::SeqCst) != generation {
            info!("generation {} superseded, discarding its build", generation);
            return Ok(RebuildOutcome::Superseded);
        }

        let count = descriptors.len();
        self.dispatcher.cancel_all().await.inspect_err(|e| {
            error!("failed to cancel pending notifications: {}", e);
        })?;
        self.dispatcher.schedule(descriptors).await.inspect_err(|e| {
            error!("failed to schedule {} notifications: {}", count, e);
        })?;

        let pending = self.dispatcher.get_pending().await;
        info!(
            "submitted {} notifications for generation {}, {} pending",
            count,
            generation,
            pending.len()
        );

        if complete {
            Ok(RebuildOutcome::Submitted(count))
        } else {
            warn!(
                "generation {} is missing prayer times of {:?}",
                generation, schedule.missing_dates
            );
            Ok(RebuildOutcome::Partial(count))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        alerts::{MockSettingsStore, default_settings},
        dispatch::{DispatchError, MockNotificationDispatcher, MockPermissionGate},
        prayers::{
            CalculationParameters, MockPrayerEventProvider, PrayerEventProvider, PrayerTimes,
            ProviderError,
        },
        schedule::ScheduleError,
        sounds::{SoundCatalog, SoundResolver},
    };
    use async_trait::async_trait;
    use chrono::{NaiveDate, TimeZone};
    use std::sync::atomic::{AtomicBool, AtomicUsize};
    use tokio::sync::Notify;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 11, 0, 0, 0).unwrap()
    }

    fn times_on(date: NaiveDate) -> PrayerTimes {
        let time = |hour, minute| date.and_hms_opt(hour, minute, 0).unwrap().and_utc();
        PrayerTimes {
            date,
            fajr: time(5, 0),
            sunrise: time(6, 0),
            dhuhr: time(12, 0),
            asr: time(15, 0),
            maghrib: time(18, 0),
            isha: time(19, 30),
        }
    }

    fn location() -> Location {
        Location {
            latitude: 21.4225,
            longitude: 39.8262,
        }
    }

    fn create_builder(provider: Arc<dyn PrayerEventProvider>) -> ScheduleBuilder {
        ScheduleBuilder::new(
            provider,
            CalculationParameters {
                method: Some(4),
                ..Default::default()
            },
            chrono_tz::UTC,
            SoundResolver::new(SoundCatalog::builtin()),
        )
    }

    fn working_provider() -> Arc<dyn PrayerEventProvider> {
        let mut provider = MockPrayerEventProvider::new();
        provider
            .expect_compute()
            .returning(|_, date, _| Ok(times_on(date)));
        Arc::new(provider)
    }

    fn create_store(location: Option<Location>) -> MockSettingsStore {
        let mut store = MockSettingsStore::new();
        store.expect_load().returning(default_settings);
        store.expect_load_custom().returning(Vec::new);
        store.expect_load_location().returning(move || location);
        store
    }

    fn granted() -> MockPermissionGate {
        let mut permission = MockPermissionGate::new();
        permission.expect_check().returning(|| true);
        permission
    }

    fn create_rescheduler(
        provider: Arc<dyn PrayerEventProvider>,
        store: MockSettingsStore,
        dispatcher: MockNotificationDispatcher,
        permission: MockPermissionGate,
    ) -> Rescheduler {
        Rescheduler::new(
            create_builder(provider),
            Arc::new(store),
            Arc::new(dispatcher),
            Arc::new(permission),
            None,
        )
    }

    #[tokio::test]
    async fn test_cancel_then_schedule() {
        let mut sequence = mockall::Sequence::new();
        let mut dispatcher = MockNotificationDispatcher::new();
        dispatcher
            .expect_cancel_all()
            .times(1)
            .in_sequence(&mut sequence)
            .returning(|| Ok(()));
        dispatcher
            .expect_schedule()
            .times(1)
            .in_sequence(&mut sequence)
            .withf(|descriptors| descriptors.len() == 12)
            .returning(|_| Ok(()));
        dispatcher
            .expect_get_pending()
            .times(1)
            .returning(Vec::new);

        let rescheduler = create_rescheduler(
            working_provider(),
            create_store(Some(location())),
            dispatcher,
            granted(),
        );

        let outcome = rescheduler
            .rebuild_and_submit_at(Trigger::Startup, now())
            .await
            .unwrap();
        assert_eq!(outcome, RebuildOutcome::Submitted(12));
    }

    #[tokio::test]
    async fn test_permission_requested_when_missing() {
        let mut permission = MockPermissionGate::new();
        permission.expect_check().returning(|| false);
        permission.expect_request().times(1).returning(|| false);
        let mut dispatcher = MockNotificationDispatcher::new();
        dispatcher.expect_cancel_all().never();
        dispatcher.expect_schedule().never();

        let rescheduler = create_rescheduler(
            working_provider(),
            create_store(Some(location())),
            dispatcher,
            permission,
        );

        let outcome = rescheduler
            .rebuild_and_submit_at(Trigger::Startup, now())
            .await
            .unwrap();
        assert_eq!(outcome, RebuildOutcome::PermissionDenied);
    }

    #[tokio::test]
    async fn test_permission_granted_on_request() {
        let mut permission = MockPermissionGate::new();
        permission.expect_check().returning(|| false);
        permission.expect_request().times(1).returning(|| true);
        let mut dispatcher = MockNotificationDispatcher::new();
        dispatcher.expect_cancel_all().returning(|| Ok(()));
        dispatcher.expect_schedule().returning(|_| Ok(()));
        dispatcher.expect_get_pending().returning(Vec::new);

        let rescheduler = create_rescheduler(
            working_provider(),
            create_store(Some(location())),
            dispatcher,
            permission,
        );

        let outcome = rescheduler
            .rebuild_and_submit_at(Trigger::SettingsChanged, now())
            .await
            .unwrap();
        assert!(matches!(outcome, RebuildOutcome::Submitted(_)));
    }

    #[tokio::test]
    async fn test_configured_location_is_fallback() {
        let mut dispatcher = MockNotificationDispatcher::new();
        dispatcher.expect_cancel_all().returning(|| Ok(()));
        dispatcher.expect_schedule().returning(|_| Ok(()));
        dispatcher.expect_get_pending().returning(Vec::new);

        let rescheduler = Rescheduler::new(
            create_builder(working_provider()),
            Arc::new(create_store(None)),
            Arc::new(dispatcher),
            Arc::new(granted()),
            Some(location()),
        );

        assert_eq!(rescheduler.current_location().await, Some(location()));
        assert!(
            rescheduler
                .rebuild_and_submit_at(Trigger::Startup, now())
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn test_missing_location() {
        let mut dispatcher = MockNotificationDispatcher::new();
        dispatcher.expect_cancel_all().never();

        let rescheduler =
            create_rescheduler(working_provider(), create_store(None), dispatcher, granted());

        let result = rescheduler.rebuild_and_submit_at(Trigger::Startup, now()).await;
        assert!(matches!(result, Err(RescheduleError::MissingLocation)));
    }

    #[tokio::test]
    async fn test_precondition_error_keeps_previous_notifications() {
        let mut dispatcher = MockNotificationDispatcher::new();
        dispatcher.expect_cancel_all().never();
        dispatcher.expect_schedule().never();
        let invalid = Location {
            latitude: 120.0,
            longitude: 0.0,
        };

        let rescheduler = create_rescheduler(
            working_provider(),
            create_store(Some(invalid)),
            dispatcher,
            granted(),
        );

        let result = rescheduler.rebuild_and_submit_at(Trigger::Startup, now()).await;
        assert!(matches!(
            result,
            Err(RescheduleError::Schedule(ScheduleError::InvalidLocation(_)))
        ));
    }

    #[tokio::test]
    async fn test_dispatch_failure_is_surfaced() {
        let mut dispatcher = MockNotificationDispatcher::new();
        dispatcher.expect_cancel_all().returning(|| Ok(()));
        dispatcher
            .expect_schedule()
            .returning(|_| Err(DispatchError::Closed));
        dispatcher.expect_get_pending().never();

        let rescheduler = create_rescheduler(
            working_provider(),
            create_store(Some(location())),
            dispatcher,
            granted(),
        );

        let result = rescheduler.rebuild_and_submit_at(Trigger::Startup, now()).await;
        assert!(matches!(
            result,
            Err(RescheduleError::Dispatch(DispatchError::Closed))
        ));
    }

    #[tokio::test]
    async fn test_provider_failure_is_partial() {
        let mut provider = MockPrayerEventProvider::new();
        provider.expect_compute().returning(|_, date, _| {
            if date == now().date_naive() {
                Err(ProviderError::Api(503))
            } else {
                Ok(times_on(date))
            }
        });
        let mut dispatcher = MockNotificationDispatcher::new();
        dispatcher.expect_cancel_all().times(1).returning(|| Ok(()));
        dispatcher
            .expect_schedule()
            .times(1)
            .withf(|descriptors| descriptors.len() == 6)
            .returning(|_| Ok(()));
        dispatcher.expect_get_pending().returning(Vec::new);

        let rescheduler = create_rescheduler(
            Arc::new(provider),
            create_store(Some(location())),
            dispatcher,
            granted(),
        );

        let outcome = rescheduler
            .rebuild_and_submit_at(Trigger::Startup, now())
            .await
            .unwrap();
        assert_eq!(outcome, RebuildOutcome::Partial(6));
    }

    /// Provider holding its answers until released while `blocked` is set.
    struct GatedProvider {
        blocked: AtomicBool,
        waiting: AtomicUsize,
        release: Notify,
    }

    #[async_trait]
    impl PrayerEventProvider for GatedProvider {
        async fn compute(
            &self,
            _location: &Location,
            date: NaiveDate,
            _params: &CalculationParameters,
        ) -> Result<PrayerTimes, ProviderError> {
            if self.blocked.load(Ordering::SeqCst) {
                let released = self.release.notified();
                self.waiting.fetch_add(1, Ordering::SeqCst);
                released.await;
            }
            Ok(times_on(date))
        }
    }

    #[tokio::test]
    async fn test_older_rebuild_is_superseded() {
        let provider = Arc::new(GatedProvider {
            blocked: AtomicBool::new(true),
            waiting: AtomicUsize::new(0),
            release: Notify::new(),
        });
        let mut dispatcher = MockNotificationDispatcher::new();
        dispatcher.expect_cancel_all().times(1).returning(|| Ok(()));
        dispatcher.expect_schedule().times(1).returning(|_| Ok(()));
        dispatcher.expect_get_pending().returning(Vec::new);

        let rescheduler = Arc::new(create_rescheduler(
            provider.clone(),
            create_store(Some(location())),
            dispatcher,
            granted(),
        ));

        let first = {
            let rescheduler = Arc::clone(&rescheduler);
            tokio::spawn(async move {
                rescheduler
                    .rebuild_and_submit_at(Trigger::Startup, now())
                    .await
            })
        };
        while provider.waiting.load(Ordering::SeqCst) < 3 {
            tokio::task::yield_now().await;
        }

        provider.blocked.store(false, Ordering::SeqCst);
        let second = rescheduler
            .rebuild_and_submit_at(Trigger::SettingsChanged, now())
            .await
            .unwrap();
        assert_eq!(second, RebuildOutcome::Submitted(12));

        provider.release.notify_waiters();
        let first = first.await.unwrap().unwrap();
        assert_eq!(first, RebuildOutcome::Superseded);
    }
}
