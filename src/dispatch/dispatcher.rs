//! Notification dispatch contract and its timer based implementation.

use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use chrono::Utc;
use log::{debug, info};
use mockall::automock;
use tokio::{sync::Mutex, task::JoinHandle, time};

use crate::{dispatch::DispatchError, schedule::NotificationDescriptor};

/// Receives the notifications of a rebuild.
///
/// The rescheduler always calls [`NotificationDispatcher::cancel_all`] before
/// [`NotificationDispatcher::schedule`], so a dispatcher never has to diff.
#[automock]
#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    /// Schedules every descriptor at its `scheduled_at`.
    ///
    /// A descriptor whose id is already pending replaces it.
    async fn schedule(&self, descriptors: Vec<NotificationDescriptor>) -> Result<(), DispatchError>;

    /// Cancels every pending notification.
    async fn cancel_all(&self) -> Result<(), DispatchError>;

    /// Returns the notifications not delivered yet.
    async fn get_pending(&self) -> Vec<NotificationDescriptor>;
}

type OnFire = Arc<dyn Fn(NotificationDescriptor) + Send + Sync>;

struct PendingNotification {
    descriptor: NotificationDescriptor,
    handle: JoinHandle<()>,
}

/// Dispatcher running one tokio timer per notification.
///
/// When a timer expires the descriptor is handed to the `on_fire` callback.
/// Descriptors already due when scheduled fire right away.
///
/// # Examples
///
/// ```no_run
/// let dispatcher = TimerDispatcher::new(|descriptor| {
///     println!("{}", descriptor);
/// });
/// dispatcher.schedule(descriptors).await?;
/// ```
pub struct TimerDispatcher {
    /// Pending notifications by id
    pending: Mutex<HashMap<i32, PendingNotification>>,
    on_fire: OnFire,
    closed: AtomicBool,
}

impl TimerDispatcher {
    pub fn new<F>(on_fire: F) -> Self
    where
        F: Fn(NotificationDescriptor) + Send + Sync + 'static,
    {
        TimerDispatcher {
            pending: Mutex::new(HashMap::new()),
            on_fire: Arc::new(on_fire),
            closed: AtomicBool::new(false),
        }
    }

    /// Cancels every timer and rejects further scheduling.
    pub async fn shutdown(&self) {
        self.closed.store(true, Ordering::SeqCst);
        let mut pending = self.pending.lock().await;
        pending.drain().for_each(|(_, notification)| notification.handle.abort());
        info!("dispatcher shut down");
    }

    fn spawn_timer(&self, descriptor: NotificationDescriptor) -> JoinHandle<()> {
        let on_fire = Arc::clone(&self.on_fire);
        let delay = (descriptor.scheduled_at - Utc::now())
            .to_std()
            .unwrap_or(Duration::ZERO);

        tokio::spawn(async move {
            debug!("waiting {}s before notification {}", delay.as_secs(), descriptor.id);
            time::sleep(delay).await;

            info!("firing {}", descriptor);
            on_fire(descriptor);
        })
    }
}

#[async_trait]
impl NotificationDispatcher for TimerDispatcher {
    async fn schedule(&self, descriptors: Vec<NotificationDescriptor>) -> Result<(), DispatchError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(DispatchError::Closed);
        }

        let mut pending = self.pending.lock().await;
        for descriptor in descriptors {
            if let Some(previous) = pending.remove(&descriptor.id) {
                previous.handle.abort();
            }
            let handle = self.spawn_timer(descriptor.clone());
            pending.insert(descriptor.id, PendingNotification { descriptor, handle });
        }

        Ok(())
    }

    async fn cancel_all(&self) -> Result<(), DispatchError> {
        let mut pending = self.pending.lock().await;
        let count = pending.len();
        pending.drain().for_each(|(_, notification)| notification.handle.abort());
        debug!("cancelled {} notifications", count);

        Ok(())
    }

    async fn get_pending(&self) -> Vec<NotificationDescriptor> {
        let mut pending = self.pending.lock().await;
        pending.retain(|_, notification| !notification.handle.is_finished());

        let mut descriptors: Vec<NotificationDescriptor> = pending
            .values()
            .map(|notification| notification.descriptor.clone())
            .collect();
        descriptors.sort_by_key(|descriptor| (descriptor.scheduled_at, descriptor.id));
        descriptors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::{AlertKind, Metadata};
    use chrono::{DateTime, TimeDelta};
    use tokio::sync::mpsc;

    fn create_descriptor(id: i32, scheduled_at: DateTime<Utc>) -> NotificationDescriptor {
        NotificationDescriptor {
            id,
            scheduled_at,
            title: "Fajr".to_string(),
            body: "It is time for Fajr".to_string(),
            sound_file: None,
            channel: Some("silent".to_string()),
            metadata: Metadata {
                kind: AlertKind::Prayer,
                name: "fajr".to_string(),
            },
        }
    }

    fn create_dispatcher() -> (TimerDispatcher, mpsc::UnboundedReceiver<NotificationDescriptor>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let dispatcher = TimerDispatcher::new(move |descriptor| {
            let _ = sender.send(descriptor);
        });
        (dispatcher, receiver)
    }

    #[tokio::test]
    async fn test_schedule_and_cancel_all() {
        let (dispatcher, _receiver) = create_dispatcher();
        let later = Utc::now() + TimeDelta::hours(1);

        dispatcher
            .schedule(vec![
                create_descriptor(2, later + TimeDelta::minutes(1)),
                create_descriptor(1, later),
            ])
            .await
            .unwrap();
        let ids: Vec<i32> = dispatcher.get_pending().await.iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![1, 2]);

        dispatcher.cancel_all().await.unwrap();
        assert!(dispatcher.get_pending().await.is_empty());
    }

    #[tokio::test]
    async fn test_same_id_replaces_pending() {
        let (dispatcher, _receiver) = create_dispatcher();
        let later = Utc::now() + TimeDelta::hours(1);

        dispatcher
            .schedule(vec![create_descriptor(1, later)])
            .await
            .unwrap();
        dispatcher
            .schedule(vec![create_descriptor(1, later + TimeDelta::hours(1))])
            .await
            .unwrap();

        let pending = dispatcher.get_pending().await;
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].scheduled_at, later + TimeDelta::hours(1));
    }

    #[tokio::test]
    async fn test_due_notification_fires() {
        let (dispatcher, mut receiver) = create_dispatcher();
        let descriptor = create_descriptor(7, Utc::now() - TimeDelta::seconds(1));

        dispatcher.schedule(vec![descriptor.clone()]).await.unwrap();

        assert_eq!(receiver.recv().await, Some(descriptor));
        time::sleep(Duration::from_millis(10)).await;
        assert!(dispatcher.get_pending().await.is_empty());
    }

    #[tokio::test]
    async fn test_schedule_after_shutdown() {
        let (dispatcher, _receiver) = create_dispatcher();
        dispatcher
            .schedule(vec![create_descriptor(1, Utc::now() + TimeDelta::hours(1))])
            .await
            .unwrap();

        dispatcher.shutdown().await;

        assert!(dispatcher.get_pending().await.is_empty());
        let result = dispatcher
            .schedule(vec![create_descriptor(2, Utc::now())])
            .await;
        assert!(matches!(result, Err(DispatchError::Closed)));
    }
}
