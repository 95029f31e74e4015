//! Push delivery of fired notifications.

use log::debug;
use reqwest::Client;

use crate::{dispatch::DispatchError, schedule::NotificationDescriptor};

/// Posts fired notifications to an ntfy compatible topic url.
///
/// The descriptor title and kind travel in the `Title` and `Tags` headers,
/// the body is the request body. Silent notifications are sent with a low
/// priority.
///
/// # Examples
///
/// ```no_run
/// let notifier = PushNotifier::new("https://ntfy.sh/my-prayers");
/// notifier.notify(&descriptor).await?;
/// ```
#[derive(Clone)]
pub struct PushNotifier {
    url: String,
    client: Client,
}

impl PushNotifier {
    pub fn new(url: &str) -> Self {
        PushNotifier {
            url: url.to_string(),
            client: Client::new(),
        }
    }

    /// Sends `descriptor` to the topic.
    pub async fn notify(&self, descriptor: &NotificationDescriptor) -> Result<(), DispatchError> {
        let priority = match descriptor.sound_file {
            Some(_) => "default",
            None => "low",
        };

        let response = self
            .client
            .post(&self.url)
            .header("Title", descriptor.title.as_str())
            .header("Tags", descriptor.metadata.kind.channel())
            .header("Priority", priority)
            .body(descriptor.body.clone())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(DispatchError::Status(status.as_u16()));
        }

        debug!("pushed notification {}", descriptor.id);
        Ok(())
    }
}
