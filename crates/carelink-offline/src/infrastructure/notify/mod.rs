//! Notification surface the worker raises push messages through.

use crate::domain::worker::PushNotification;

pub mod mock;

/// Presents notifications to the user and opens app windows on click.
pub trait NotificationSink: Send + Sync {
    /// Shows the notification to the user.
    fn show(&self, notification: &PushNotification);

    /// Opens (or focuses) an app window at `url`.
    fn open_window(&self, url: &str);
}
