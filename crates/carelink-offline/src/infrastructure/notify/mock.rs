//! Recording test double for the notification sink.

use std::sync::Mutex;

use crate::domain::worker::PushNotification;

use super::NotificationSink;

/// Records every shown notification and opened window for assertions.
#[derive(Default)]
pub struct RecordingNotificationSink {
    shown: Mutex<Vec<PushNotification>>,
    opened: Mutex<Vec<String>>,
}

impl RecordingNotificationSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shown(&self) -> Vec<PushNotification> {
        self.shown.lock().expect("notify sink lock poisoned").clone()
    }

    pub fn opened_windows(&self) -> Vec<String> {
        self.opened.lock().expect("notify sink lock poisoned").clone()
    }
}

impl NotificationSink for RecordingNotificationSink {
    fn show(&self, notification: &PushNotification) {
        self.shown
            .lock()
            .expect("notify sink lock poisoned")
            .push(notification.clone());
    }

    fn open_window(&self, url: &str) {
        self.opened
            .lock()
            .expect("notify sink lock poisoned")
            .push(url.to_string());
    }
}
