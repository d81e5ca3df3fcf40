//! Transient notifications and the palette busy indicator.

use serde::Serialize;

use crate::debounce::Millis;

/// How assistive technology should announce a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Alert,
    Status,
}

impl Severity {
    /// Error-phrased messages are alerts, everything else is a status update.
    pub fn classify(message: &str) -> Self {
        if message.starts_with("Error") || message.starts_with("Failed") {
            Severity::Alert
        } else {
            Severity::Status
        }
    }

    pub fn role(self) -> &'static str {
        match self {
            Severity::Alert => "alert",
            Severity::Status => "status",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub id: u64,
    pub message: String,
    pub severity: Severity,
}

/// Single-slot notification area.
///
/// A new message replaces the old one immediately and restarts the timer, so
/// only the latest message's dismissal can ever fire.
#[derive(Debug, Clone)]
pub struct Notifier {
    display_ms: Millis,
    current: Option<Notification>,
    visible: bool,
    dismiss_at: Option<(Millis, u64)>,
    next_id: u64,
}

impl Notifier {
    pub fn new(display_ms: Millis) -> Self {
        Self {
            display_ms,
            current: None,
            visible: false,
            dismiss_at: None,
            next_id: 1,
        }
    }

    pub fn notify(&mut self, message: impl Into<String>, now: Millis) -> u64 {
        let message = message.into();
        let id = self.next_id;
        self.next_id += 1;

        let severity = Severity::classify(&message);
        match severity {
            Severity::Alert => log::warn!("notify: {message}"),
            Severity::Status => log::info!("notify: {message}"),
        }

        self.current = Some(Notification { id, message, severity });
        self.visible = true;
        self.dismiss_at = Some((now.saturating_add(self.display_ms), id));
        id
    }

    /// Hide the notification whose timer expired, if it is still the one shown.
    pub fn tick(&mut self, now: Millis) {
        let Some((at, id)) = self.dismiss_at else {
            return;
        };
        if at > now {
            return;
        }
        self.dismiss_at = None;
        if self.current.as_ref().is_some_and(|n| n.id == id) {
            self.visible = false;
        }
    }

    pub fn deadline(&self) -> Option<Millis> {
        self.dismiss_at.map(|(at, _)| at)
    }

    /// The notification currently on screen.
    pub fn visible(&self) -> Option<&Notification> {
        self.current.as_ref().filter(|_| self.visible)
    }

    /// The last notification shown, even if it has since been dismissed.
    pub fn last(&self) -> Option<&Notification> {
        self.current.as_ref()
    }
}

/// Busy affordance on the palette container, bracketing extraction.
#[derive(Debug, Clone, Copy, Default)]
pub struct BusyIndicator {
    busy: bool,
}

impl BusyIndicator {
    pub fn set_busy(&mut self, busy: bool) {
        self.busy = busy;
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn aria_busy(&self) -> &'static str {
        if self.busy { "true" } else { "false" }
    }
}
