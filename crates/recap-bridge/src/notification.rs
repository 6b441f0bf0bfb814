/// Severity or category for user-visible notifications.
///
/// This enum classifies notifications by their intent, allowing the host
/// surface to present them appropriately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationType {
    /// Neutral informational message that does not indicate success or failure.
    Info,
    /// Indicates a successful operation or positive outcome.
    Success,
    /// Indicates a non-critical issue that the user should be aware of, but
    /// does not prevent normal operation.
    Warning,
    /// Indicates an error or failure that may affect functionality.
    Error,
}

impl NotificationType {
    /// Stable lowercase name used on the wire towards the relay.
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationType::Info => "info",
            NotificationType::Success => "success",
            NotificationType::Warning => "warning",
            NotificationType::Error => "error",
        }
    }
}

/// A notification payload intended for the user.
#[derive(Debug, Clone)]
pub struct NotificationMessage {
    /// The type/severity of the notification.
    pub notification_type: NotificationType,
    /// The text content to display to the user.
    pub message: String,
}
