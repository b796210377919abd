use crate::domain::models::{Color, DisplayUpdate, Icon, TrackingState};
use tokio::sync::mpsc;
use tracing::trace;

/// Producer side of the display-update queue.
///
/// Any thread may hold a clone; only the UI thread drains the receiver.
#[derive(Debug, Clone)]
pub struct DisplaySink {
    sender: mpsc::UnboundedSender<DisplayUpdate>,
}

impl DisplaySink {
    pub fn new(sender: mpsc::UnboundedSender<DisplayUpdate>) -> Self {
        Self { sender }
    }

    /// Create a sink together with the receiver the UI drains
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<DisplayUpdate>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }

    pub fn set_background(&self, color: Color) {
        self.send(DisplayUpdate::Background(color));
    }

    pub fn set_status(&self, text: impl Into<String>) {
        self.send(DisplayUpdate::Status(text.into()));
    }

    pub fn set_icon(&self, icon: Icon) {
        self.send(DisplayUpdate::Icon(icon));
    }

    pub fn set_tracking(&self, state: TrackingState) {
        self.send(DisplayUpdate::Tracking(state));
    }

    pub fn set_toggle_enabled(&self, enabled: bool) {
        self.send(DisplayUpdate::ToggleEnabled(enabled));
    }

    pub fn report_fault(&self, message: impl Into<String>) {
        self.send(DisplayUpdate::Fault(message.into()));
    }

    fn send(&self, update: DisplayUpdate) {
        if let Err(e) = self.sender.send(update) {
            trace!("Display closed, dropping update {:?}", e.0);
        }
    }
}
