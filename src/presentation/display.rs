use crate::domain::models::{Color, DisplayUpdate, Icon, TrackingState};
use tokio::sync::mpsc;

/// Everything the screen shows. Owned and mutated by the UI thread only.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplaySurface {
    pub background: Color,
    pub status: String,
    pub icon: Icon,
    pub tracking: TrackingState,
    pub toggle_enabled: bool,
    pub fault: Option<String>,
}

impl Default for DisplaySurface {
    fn default() -> Self {
        Self {
            background: Color::Black,
            status: String::new(),
            icon: Icon::Searching,
            tracking: TrackingState::Idle,
            toggle_enabled: false,
            fault: None,
        }
    }
}

impl DisplaySurface {
    pub fn apply(&mut self, update: DisplayUpdate) {
        match update {
            DisplayUpdate::Background(color) => self.background = color,
            DisplayUpdate::Status(text) => self.status = text,
            DisplayUpdate::Icon(icon) => self.icon = icon,
            DisplayUpdate::Tracking(state) => {
                // A successful start or stop supersedes any earlier fault
                self.tracking = state;
                self.fault = None;
            }
            DisplayUpdate::ToggleEnabled(enabled) => self.toggle_enabled = enabled,
            DisplayUpdate::Fault(message) => self.fault = Some(message),
        }
    }

    /// Apply every queued update in arrival order, returning how many were applied
    pub fn drain(&mut self, updates: &mut mpsc::UnboundedReceiver<DisplayUpdate>) -> usize {
        let mut applied = 0;
        while let Ok(update) = updates.try_recv() {
            self.apply(update);
            applied += 1;
        }
        applied
    }

    pub fn toggle_label(&self) -> &'static str {
        self.tracking.toggle_label()
    }
}
