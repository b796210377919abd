use crate::domain::error::TrackerError;
use std::fmt;

/// Beacon family identifier the application tracks by default.
pub const DEFAULT_BEACON_UUID: &str = "e2c56db5dffb48d2b060d0f5a71096e0";

pub const MONITORING_REGION_ID: &str = "target-monitoring";
pub const RANGING_REGION_ID: &str = "target-ranging";

/// Qualitative distance bucket reported by the beacon provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Proximity {
    Immediate,
    Near,
    Far,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrackingState {
    #[default]
    Idle,
    Searching,
}

impl TrackingState {
    /// Label of the toggle button while in this state
    pub fn toggle_label(&self) -> &'static str {
        match self {
            Self::Idle => "Start Tracking",
            Self::Searching => "Stop Tracking",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Green,
    Blue,
    Red,
    Black,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Icon {
    TargetClose,
    Searching,
}

/// 128-bit beacon family identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BeaconUuid([u8; 16]);

impl BeaconUuid {
    /// Parse 32 hex digits, with or without dashes
    pub fn parse(uuid_str: &str) -> Result<Self, TrackerError> {
        let hex = uuid_str.replace('-', "");

        if hex.len() != 32 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(TrackerError::InvalidUuid(uuid_str.to_string()));
        }

        let mut bytes = [0u8; 16];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16)
                .map_err(|_| TrackerError::InvalidUuid(uuid_str.to_string()))?;
        }

        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}

impl fmt::Display for BeaconUuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, byte) in self.0.iter().enumerate() {
            if matches!(i, 4 | 6 | 8 | 10) {
                f.write_str("-")?;
            }
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

/// Named scope over which monitoring or ranging is requested.
/// `None` for major/minor matches any value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    pub unique_id: String,
    pub uuid: BeaconUuid,
    pub major: Option<u16>,
    pub minor: Option<u16>,
}

impl Region {
    pub fn new(unique_id: impl Into<String>, uuid: BeaconUuid) -> Self {
        Self {
            unique_id: unique_id.into(),
            uuid,
            major: None,
            minor: None,
        }
    }
}

/// One beacon seen during a ranging pass
#[derive(Debug, Clone, PartialEq)]
pub struct BeaconObservation {
    pub uuid: BeaconUuid,
    pub major: u16,
    pub minor: u16,
    pub proximity: Proximity,
    /// Distance estimate in meters, negative when the provider has none
    pub accuracy: f64,
    pub rssi: i16,
}

/// Events pushed by a beacon provider into the tracker's queue
#[derive(Debug, Clone)]
pub enum BeaconEvent {
    /// The provider's scanning service is bound and accepts requests
    ServiceConnected,
    RegionEntered(Region),
    RegionExited(Region),
    Ranged {
        region: Region,
        beacons: Vec<BeaconObservation>,
    },
}

/// Changes to the display surface, applied on the UI thread only
#[derive(Debug, Clone, PartialEq)]
pub enum DisplayUpdate {
    Background(Color),
    Status(String),
    Icon(Icon),
    Tracking(TrackingState),
    ToggleEnabled(bool),
    Fault(String),
}

/// Commands sent from the UI to the tracker worker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerCommand {
    Toggle,
    Start,
    Stop,
    /// Stop tracking, release the provider and end the worker
    Shutdown,
}
