//! Proximity tracking state machine.
//!
//! The controller owns the on/off tracking state and turns provider events
//! into display updates. It never touches the display directly; every
//! change goes through the [`DisplaySink`] queue so the UI thread applies it.

use crate::domain::appearance::{color_for, icon_for};
use crate::domain::error::{ProviderError, ProviderOperation, TrackerError};
use crate::domain::models::{
    BeaconEvent, BeaconObservation, Color, Icon, Proximity, Region, TrackingState,
};
use crate::domain::provider::BeaconProvider;
use crate::domain::sink::DisplaySink;
use tracing::{debug, error, info};

pub const STATUS_SEARCHING: &str = "searching for target . . .";
pub const STATUS_STOPPED: &str = "no longer searching for target";
pub const STATUS_ACQUIRED: &str = "target acquired";
pub const STATUS_OUT_OF_RANGE: &str = "target out of range";

/// Largest magnitude a distance may have and still be formatted
const MAX_FORMATTABLE_DISTANCE: f64 = 7.922_816_251_426_434e28;

pub struct TrackingController<P> {
    provider: P,
    display: DisplaySink,
    monitoring_region: Region,
    ranging_region: Region,
    state: TrackingState,
    last_proximity: Option<Proximity>,
}

impl<P: BeaconProvider> TrackingController<P> {
    pub fn new(
        provider: P,
        display: DisplaySink,
        monitoring_region: Region,
        ranging_region: Region,
    ) -> Self {
        Self {
            provider,
            display,
            monitoring_region,
            ranging_region,
            state: TrackingState::Idle,
            last_proximity: None,
        }
    }

    pub fn state(&self) -> TrackingState {
        self.state
    }

    /// Classification seen in the most recent non-empty ranging update
    pub fn last_proximity(&self) -> Option<Proximity> {
        self.last_proximity
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Flip between searching and idle, as the tracking button does
    pub fn toggle(&mut self) -> Result<(), TrackerError> {
        match self.state {
            TrackingState::Idle => self.start(),
            TrackingState::Searching => self.stop(),
        }
    }

    /// Request monitoring and ranging for the target beacon
    pub fn start(&mut self) -> Result<(), TrackerError> {
        if self.state == TrackingState::Searching {
            debug!("Start requested while already searching, ignoring");
            return Ok(());
        }

        if let Err(e) = self.request_start() {
            error!(component = "TrackingController.start", error = %e, "Failed to start tracking");
            return Err(e);
        }

        self.state = TrackingState::Searching;
        info!(
            monitoring = %self.monitoring_region.unique_id,
            ranging = %self.ranging_region.unique_id,
            uuid = %self.monitoring_region.uuid,
            "Tracking started"
        );
        self.display.set_tracking(TrackingState::Searching);
        self.display.set_status(STATUS_SEARCHING);
        Ok(())
    }

    /// Cancel monitoring and ranging and reset the background
    pub fn stop(&mut self) -> Result<(), TrackerError> {
        if self.state == TrackingState::Idle {
            debug!("Stop requested while idle, ignoring");
            return Ok(());
        }

        if let Err(e) = self.request_stop() {
            error!(component = "TrackingController.stop", error = %e, "Failed to stop tracking");
            return Err(e);
        }

        self.state = TrackingState::Idle;
        info!("Tracking stopped");
        self.display.set_tracking(TrackingState::Idle);
        self.display.set_status(STATUS_STOPPED);
        self.display.set_background(Color::Black);
        Ok(())
    }

    /// Dispatch a provider event.
    ///
    /// Region and ranging events that arrive while idle were produced before
    /// the provider stopped and are dropped.
    pub fn handle_event(&mut self, event: BeaconEvent) -> Result<(), TrackerError> {
        if self.state == TrackingState::Idle && !matches!(event, BeaconEvent::ServiceConnected) {
            debug!("Dropping stale event while idle: {:?}", event);
            return Ok(());
        }

        match event {
            BeaconEvent::ServiceConnected => {
                self.on_service_connected();
                Ok(())
            }
            BeaconEvent::RegionEntered(region) => {
                debug!(region = %region.unique_id, "Region entered");
                self.on_region_entered();
                Ok(())
            }
            BeaconEvent::RegionExited(region) => {
                debug!(region = %region.unique_id, "Region exited");
                self.on_region_exited();
                Ok(())
            }
            BeaconEvent::Ranged { region, beacons } => {
                debug!(region = %region.unique_id, count = beacons.len(), "Ranging update");
                self.on_ranging_update(&beacons)
            }
        }
    }

    /// The provider is bound; tracking may now be toggled
    pub fn on_service_connected(&mut self) {
        info!("Beacon service connected");
        self.display.set_toggle_enabled(true);
    }

    pub fn on_region_entered(&mut self) {
        self.display.set_status(STATUS_ACQUIRED);
    }

    pub fn on_region_exited(&mut self) {
        self.display.set_status(STATUS_OUT_OF_RANGE);
        self.display.set_icon(Icon::Searching);
    }

    /// Present the first observation of a ranging pass.
    ///
    /// An empty pass changes nothing. Beacons after the first are ignored.
    pub fn on_ranging_update(&mut self, beacons: &[BeaconObservation]) -> Result<(), TrackerError> {
        let Some(beacon) = beacons.first() else {
            return Ok(());
        };

        self.display.set_background(color_for(beacon.proximity));

        let distance = format_distance(beacon.accuracy).map_err(|e| {
            error!(
                component = "TrackingController.on_ranging_update",
                error = %e,
                "Failed to process ranging update"
            );
            e
        })?;
        self.display
            .set_status(format!("target is about {} meters away", distance));
        self.display.set_icon(icon_for(beacon.proximity));
        self.last_proximity = Some(beacon.proximity);
        Ok(())
    }

    /// Stop tracking if needed, then release the provider.
    ///
    /// The provider is unbound even when stopping fails; the first error wins.
    pub fn shutdown(&mut self) -> Result<(), TrackerError> {
        let stopped = self.stop();
        let unbound = self.provider.unbind().map_err(|e| {
            error!(component = "TrackingController.shutdown", error = %e, "Failed to unbind provider");
            TrackerError::Unbind(e)
        });
        stopped.and(unbound)
    }

    fn request_start(&mut self) -> Result<(), TrackerError> {
        self.provider
            .start_monitoring(&self.monitoring_region)
            .map_err(|e| provider_failure(ProviderOperation::StartMonitoring, &self.monitoring_region, e))?;
        self.provider
            .start_ranging(&self.ranging_region)
            .map_err(|e| provider_failure(ProviderOperation::StartRanging, &self.ranging_region, e))?;
        Ok(())
    }

    fn request_stop(&mut self) -> Result<(), TrackerError> {
        self.provider
            .stop_monitoring(&self.monitoring_region)
            .map_err(|e| provider_failure(ProviderOperation::StopMonitoring, &self.monitoring_region, e))?;
        self.provider
            .stop_ranging(&self.ranging_region)
            .map_err(|e| provider_failure(ProviderOperation::StopRanging, &self.ranging_region, e))?;
        Ok(())
    }
}

fn provider_failure(operation: ProviderOperation, region: &Region, source: ProviderError) -> TrackerError {
    TrackerError::ProviderCall {
        operation,
        region: region.unique_id.clone(),
        source,
    }
}

/// Render a distance in meters with the `#.##` pattern.
///
/// The value is first normalised to 15 significant digits, then rounded half
/// away from zero to two decimals. Trailing fractional zeros and a leading
/// zero integer part are dropped, so 0.5 renders as ".5" and 3.0 as "3".
/// Anything that rounds to zero renders as "0".
pub fn format_distance(meters: f64) -> Result<String, TrackerError> {
    if !meters.is_finite() || meters.abs() >= MAX_FORMATTABLE_DISTANCE {
        return Err(TrackerError::RangingHandler(format!(
            "accuracy {} is out of range",
            meters
        )));
    }

    let scientific = format!("{:.14e}", meters.abs());
    let (mantissa, exponent) = scientific
        .split_once('e')
        .ok_or_else(|| TrackerError::RangingHandler(format!("cannot format accuracy {}", meters)))?;
    let exponent: i32 = exponent
        .parse()
        .map_err(|_| TrackerError::RangingHandler(format!("cannot format accuracy {}", meters)))?;
    let digits: Vec<u32> = mantissa.chars().filter_map(|c| c.to_digit(10)).collect();

    // digits[0] is worth 10^exponent, so the hundredths digit is at exponent + 2
    let kept = exponent + 3;
    let mut hundredths: u128 = 0;
    for i in 0..kept.max(0) as usize {
        hundredths = hundredths * 10 + u128::from(digits.get(i).copied().unwrap_or(0));
    }
    let next = if kept >= 0 {
        digits.get(kept as usize).copied().unwrap_or(0)
    } else {
        0
    };
    if next >= 5 {
        hundredths += 1;
    }

    let whole = hundredths / 100;
    let fraction = hundredths % 100;

    let mut text = String::new();
    if whole > 0 {
        text.push_str(&whole.to_string());
    }
    if fraction > 0 {
        text.push('.');
        if fraction % 10 == 0 {
            text.push_str(&(fraction / 10).to_string());
        } else {
            text.push_str(&format!("{:02}", fraction));
        }
    }

    if text.is_empty() {
        return Ok("0".to_string());
    }
    if meters < 0.0 {
        text.insert(0, '-');
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{BeaconUuid, DisplayUpdate, DEFAULT_BEACON_UUID};
    use tokio::sync::mpsc;

    #[derive(Default)]
    struct RecordingProvider {
        calls: Vec<(ProviderOperation, String)>,
        fail_on: Option<(ProviderOperation, ProviderError)>,
        unbound: bool,
    }

    impl RecordingProvider {
        fn record(&mut self, operation: ProviderOperation, region: &Region) -> Result<(), ProviderError> {
            if let Some((op, err)) = &self.fail_on {
                if *op == operation {
                    return Err(err.clone());
                }
            }
            self.calls.push((operation, region.unique_id.clone()));
            Ok(())
        }
    }

    impl BeaconProvider for RecordingProvider {
        fn start_monitoring(&mut self, region: &Region) -> Result<(), ProviderError> {
            self.record(ProviderOperation::StartMonitoring, region)
        }
        fn stop_monitoring(&mut self, region: &Region) -> Result<(), ProviderError> {
            self.record(ProviderOperation::StopMonitoring, region)
        }
        fn start_ranging(&mut self, region: &Region) -> Result<(), ProviderError> {
            self.record(ProviderOperation::StartRanging, region)
        }
        fn stop_ranging(&mut self, region: &Region) -> Result<(), ProviderError> {
            self.record(ProviderOperation::StopRanging, region)
        }
        fn unbind(&mut self) -> Result<(), ProviderError> {
            self.unbound = true;
            Ok(())
        }
    }

    fn controller(
        provider: RecordingProvider,
    ) -> (
        TrackingController<RecordingProvider>,
        mpsc::UnboundedReceiver<DisplayUpdate>,
    ) {
        let uuid = BeaconUuid::parse(DEFAULT_BEACON_UUID).unwrap();
        let (sink, rx) = DisplaySink::channel();
        let controller = TrackingController::new(
            provider,
            sink,
            Region::new("target-monitoring", uuid),
            Region::new("target-ranging", uuid),
        );
        (controller, rx)
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<DisplayUpdate>) -> Vec<DisplayUpdate> {
        let mut updates = Vec::new();
        while let Ok(update) = rx.try_recv() {
            updates.push(update);
        }
        updates
    }

    fn observation(proximity: Proximity, accuracy: f64) -> BeaconObservation {
        BeaconObservation {
            uuid: BeaconUuid::parse(DEFAULT_BEACON_UUID).unwrap(),
            major: 1,
            minor: 1,
            proximity,
            accuracy,
            rssi: -60,
        }
    }

    #[test]
    fn test_start_requests_monitoring_then_ranging() {
        let (mut controller, mut rx) = controller(RecordingProvider::default());
        controller.start().unwrap();

        assert_eq!(controller.state(), TrackingState::Searching);
        assert_eq!(
            controller.provider().calls,
            vec![
                (ProviderOperation::StartMonitoring, "target-monitoring".to_string()),
                (ProviderOperation::StartRanging, "target-ranging".to_string()),
            ]
        );
        assert_eq!(
            drain(&mut rx),
            vec![
                DisplayUpdate::Tracking(TrackingState::Searching),
                DisplayUpdate::Status(STATUS_SEARCHING.to_string()),
            ]
        );
    }

    #[test]
    fn test_start_then_stop_resets_background() {
        let (mut controller, mut rx) = controller(RecordingProvider::default());
        controller.start().unwrap();
        controller
            .on_ranging_update(&[observation(Proximity::Immediate, 0.3)])
            .unwrap();
        controller.stop().unwrap();

        assert_eq!(controller.state(), TrackingState::Idle);
        let updates = drain(&mut rx);
        assert_eq!(updates.last(), Some(&DisplayUpdate::Background(Color::Black)));
        assert!(updates.contains(&DisplayUpdate::Tracking(TrackingState::Idle)));
    }

    #[test]
    fn test_double_stop_is_noop() {
        let (mut controller, mut rx) = controller(RecordingProvider::default());
        controller.start().unwrap();
        controller.stop().unwrap();
        let calls_after_first_stop = controller.provider().calls.len();
        drain(&mut rx);

        controller.stop().unwrap();
        assert_eq!(controller.state(), TrackingState::Idle);
        assert_eq!(controller.provider().calls.len(), calls_after_first_stop);
        assert!(drain(&mut rx).is_empty());
    }

    #[test]
    fn test_stop_while_idle_issues_no_calls() {
        let (mut controller, _rx) = controller(RecordingProvider::default());
        controller.stop().unwrap();
        assert!(controller.provider().calls.is_empty());
        assert_eq!(controller.state(), TrackingState::Idle);
    }

    #[test]
    fn test_start_failure_keeps_idle() {
        let provider = RecordingProvider {
            fail_on: Some((ProviderOperation::StartRanging, ProviderError::NotBound)),
            ..Default::default()
        };
        let (mut controller, mut rx) = controller(provider);

        let err = controller.start().unwrap_err();
        match err {
            TrackerError::ProviderCall {
                operation, region, source,
            } => {
                assert_eq!(operation, ProviderOperation::StartRanging);
                assert_eq!(region, "target-ranging");
                assert_eq!(source, ProviderError::NotBound);
            }
            other => panic!("unexpected error {:?}", other),
        }
        assert_eq!(controller.state(), TrackingState::Idle);
        assert!(drain(&mut rx).is_empty());
    }

    #[test]
    fn test_stop_failure_keeps_searching() {
        let provider = RecordingProvider {
            fail_on: Some((
                ProviderOperation::StopMonitoring,
                ProviderError::PermissionDenied("bluetooth".into()),
            )),
            ..Default::default()
        };
        let (mut controller, _rx) = controller(provider);
        controller.start().unwrap();

        assert!(controller.stop().is_err());
        assert_eq!(controller.state(), TrackingState::Searching);
    }

    #[test]
    fn test_toggle_alternates() {
        let (mut controller, _rx) = controller(RecordingProvider::default());
        controller.toggle().unwrap();
        assert_eq!(controller.state(), TrackingState::Searching);
        controller.toggle().unwrap();
        assert_eq!(controller.state(), TrackingState::Idle);
    }

    #[test]
    fn test_immediate_ranging_update() {
        let (mut controller, mut rx) = controller(RecordingProvider::default());
        controller
            .on_ranging_update(&[observation(Proximity::Immediate, 0.5)])
            .unwrap();

        assert_eq!(
            drain(&mut rx),
            vec![
                DisplayUpdate::Background(Color::Green),
                DisplayUpdate::Status("target is about .5 meters away".to_string()),
                DisplayUpdate::Icon(Icon::TargetClose),
            ]
        );
        assert_eq!(controller.last_proximity(), Some(Proximity::Immediate));
    }

    #[test]
    fn test_far_ranging_update_rounds_accuracy() {
        let (mut controller, mut rx) = controller(RecordingProvider::default());
        controller
            .on_ranging_update(&[observation(Proximity::Far, 12.345)])
            .unwrap();

        assert_eq!(
            drain(&mut rx),
            vec![
                DisplayUpdate::Background(Color::Red),
                DisplayUpdate::Status("target is about 12.35 meters away".to_string()),
                DisplayUpdate::Icon(Icon::Searching),
            ]
        );
    }

    #[test]
    fn test_only_first_observation_is_used() {
        let (mut controller, mut rx) = controller(RecordingProvider::default());
        controller
            .on_ranging_update(&[
                observation(Proximity::Near, 2.0),
                observation(Proximity::Immediate, 0.1),
            ])
            .unwrap();

        let updates = drain(&mut rx);
        assert_eq!(updates[0], DisplayUpdate::Background(Color::Blue));
        assert_eq!(controller.last_proximity(), Some(Proximity::Near));
    }

    #[test]
    fn test_empty_ranging_update_is_noop() {
        let (mut controller, mut rx) = controller(RecordingProvider::default());
        controller.on_ranging_update(&[]).unwrap();
        assert!(drain(&mut rx).is_empty());
        assert_eq!(controller.last_proximity(), None);
    }

    #[test]
    fn test_region_exit_resets_icon() {
        let (mut controller, mut rx) = controller(RecordingProvider::default());
        controller
            .on_ranging_update(&[observation(Proximity::Immediate, 0.2)])
            .unwrap();
        drain(&mut rx);

        controller.on_region_exited();
        assert_eq!(
            drain(&mut rx),
            vec![
                DisplayUpdate::Status(STATUS_OUT_OF_RANGE.to_string()),
                DisplayUpdate::Icon(Icon::Searching),
            ]
        );
    }

    #[test]
    fn test_region_enter_and_service_connected() {
        let (mut controller, mut rx) = controller(RecordingProvider::default());
        controller.handle_event(BeaconEvent::ServiceConnected).unwrap();
        controller.on_region_entered();
        assert_eq!(
            drain(&mut rx),
            vec![
                DisplayUpdate::ToggleEnabled(true),
                DisplayUpdate::Status(STATUS_ACQUIRED.to_string()),
            ]
        );
        assert_eq!(controller.state(), TrackingState::Idle);
    }

    #[test]
    fn test_unformattable_accuracy_fails_handler() {
        let (mut controller, mut rx) = controller(RecordingProvider::default());
        let err = controller
            .on_ranging_update(&[observation(Proximity::Near, f64::NAN)])
            .unwrap_err();
        assert!(matches!(err, TrackerError::RangingHandler(_)));
        assert_eq!(drain(&mut rx), vec![DisplayUpdate::Background(Color::Blue)]);
        assert_eq!(controller.last_proximity(), None);
    }

    #[test]
    fn test_stale_events_dropped_while_idle() {
        let (mut controller, mut rx) = controller(RecordingProvider::default());
        let uuid = BeaconUuid::parse(DEFAULT_BEACON_UUID).unwrap();
        controller
            .handle_event(BeaconEvent::Ranged {
                region: Region::new("target-ranging", uuid),
                beacons: vec![observation(Proximity::Immediate, 0.3)],
            })
            .unwrap();
        controller
            .handle_event(BeaconEvent::RegionEntered(Region::new("target-monitoring", uuid)))
            .unwrap();
        controller
            .handle_event(BeaconEvent::RegionExited(Region::new("target-monitoring", uuid)))
            .unwrap();

        assert!(drain(&mut rx).is_empty());
        assert_eq!(controller.last_proximity(), None);
    }

    #[test]
    fn test_ranging_after_stop_keeps_black_background() {
        let (mut controller, mut rx) = controller(RecordingProvider::default());
        let uuid = BeaconUuid::parse(DEFAULT_BEACON_UUID).unwrap();
        controller.start().unwrap();
        controller.stop().unwrap();
        controller
            .handle_event(BeaconEvent::Ranged {
                region: Region::new("target-ranging", uuid),
                beacons: vec![observation(Proximity::Immediate, 0.3)],
            })
            .unwrap();

        let updates = drain(&mut rx);
        assert_eq!(updates.last(), Some(&DisplayUpdate::Background(Color::Black)));
        assert_eq!(controller.state(), TrackingState::Idle);
    }

    #[test]
    fn test_shutdown_unbinds_when_stop_fails() {
        let provider = RecordingProvider {
            fail_on: Some((
                ProviderOperation::StopRanging,
                ProviderError::Unavailable("radio off".into()),
            )),
            ..Default::default()
        };
        let (mut controller, _rx) = controller(provider);
        controller.start().unwrap();

        let err = controller.shutdown().unwrap_err();
        assert!(matches!(
            err,
            TrackerError::ProviderCall {
                operation: ProviderOperation::StopRanging,
                ..
            }
        ));
        assert!(controller.provider().unbound);
    }

    #[test]
    fn test_shutdown_stops_and_unbinds() {
        let (mut controller, _rx) = controller(RecordingProvider::default());
        controller.start().unwrap();
        controller.shutdown().unwrap();
        assert_eq!(controller.state(), TrackingState::Idle);
        assert!(controller.provider().unbound);
    }

    #[test]
    fn test_format_distance() {
        assert_eq!(format_distance(0.5).unwrap(), ".5");
        assert_eq!(format_distance(12.345).unwrap(), "12.35");
        assert_eq!(format_distance(3.0).unwrap(), "3");
        assert_eq!(format_distance(2.999).unwrap(), "3");
        assert_eq!(format_distance(1.05).unwrap(), "1.05");
        assert_eq!(format_distance(0.005).unwrap(), ".01");
        assert_eq!(format_distance(0.004).unwrap(), "0");
        assert_eq!(format_distance(0.0).unwrap(), "0");
        assert_eq!(format_distance(-1.0).unwrap(), "-1");
        assert_eq!(format_distance(1234.5678).unwrap(), "1234.57");
    }

    #[test]
    fn test_format_distance_rejects_non_finite() {
        assert!(format_distance(f64::INFINITY).is_err());
        assert!(format_distance(f64::NAN).is_err());
        assert!(format_distance(1e30).is_err());
    }
}
