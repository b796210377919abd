//! Simulated Beacon Service
//!
//! Stands in for a platform beacon SDK. A background task moves a virtual
//! beacon along a periodic path and reports region transitions and ranging
//! results for whichever regions are currently subscribed.

use crate::domain::error::ProviderError;
use crate::domain::models::{BeaconEvent, BeaconObservation, BeaconUuid, Proximity, Region};
use crate::domain::provider::BeaconProvider;
use crate::domain::settings::SimulationSettings;
use std::f64::consts::TAU;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Transmit power at one meter used to derive the synthetic RSSI
const TX_POWER_DBM: f64 = -59.0;

#[derive(Debug, Default)]
struct Subscriptions {
    bound: bool,
    monitoring: Option<Region>,
    ranging: Option<Region>,
    inside: bool,
}

pub struct SimulatedBeaconProvider {
    subscriptions: Arc<Mutex<Subscriptions>>,
    task: Option<JoinHandle<()>>,
}

impl SimulatedBeaconProvider {
    /// Start the simulated service. Must be called from within a tokio runtime.
    pub fn spawn(
        settings: SimulationSettings,
        uuid: BeaconUuid,
        events: mpsc::UnboundedSender<BeaconEvent>,
    ) -> Self {
        let subscriptions = Arc::new(Mutex::new(Subscriptions::default()));
        let task = tokio::spawn(run(subscriptions.clone(), settings, uuid, events));

        Self {
            subscriptions,
            task: Some(task),
        }
    }

    fn bound(&self) -> Result<MutexGuard<'_, Subscriptions>, ProviderError> {
        let subs = self
            .subscriptions
            .lock()
            .map_err(|_| ProviderError::Unavailable("subscription state poisoned".to_string()))?;
        if !subs.bound {
            return Err(ProviderError::NotBound);
        }
        Ok(subs)
    }
}

impl BeaconProvider for SimulatedBeaconProvider {
    fn start_monitoring(&mut self, region: &Region) -> Result<(), ProviderError> {
        let mut subs = self.bound()?;
        debug!(region = %region.unique_id, "Simulator: start monitoring");
        subs.monitoring = Some(region.clone());
        // First in-range scan reports an entry
        subs.inside = false;
        Ok(())
    }

    fn stop_monitoring(&mut self, region: &Region) -> Result<(), ProviderError> {
        let mut subs = self.bound()?;
        debug!(region = %region.unique_id, "Simulator: stop monitoring");
        subs.monitoring = None;
        Ok(())
    }

    fn start_ranging(&mut self, region: &Region) -> Result<(), ProviderError> {
        let mut subs = self.bound()?;
        debug!(region = %region.unique_id, "Simulator: start ranging");
        subs.ranging = Some(region.clone());
        Ok(())
    }

    fn stop_ranging(&mut self, region: &Region) -> Result<(), ProviderError> {
        let mut subs = self.bound()?;
        debug!(region = %region.unique_id, "Simulator: stop ranging");
        subs.ranging = None;
        Ok(())
    }

    fn unbind(&mut self) -> Result<(), ProviderError> {
        if let Some(task) = self.task.take() {
            info!("Unbinding simulated beacon service");
            task.abort();
        }
        if let Ok(mut subs) = self.subscriptions.lock() {
            *subs = Subscriptions::default();
        }
        Ok(())
    }
}

impl Drop for SimulatedBeaconProvider {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

async fn run(
    subscriptions: Arc<Mutex<Subscriptions>>,
    settings: SimulationSettings,
    uuid: BeaconUuid,
    events: mpsc::UnboundedSender<BeaconEvent>,
) {
    tokio::time::sleep(Duration::from_millis(settings.bind_delay_ms)).await;

    match subscriptions.lock() {
        Ok(mut subs) => subs.bound = true,
        Err(_) => return,
    }
    info!("Simulated beacon service bound");
    if events.send(BeaconEvent::ServiceConnected).is_err() {
        return;
    }

    let mut ticker = tokio::time::interval(Duration::from_millis(settings.scan_period_ms.max(1)));
    let started = Instant::now();

    loop {
        ticker.tick().await;
        let distance = path_distance(&settings, started.elapsed().as_secs_f64());

        let pending = match subscriptions.lock() {
            Ok(mut subs) => scan(&mut subs, &settings, uuid, distance),
            Err(_) => return,
        };

        for event in pending {
            if events.send(event).is_err() {
                debug!("Event receiver closed, stopping simulator");
                return;
            }
        }
    }
}

/// Events produced by one scan cycle with the beacon at `distance` meters
fn scan(
    subs: &mut Subscriptions,
    settings: &SimulationSettings,
    uuid: BeaconUuid,
    distance: f64,
) -> Vec<BeaconEvent> {
    let mut events = Vec::new();
    let in_range = distance <= settings.range_limit_m;

    if let Some(region) = &subs.monitoring {
        if in_range != subs.inside {
            events.push(if in_range {
                BeaconEvent::RegionEntered(region.clone())
            } else {
                BeaconEvent::RegionExited(region.clone())
            });
        }
    }
    subs.inside = in_range;

    if let Some(region) = &subs.ranging {
        let beacons = if in_range {
            vec![BeaconObservation {
                uuid,
                major: settings.major,
                minor: settings.minor,
                proximity: classify(distance),
                accuracy: distance,
                rssi: synthetic_rssi(distance),
            }]
        } else {
            Vec::new()
        };
        events.push(BeaconEvent::Ranged {
            region: region.clone(),
            beacons,
        });
    }

    events
}

/// Distance along the simulated path, starting at the closest point
fn path_distance(settings: &SimulationSettings, elapsed_s: f64) -> f64 {
    let min = settings.min_distance_m;
    let max = settings.max_distance_m.max(min);
    if settings.path_period_s <= 0.0 {
        return min;
    }

    let mid = (min + max) / 2.0;
    let amplitude = (max - min) / 2.0;
    mid - amplitude * (TAU * elapsed_s / settings.path_period_s).cos()
}

/// Conventional iBeacon buckets
fn classify(distance: f64) -> Proximity {
    if distance < 0.0 {
        Proximity::Unknown
    } else if distance < 0.5 {
        Proximity::Immediate
    } else if distance <= 4.0 {
        Proximity::Near
    } else {
        Proximity::Far
    }
}

fn synthetic_rssi(distance: f64) -> i16 {
    (TX_POWER_DBM - 20.0 * distance.max(0.1).log10()).round() as i16
}
