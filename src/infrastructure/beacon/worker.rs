//! Tracker Worker
//!
//! Runs the tracking controller on its own thread. UI commands and provider
//! events arrive on two queues and are handled one at a time, so controller
//! handlers never overlap.

use crate::domain::models::{BeaconEvent, TrackerCommand};
use crate::domain::provider::BeaconProvider;
use crate::domain::settings::Settings;
use crate::domain::sink::DisplaySink;
use crate::domain::tracking::TrackingController;
use crate::infrastructure::beacon::simulated::SimulatedBeaconProvider;
use anyhow::Result;
use std::thread::JoinHandle;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

pub struct TrackerHandle {
    commands: mpsc::UnboundedSender<TrackerCommand>,
    thread: Option<JoinHandle<()>>,
}

impl TrackerHandle {
    /// Sender the UI uses to drive the tracker
    pub fn commands(&self) -> mpsc::UnboundedSender<TrackerCommand> {
        self.commands.clone()
    }

    pub fn send(&self, command: TrackerCommand) {
        if self.commands.send(command).is_err() {
            warn!("Tracker worker is gone, dropping {:?}", command);
        }
    }

    /// Stop tracking and wait for the worker thread to finish
    pub fn shutdown(mut self) {
        self.send(TrackerCommand::Shutdown);
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                error!("Tracker thread panicked");
            }
        }
    }
}

/// Spawn the tracker thread with the simulated beacon service
pub fn spawn_tracker(settings: &Settings, display: DisplaySink) -> Result<TrackerHandle> {
    let (monitoring_region, ranging_region) = settings.regions()?;
    let simulation = settings.simulation.clone();
    let (command_tx, command_rx) = mpsc::unbounded_channel();

    let thread = std::thread::Builder::new()
        .name("beacon-tracker".to_string())
        .spawn(move || {
            let rt = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(rt) => rt,
                Err(e) => {
                    error!("Failed to create tokio runtime for beacon tracking: {}", e);
                    display.report_fault(format!("Beacon tracking unavailable: {}", e));
                    return;
                }
            };

            rt.block_on(async move {
                let (event_tx, event_rx) = mpsc::unbounded_channel();
                let provider =
                    SimulatedBeaconProvider::spawn(simulation, monitoring_region.uuid, event_tx);
                let controller = TrackingController::new(
                    provider,
                    display.clone(),
                    monitoring_region,
                    ranging_region,
                );
                run_event_loop(controller, display, command_rx, event_rx).await;
            });
        })?;

    Ok(TrackerHandle {
        commands: command_tx,
        thread: Some(thread),
    })
}

/// Feed commands and provider events to the controller until shutdown.
///
/// A failing handler is reported to the display as a fault and the loop
/// moves on to the next message. Queued events take priority over commands.
/// A closed command queue counts as shutdown.
pub async fn run_event_loop<P: BeaconProvider>(
    mut controller: TrackingController<P>,
    display: DisplaySink,
    mut commands: mpsc::UnboundedReceiver<TrackerCommand>,
    mut events: mpsc::UnboundedReceiver<BeaconEvent>,
) -> TrackingController<P> {
    info!("Tracker loop started");

    loop {
        // Events already queued are handled before the next command
        tokio::select! {
            biased;

            Some(event) = events.recv() => {
                if let Err(e) = controller.handle_event(event) {
                    display.report_fault(e.to_string());
                }
            }
            command = commands.recv() => {
                let command = command.unwrap_or(TrackerCommand::Shutdown);
                debug!("Tracker command: {:?}", command);

                let result = match command {
                    TrackerCommand::Toggle => controller.toggle(),
                    TrackerCommand::Start => controller.start(),
                    TrackerCommand::Stop => controller.stop(),
                    TrackerCommand::Shutdown => {
                        if let Err(e) = controller.shutdown() {
                            display.report_fault(e.to_string());
                        }
                        break;
                    }
                };

                if let Err(e) = result {
                    display.report_fault(e.to_string());
                }
            }
        }
    }

    info!("Tracker loop finished");
    controller
}
