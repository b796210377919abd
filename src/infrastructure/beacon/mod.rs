//! Beacon Module
//!
//! Connects the tracking controller to a beacon service.
//!
//! ## Architecture
//!
//! ```text
//!   UI thread                      tracker thread
//! ┌────────────┐  TrackerCommand  ┌──────────────────────┐
//! │  egui app  │ ───────────────► │     event loop       │
//! │            │                  │  TrackingController  │
//! │            │ ◄─────────────── │                      │
//! └────────────┘  DisplayUpdate   └──────────▲───────────┘
//!                                            │ BeaconEvent
//!                                 ┌──────────┴───────────┐
//!                                 │ SimulatedBeacon task │
//!                                 └──────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`simulated`] - Beacon service driven by a synthetic distance path
//! - [`worker`] - Tracker thread and its event loop

pub mod simulated;
pub mod worker;

pub use simulated::SimulatedBeaconProvider;
pub use worker::{run_event_loop, spawn_tracker, TrackerHandle};
