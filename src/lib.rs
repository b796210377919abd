//! Desktop beacon finder.
//!
//! Watches for one Bluetooth proximity beacon and shows how close it is:
//! the background turns green, blue, red or black with the reported
//! proximity and a status line gives the estimated distance.
//!
//! - [`domain`] - tracking state machine, presentation tables, settings
//! - [`infrastructure`] - beacon service, tracker thread, logging
//! - [`presentation`] - egui front end

pub mod domain;
pub mod infrastructure;
pub mod presentation;
