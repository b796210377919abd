pub mod beacon;
pub mod logging;
