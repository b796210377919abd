pub mod appearance;
pub mod error;
pub mod models;
pub mod provider;
pub mod settings;
pub mod sink;
pub mod tracking;
