pub mod app;
pub mod components;
pub mod display;
pub mod theme;
