mod app;
pub mod config;
mod documents;
mod effects;
pub mod logging;
mod ui;

pub use app::run_app;
