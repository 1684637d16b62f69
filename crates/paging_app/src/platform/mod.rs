mod app;
mod config;
mod effects;
mod logging;
mod source;

pub use app::run_app;
