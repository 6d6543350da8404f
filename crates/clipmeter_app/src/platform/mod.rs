mod app;
pub mod cli;
mod input;
pub mod logging;
mod render;

pub use app::run_app;
