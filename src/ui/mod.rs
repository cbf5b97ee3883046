mod app;
mod dashboard;

pub use app::{App, ExitReason, UIConfig, run};
