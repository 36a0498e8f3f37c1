pub mod app;

pub use crate::app::{render_report, run, AppConfig, TracingReminderScheduler};
