pub mod engine;
pub mod error;
pub mod frequency;
pub mod habit;
pub mod reminders;
pub mod service;
pub mod store;

pub use crate::engine::DayState;
pub use crate::error::{HabitError, Result};
pub use crate::frequency::{HabitFrequency, Weekday};
pub use crate::habit::{Habit, HabitDraft, HabitId, HabitKind, HabitLog};
pub use crate::reminders::{ReminderRequest, ReminderScheduler};
pub use crate::service::{HabitService, HabitServiceBuilder, HabitStats, TodayEntry};
pub use crate::store::{HabitStore, Snapshot};
