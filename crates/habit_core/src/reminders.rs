use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::habit::{Habit, HabitId};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReminderRequest {
    /// Keyed by habit so a later cancel can find it.
    pub identifier: HabitId,
    pub title: String,
    pub body: String,
    pub time: NaiveTime,
    pub repeats: bool,
}

impl ReminderRequest {
    pub fn daily_for(habit: &Habit) -> Self {
        Self {
            identifier: habit.id,
            title: "Time for your habit!".to_string(),
            body: habit.name.clone(),
            time: habit.reminder_time,
            repeats: true,
        }
    }
}

/// Platform-specific reminder adapters will implement this trait.
pub trait ReminderScheduler: Send + Sync {
    fn schedule(&self, request: ReminderRequest);
    fn cancel(&self, habit_id: HabitId);
}

/// Replace whatever reminder the habit had with one matching its settings.
pub fn sync_reminder(scheduler: &dyn ReminderScheduler, habit: &Habit) {
    scheduler.cancel(habit.id);
    if habit.reminder_enabled {
        scheduler.schedule(ReminderRequest::daily_for(habit));
    }
}
