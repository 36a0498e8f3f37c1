use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::{
    engine::{self, DayState},
    error::Result,
    habit::{Habit, HabitDraft, HabitId},
    reminders::{self, ReminderScheduler},
    store::HabitStore,
};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TodayEntry {
    pub habit: Habit,
    pub state: DayState,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HabitStats {
    pub habit_id: HabitId,
    pub name: String,
    pub current_streak: u32,
    pub completion_percentage: f64,
}

/// Edit, delete, logging and reporting flows on top of a [`HabitStore`].
///
/// Every mutation is written back to the snapshot file when one is configured.
pub struct HabitService {
    store: HabitStore,
    reminder_scheduler: Option<Box<dyn ReminderScheduler>>,
}

#[derive(Default)]
pub struct HabitServiceBuilder {
    snapshot_path: Option<PathBuf>,
    reminder_scheduler: Option<Box<dyn ReminderScheduler>>,
}

impl HabitServiceBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snapshot(mut self, path: impl AsRef<Path>) -> Self {
        self.snapshot_path = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn with_reminder_scheduler(mut self, scheduler: Box<dyn ReminderScheduler>) -> Self {
        self.reminder_scheduler = Some(scheduler);
        self
    }

    pub fn build(self) -> Result<HabitService> {
        let store = match &self.snapshot_path {
            Some(path) => HabitStore::open(path)?,
            None => HabitStore::in_memory(),
        };
        Ok(HabitService {
            store,
            reminder_scheduler: self.reminder_scheduler,
        })
    }
}

impl HabitService {
    pub fn builder() -> HabitServiceBuilder {
        HabitServiceBuilder::new()
    }

    pub fn store(&self) -> &HabitStore {
        &self.store
    }

    /// Newest first.
    pub fn habits(&self) -> Vec<Habit> {
        self.store.habits()
    }

    pub fn habit(&self, id: HabitId) -> Result<Habit> {
        self.store.habit(id)
    }

    /// First habit whose name matches, ignoring case and surrounding blanks.
    pub fn find_by_name(&self, name: &str) -> Option<Habit> {
        let wanted = name.trim();
        self.store
            .habits_by_creation()
            .into_iter()
            .find(|habit| habit.name.eq_ignore_ascii_case(wanted))
    }

    #[instrument(skip(self, draft), fields(name = %draft.name))]
    pub fn create_habit(&self, draft: HabitDraft) -> Result<Habit> {
        let habit = Habit::from_draft(draft)?;
        self.store.insert_habit(habit.clone());
        self.sync_reminder(&habit);
        self.store.save()?;
        info!(habit_id = %habit.id, "habit created");
        Ok(habit)
    }

    #[instrument(skip(self, draft))]
    pub fn update_habit(&self, id: HabitId, draft: HabitDraft) -> Result<Habit> {
        let mut habit = self.store.habit(id)?;
        habit.apply_draft(draft)?;
        self.store.update_habit(habit.clone())?;
        self.sync_reminder(&habit);
        self.store.save()?;
        info!(habit_id = %id, "habit updated");
        Ok(habit)
    }

    /// Delete a habit, its logs and its reminder.
    #[instrument(skip(self))]
    pub fn delete_habit(&self, id: HabitId) -> Result<()> {
        let habit = self.store.delete_habit(id)?;
        if let Some(scheduler) = &self.reminder_scheduler {
            scheduler.cancel(habit.id);
        }
        self.store.save()?;
        info!(habit_id = %id, name = %habit.name, "habit deleted");
        Ok(())
    }

    #[instrument(skip(self))]
    pub fn toggle_completion(&self, id: HabitId, day: NaiveDate) -> Result<DayState> {
        let state = self.store.toggle_completion(id, day)?;
        self.store.save()?;
        Ok(state)
    }

    #[instrument(skip(self))]
    pub fn set_progress(&self, id: HabitId, day: NaiveDate, progress: u32) -> Result<DayState> {
        let state = self.store.set_progress(id, day, progress)?;
        self.store.save()?;
        Ok(state)
    }

    #[instrument(skip(self))]
    pub fn adjust_progress(&self, id: HabitId, day: NaiveDate, delta: i64) -> Result<DayState> {
        let state = self.store.adjust_progress(id, day, delta)?;
        self.store.save()?;
        Ok(state)
    }

    /// Habits due on `today` with their progress for the day, oldest first.
    pub fn today(&self, today: NaiveDate) -> Vec<TodayEntry> {
        let habits = self.store.habits_by_creation();
        engine::todays_habits(&habits, today)
            .into_iter()
            .map(|habit| {
                let logs = self.store.logs_for(habit.id);
                let state = engine::day_state(habit, &logs, today);
                TodayEntry {
                    habit: habit.clone(),
                    state,
                }
            })
            .collect()
    }

    /// Streak and completion rate per habit, oldest first.
    pub fn stats(&self, as_of: NaiveDate, window_days: u32) -> Vec<HabitStats> {
        self.store
            .habits_by_creation()
            .into_iter()
            .map(|habit| {
                let logs = self.store.logs_for(habit.id);
                HabitStats {
                    habit_id: habit.id,
                    current_streak: engine::current_streak(&habit, &logs, as_of),
                    completion_percentage: engine::completion_percentage(
                        &habit,
                        &logs,
                        window_days,
                        as_of,
                    ),
                    name: habit.name,
                }
            })
            .collect()
    }

    fn sync_reminder(&self, habit: &Habit) {
        if let Some(scheduler) = &self.reminder_scheduler {
            reminders::sync_reminder(scheduler.as_ref(), habit);
        }
    }
}
