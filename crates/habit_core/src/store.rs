use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::{
    engine::{self, DayState},
    error::{HabitError, Result},
    habit::{Habit, HabitId, HabitLog},
};

/// On-disk form of the store.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Snapshot {
    pub habits: Vec<Habit>,
    #[serde(default)]
    pub logs: Vec<HabitLog>,
}

#[derive(Debug, Default)]
struct StoreState {
    habits: HashMap<HabitId, Habit>,
    logs: HashMap<HabitId, Vec<HabitLog>>,
}

/// Habits and their logs, optionally backed by a JSON snapshot file.
///
/// A habit owns its logs: removing the habit removes them under the same lock.
/// At most one log exists per habit and day, and no log is kept with zero
/// progress.
pub struct HabitStore {
    path: Option<PathBuf>,
    state: RwLock<StoreState>,
}

impl HabitStore {
    pub fn in_memory() -> Self {
        Self {
            path: None,
            state: RwLock::new(StoreState::default()),
        }
    }

    /// Open the snapshot at `path`. A missing file yields an empty store.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let snapshot = if path.exists() {
            let raw = fs::read_to_string(&path).map_err(|err| HabitError::io(&path, err))?;
            serde_json::from_str(&raw)?
        } else {
            debug!(path = %path.display(), "no snapshot yet, starting empty");
            Snapshot::default()
        };
        let store = Self::from_snapshot(snapshot);
        Ok(Self {
            path: Some(path),
            ..store
        })
    }

    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        let mut state = StoreState::default();
        for habit in snapshot.habits {
            state.logs.entry(habit.id).or_default();
            state.habits.insert(habit.id, habit);
        }
        for log in snapshot.logs {
            if log.progress == 0 {
                warn!(habit_id = %log.habit_id, day = %log.date, "dropping zero-progress log");
                continue;
            }
            let Some(logs) = state.logs.get_mut(&log.habit_id) else {
                warn!(habit_id = %log.habit_id, "dropping log for unknown habit");
                continue;
            };
            upsert(logs, log);
        }
        Self {
            path: None,
            state: RwLock::new(state),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn snapshot(&self) -> Snapshot {
        let state = self.state.read();
        let habits = sorted_by_creation(state.habits.values().cloned().collect());
        let logs = habits
            .iter()
            .flat_map(|habit| {
                let mut logs = state.logs.get(&habit.id).cloned().unwrap_or_default();
                logs.sort_by_key(|log| log.date);
                logs
            })
            .collect();
        Snapshot { habits, logs }
    }

    /// Write the snapshot file. Does nothing for in-memory stores.
    #[instrument(skip(self))]
    pub fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|err| HabitError::io(parent, err))?;
            }
        }
        let payload = serde_json::to_string_pretty(&self.snapshot())?;
        fs::write(path, payload).map_err(|err| HabitError::io(path, err))?;
        debug!(path = %path.display(), "snapshot written");
        Ok(())
    }

    /// Newest first.
    pub fn habits(&self) -> Vec<Habit> {
        let mut habits = self.habits_by_creation();
        habits.reverse();
        habits
    }

    /// Oldest first.
    pub fn habits_by_creation(&self) -> Vec<Habit> {
        sorted_by_creation(self.state.read().habits.values().cloned().collect())
    }

    pub fn habit(&self, id: HabitId) -> Result<Habit> {
        self.state
            .read()
            .habits
            .get(&id)
            .cloned()
            .ok_or(HabitError::NotFound(id))
    }

    pub fn logs_for(&self, id: HabitId) -> Vec<HabitLog> {
        self.state.read().logs.get(&id).cloned().unwrap_or_default()
    }

    pub fn insert_habit(&self, habit: Habit) {
        let mut state = self.state.write();
        debug!(habit_id = %habit.id, name = %habit.name, "inserting habit");
        state.logs.entry(habit.id).or_default();
        state.habits.insert(habit.id, habit);
    }

    pub fn update_habit(&self, habit: Habit) -> Result<()> {
        let mut state = self.state.write();
        let slot = state
            .habits
            .get_mut(&habit.id)
            .ok_or(HabitError::NotFound(habit.id))?;
        *slot = habit;
        Ok(())
    }

    /// Remove a habit together with all of its logs.
    pub fn delete_habit(&self, id: HabitId) -> Result<Habit> {
        let mut state = self.state.write();
        let habit = state.habits.remove(&id).ok_or(HabitError::NotFound(id))?;
        let removed = state.logs.remove(&id).map(|logs| logs.len()).unwrap_or(0);
        debug!(habit_id = %id, removed_logs = removed, "deleted habit");
        Ok(habit)
    }

    /// Flip a day between done and not done: an existing log is removed,
    /// otherwise a log with progress 1 is recorded.
    pub fn toggle_completion(&self, id: HabitId, day: NaiveDate) -> Result<DayState> {
        let mut state = self.state.write();
        let StoreState { habits, logs } = &mut *state;
        let habit = habits.get(&id).ok_or(HabitError::NotFound(id))?;
        let logs = logs.entry(id).or_default();
        if let Some(idx) = logs.iter().position(|log| log.date == day) {
            logs.swap_remove(idx);
            debug!(habit_id = %id, day = %day, "cleared completion");
        } else {
            logs.push(HabitLog::new(id, day, 1));
            debug!(habit_id = %id, day = %day, "recorded completion");
        }
        Ok(engine::day_state(habit, logs, day))
    }

    /// Store `progress` for the day. Zero removes the day's log.
    pub fn set_progress(&self, id: HabitId, day: NaiveDate, progress: u32) -> Result<DayState> {
        self.update_progress(id, day, |_| progress)
    }

    /// Add `delta` (possibly negative) to the day's progress, clamping at zero.
    pub fn adjust_progress(&self, id: HabitId, day: NaiveDate, delta: i64) -> Result<DayState> {
        self.update_progress(id, day, |current| {
            let next = i64::from(current).saturating_add(delta).max(0);
            u32::try_from(next).unwrap_or(u32::MAX)
        })
    }

    fn update_progress(
        &self,
        id: HabitId,
        day: NaiveDate,
        next: impl FnOnce(u32) -> u32,
    ) -> Result<DayState> {
        let mut state = self.state.write();
        let StoreState { habits, logs } = &mut *state;
        let habit = habits.get(&id).ok_or(HabitError::NotFound(id))?;
        let logs = logs.entry(id).or_default();
        let current = logs
            .iter()
            .find(|log| log.date == day)
            .map(|log| log.progress)
            .unwrap_or(0);
        let progress = next(current);
        if progress == 0 {
            logs.retain(|log| log.date != day);
        } else {
            upsert(logs, HabitLog::new(id, day, progress));
        }
        debug!(habit_id = %id, day = %day, from = current, to = progress, "progress updated");
        Ok(engine::day_state(habit, logs, day))
    }
}

fn upsert(logs: &mut Vec<HabitLog>, log: HabitLog) {
    match logs.iter_mut().find(|existing| existing.date == log.date) {
        Some(existing) => existing.progress = log.progress,
        None => logs.push(log),
    }
}

fn sorted_by_creation(mut habits: Vec<Habit>) -> Vec<Habit> {
    habits.sort_by(|a, b| {
        a.creation_date
            .cmp(&b.creation_date)
            .then_with(|| a.name.cmp(&b.name))
    });
    habits
}
