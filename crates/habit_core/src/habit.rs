use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{HabitError, Result};
use crate::frequency::HabitFrequency;

pub type HabitId = Uuid;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum HabitKind {
    /// Done or not done.
    #[default]
    Simple,
    /// Done once the day's progress reaches `goal`.
    Quantitative,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Habit {
    pub id: HabitId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub creation_date: DateTime<Utc>,
    #[serde(flatten)]
    pub frequency: HabitFrequency,
    #[serde(default)]
    pub kind: HabitKind,
    #[serde(default = "default_goal")]
    pub goal: u32,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub reminder_enabled: bool,
    #[serde(default = "default_reminder_time")]
    pub reminder_time: NaiveTime,
}

/// Progress recorded for one habit on one calendar day.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HabitLog {
    pub habit_id: HabitId,
    pub date: NaiveDate,
    pub progress: u32,
}

/// Values coming out of the edit form, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HabitDraft {
    pub name: String,
    pub description: String,
    pub frequency: HabitFrequency,
    pub kind: HabitKind,
    pub goal: String,
    pub unit: String,
    pub reminder_enabled: bool,
    pub reminder_time: Option<NaiveTime>,
}

fn default_goal() -> u32 {
    1
}

fn default_reminder_time() -> NaiveTime {
    NaiveTime::from_hms_opt(9, 0, 0).unwrap_or(NaiveTime::MIN)
}

/// Parse a goal typed by the user. Anything that is not a positive integer
/// becomes 1.
pub fn coerce_goal(raw: &str) -> u32 {
    match raw.trim().parse::<i64>() {
        Ok(value) if value > 0 => u32::try_from(value).unwrap_or(u32::MAX),
        _ => 1,
    }
}

impl Habit {
    pub fn new(name: impl Into<String>, frequency: HabitFrequency) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: String::new(),
            creation_date: Utc::now(),
            frequency,
            kind: HabitKind::Simple,
            goal: default_goal(),
            unit: String::new(),
            reminder_enabled: false,
            reminder_time: default_reminder_time(),
        }
    }

    pub fn quantitative(
        name: impl Into<String>,
        frequency: HabitFrequency,
        goal: u32,
        unit: impl Into<String>,
    ) -> Self {
        Self {
            kind: HabitKind::Quantitative,
            goal: goal.max(1),
            unit: unit.into(),
            ..Self::new(name, frequency)
        }
    }

    pub fn with_creation_date(mut self, creation_date: DateTime<Utc>) -> Self {
        self.creation_date = creation_date;
        self
    }

    pub fn with_reminder(mut self, time: NaiveTime) -> Self {
        self.reminder_enabled = true;
        self.reminder_time = time;
        self
    }

    pub fn from_draft(draft: HabitDraft) -> Result<Self> {
        let mut habit = Habit::new(String::new(), HabitFrequency::Daily);
        habit.apply_draft(draft)?;
        Ok(habit)
    }

    /// Overwrite the editable fields. Identity and creation date are kept.
    pub fn apply_draft(&mut self, draft: HabitDraft) -> Result<()> {
        let name = draft.name.trim();
        if name.is_empty() {
            return Err(HabitError::EmptyName);
        }
        self.name = name.to_string();
        self.description = draft.description.trim().to_string();
        self.frequency = draft.frequency;
        self.kind = draft.kind;
        self.goal = coerce_goal(&draft.goal);
        self.unit = draft.unit.trim().to_string();
        self.reminder_enabled = draft.reminder_enabled;
        if let Some(time) = draft.reminder_time {
            self.reminder_time = time;
        }
        Ok(())
    }

    pub fn is_quantitative(&self) -> bool {
        self.kind == HabitKind::Quantitative
    }

    /// Goal as seen by completion checks; simple habits always need one unit.
    pub fn effective_goal(&self) -> u32 {
        match self.kind {
            HabitKind::Simple => 1,
            HabitKind::Quantitative => self.goal.max(1),
        }
    }
}

impl HabitLog {
    pub fn new(habit_id: HabitId, date: NaiveDate, progress: u32) -> Self {
        Self {
            habit_id,
            date,
            progress,
        }
    }

    /// Build a log from a wall-clock timestamp, keeping only its calendar day
    /// in the timestamp's own zone.
    pub fn at<Tz: TimeZone>(habit_id: HabitId, timestamp: &DateTime<Tz>, progress: u32) -> Self {
        Self::new(habit_id, timestamp.date_naive(), progress)
    }
}
