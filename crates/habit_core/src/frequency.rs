use std::collections::BTreeSet;

use chrono::Datelike;
use serde::{Deserialize, Serialize};

/// Day of the week numbered from Sunday (1) to Saturday (7).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Weekday {
    Sunday = 1,
    Monday = 2,
    Tuesday = 3,
    Wednesday = 4,
    Thursday = 5,
    Friday = 6,
    Saturday = 7,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Sunday,
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
    ];

    pub fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            1..=7 => Some(Self::ALL[usize::from(raw) - 1]),
            _ => None,
        }
    }

    pub fn raw(self) -> u8 {
        self as u8
    }

    pub fn label(self) -> &'static str {
        match self {
            Weekday::Sunday => "Sun",
            Weekday::Monday => "Mon",
            Weekday::Tuesday => "Tue",
            Weekday::Wednesday => "Wed",
            Weekday::Thursday => "Thu",
            Weekday::Friday => "Fri",
            Weekday::Saturday => "Sat",
        }
    }

    pub fn of(date: impl Datelike) -> Self {
        Self::from(date.weekday())
    }
}

impl From<chrono::Weekday> for Weekday {
    fn from(day: chrono::Weekday) -> Self {
        // number_from_sunday is always within 1..=7
        Self::ALL[day.number_from_sunday() as usize - 1]
    }
}

/// Schedule of a habit. Persisted through [`FrequencyRecord`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(from = "FrequencyRecord", into = "FrequencyRecord")]
pub enum HabitFrequency {
    #[default]
    Daily,
    Weekly(BTreeSet<Weekday>),
}

impl HabitFrequency {
    pub fn weekly(days: impl IntoIterator<Item = Weekday>) -> Self {
        HabitFrequency::Weekly(days.into_iter().collect())
    }

    pub fn includes(&self, day: Weekday) -> bool {
        match self {
            HabitFrequency::Daily => true,
            HabitFrequency::Weekly(days) => days.contains(&day),
        }
    }

    pub fn description(&self) -> String {
        match self {
            HabitFrequency::Daily => "Daily".to_string(),
            HabitFrequency::Weekly(days) if days.len() == Weekday::ALL.len() => {
                "Daily".to_string()
            }
            HabitFrequency::Weekly(days) if days.is_empty() => "No days".to_string(),
            HabitFrequency::Weekly(days) => days
                .iter()
                .map(|day| day.label())
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FrequencyType {
    Daily,
    Weekly,
}

/// Flat `{type, days}` pair the snapshot stores for a [`HabitFrequency`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FrequencyRecord {
    pub frequency_type: FrequencyType,
    #[serde(default)]
    pub frequency_days: Vec<u8>,
}

impl From<FrequencyRecord> for HabitFrequency {
    fn from(record: FrequencyRecord) -> Self {
        match record.frequency_type {
            FrequencyType::Daily => HabitFrequency::Daily,
            FrequencyType::Weekly => HabitFrequency::Weekly(
                record
                    .frequency_days
                    .into_iter()
                    .filter_map(Weekday::from_raw)
                    .collect(),
            ),
        }
    }
}

impl From<HabitFrequency> for FrequencyRecord {
    fn from(frequency: HabitFrequency) -> Self {
        match frequency {
            HabitFrequency::Daily => FrequencyRecord {
                frequency_type: FrequencyType::Daily,
                frequency_days: Vec::new(),
            },
            HabitFrequency::Weekly(days) => FrequencyRecord {
                frequency_type: FrequencyType::Weekly,
                // BTreeSet iteration is already sorted
                frequency_days: days.into_iter().map(Weekday::raw).collect(),
            },
        }
    }
}
