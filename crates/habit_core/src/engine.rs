//! Pure scheduling and completion queries.
//!
//! Every function takes the habit and its logs explicitly so callers can
//! evaluate them against any store, or none at all.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::frequency::Weekday;
use crate::habit::{Habit, HabitKind, HabitLog};

/// Per-day progress state of a habit.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum DayState {
    NoLog,
    Partial { progress: u32 },
    Complete { progress: u32 },
}

impl DayState {
    pub fn is_complete(&self) -> bool {
        matches!(self, DayState::Complete { .. })
    }

    pub fn progress(&self) -> u32 {
        match self {
            DayState::NoLog => 0,
            DayState::Partial { progress } | DayState::Complete { progress } => *progress,
        }
    }
}

pub fn is_due(habit: &Habit, date: NaiveDate) -> bool {
    habit.frequency.includes(Weekday::of(date))
}

/// Log recorded for `habit` on the calendar day of `date`, if any.
pub fn log_for_day<'a>(
    habit: &Habit,
    logs: &'a [HabitLog],
    date: NaiveDate,
) -> Option<&'a HabitLog> {
    logs.iter()
        .find(|log| log.habit_id == habit.id && log.date == date)
}

pub fn is_completed(habit: &Habit, logs: &[HabitLog], date: NaiveDate) -> bool {
    let Some(log) = log_for_day(habit, logs, date) else {
        return false;
    };
    match habit.kind {
        HabitKind::Simple => log.progress > 0,
        HabitKind::Quantitative => log.progress >= habit.effective_goal(),
    }
}

pub fn day_state(habit: &Habit, logs: &[HabitLog], date: NaiveDate) -> DayState {
    match log_for_day(habit, logs, date) {
        None => DayState::NoLog,
        Some(log) if is_completed(habit, logs, date) => DayState::Complete {
            progress: log.progress,
        },
        Some(log) if log.progress == 0 => DayState::NoLog,
        Some(log) => DayState::Partial {
            progress: log.progress,
        },
    }
}

/// Consecutive completed days ending at `as_of`.
///
/// A missing completion on `as_of` itself does not break the streak since the
/// day is still in progress. The schedule is not consulted: only recorded
/// completions count.
pub fn current_streak(habit: &Habit, logs: &[HabitLog], as_of: NaiveDate) -> u32 {
    if logs.is_empty() {
        return 0;
    }

    let mut streak = 0;
    // No streak can be longer than the number of logs, plus today's grace day.
    for offset in 0..=logs.len() {
        let Some(day) = as_of.checked_sub_signed(Duration::days(offset as i64)) else {
            break;
        };
        if is_completed(habit, logs, day) {
            streak += 1;
        } else if offset > 0 {
            break;
        }
    }
    streak
}

/// Share of scheduled days in the last `window_days` days (ending at `as_of`)
/// that were completed, as a value in `0.0..=100.0`.
///
/// The scan walks `window_days + 1` candidate days from
/// `as_of - (window_days - 1)`; the last candidate is always `as_of + 1` and
/// is dropped, so exactly `window_days` days are counted.
///
/// Returns `0.0` when nothing was scheduled in the window. Windows that reach
/// past the calendar range are clamped to [`NaiveDate::MIN`].
pub fn completion_percentage(
    habit: &Habit,
    logs: &[HabitLog],
    window_days: u32,
    as_of: NaiveDate,
) -> f64 {
    if window_days == 0 {
        return 0.0;
    }
    let start = as_of
        .checked_sub_signed(Duration::days(i64::from(window_days) - 1))
        .unwrap_or(NaiveDate::MIN);

    let mut scheduled = 0u32;
    let mut completed = 0u32;
    for offset in 0..=i64::from(window_days) {
        let Some(day) = start.checked_add_signed(Duration::days(offset)) else {
            break;
        };
        if day > as_of {
            break;
        }
        if !is_due(habit, day) {
            continue;
        }
        scheduled += 1;
        if is_completed(habit, logs, day) {
            completed += 1;
        }
    }

    if scheduled == 0 {
        return 0.0;
    }
    100.0 * f64::from(completed) / f64::from(scheduled)
}

/// Habits due on `today`, in their original order.
pub fn todays_habits(habits: &[Habit], today: NaiveDate) -> Vec<&Habit> {
    habits.iter().filter(|habit| is_due(habit, today)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frequency::HabitFrequency;
    use std::collections::BTreeSet;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn days_before(day: NaiveDate, n: i64) -> NaiveDate {
        day - Duration::days(n)
    }

    fn completed_on(habit: &Habit, offsets: &[i64], today: NaiveDate) -> Vec<HabitLog> {
        offsets
            .iter()
            .map(|offset| HabitLog::new(habit.id, days_before(today, *offset), 1))
            .collect()
    }

    #[test]
    fn daily_is_always_due() {
        let habit = Habit::new("Stretch", HabitFrequency::Daily);
        let start = date(2025, 1, 1);
        assert!(start.iter_days().take(30).all(|day| is_due(&habit, day)));
    }

    #[test]
    fn weekly_extremes_match_daily_and_never() {
        let full = Habit::new("Full", HabitFrequency::weekly(Weekday::ALL));
        let empty = Habit::new("Empty", HabitFrequency::Weekly(BTreeSet::new()));
        let start = date(2025, 3, 1);
        for day in start.iter_days().take(14) {
            assert!(is_due(&full, day));
            assert!(!is_due(&empty, day));
        }
    }

    #[test]
    fn weekly_matches_selected_days_only() {
        let habit = Habit::new(
            "Gym",
            HabitFrequency::weekly([Weekday::Monday, Weekday::Thursday]),
        );
        // 2025-10-20 is a Monday
        assert!(is_due(&habit, date(2025, 10, 20)));
        assert!(!is_due(&habit, date(2025, 10, 21)));
        assert!(is_due(&habit, date(2025, 10, 23)));
    }

    #[test]
    fn simple_completion_needs_positive_progress() {
        let habit = Habit::new("Floss", HabitFrequency::Daily);
        let today = date(2025, 6, 10);
        assert!(!is_completed(&habit, &[], today));
        let zero = vec![HabitLog::new(habit.id, today, 0)];
        assert!(!is_completed(&habit, &zero, today));
        let one = vec![HabitLog::new(habit.id, today, 1)];
        assert!(is_completed(&habit, &one, today));
    }

    #[test]
    fn quantitative_completion_is_monotonic_in_progress() {
        let habit = Habit::quantitative("Water", HabitFrequency::Daily, 8, "glasses");
        let today = date(2025, 6, 10);
        let mut was_complete = false;
        for progress in 0..20 {
            let logs = vec![HabitLog::new(habit.id, today, progress)];
            let complete = is_completed(&habit, &logs, today);
            assert!(!(was_complete && !complete));
            assert_eq!(complete, progress >= 8);
            was_complete = complete;
        }
    }

    #[test]
    fn ignores_logs_of_other_habits() {
        let habit = Habit::new("Mine", HabitFrequency::Daily);
        let other = Habit::new("Theirs", HabitFrequency::Daily);
        let today = date(2025, 6, 10);
        let logs = vec![HabitLog::new(other.id, today, 1)];
        assert!(!is_completed(&habit, &logs, today));
    }

    #[test]
    fn day_state_tracks_partial_progress() {
        let habit = Habit::quantitative("Pages", HabitFrequency::Daily, 10, "pages");
        let today = date(2025, 6, 10);
        assert_eq!(day_state(&habit, &[], today), DayState::NoLog);
        let partial = vec![HabitLog::new(habit.id, today, 4)];
        assert_eq!(
            day_state(&habit, &partial, today),
            DayState::Partial { progress: 4 }
        );
        let done = vec![HabitLog::new(habit.id, today, 12)];
        assert_eq!(
            day_state(&habit, &done, today),
            DayState::Complete { progress: 12 }
        );
    }

    #[test]
    fn streak_counts_consecutive_days() {
        let habit = Habit::new("Run", HabitFrequency::Daily);
        let today = date(2025, 10, 18);
        let logs = completed_on(&habit, &[0, 1, 2], today);
        assert_eq!(current_streak(&habit, &logs, today), 3);
    }

    #[test]
    fn streak_stops_at_first_gap_before_today() {
        let habit = Habit::new("Run", HabitFrequency::Daily);
        let today = date(2025, 10, 18);
        let logs = completed_on(&habit, &[0, 2, 3], today);
        assert_eq!(current_streak(&habit, &logs, today), 1);
    }

    #[test]
    fn streak_survives_unfinished_today() {
        let habit = Habit::new("Run", HabitFrequency::Daily);
        let today = date(2025, 10, 18);
        let logs = completed_on(&habit, &[1, 2, 3], today);
        assert_eq!(current_streak(&habit, &logs, today), 3);

        let stale = completed_on(&habit, &[2, 3], today);
        assert_eq!(current_streak(&habit, &stale, today), 0);
    }

    #[test]
    fn streak_is_zero_without_logs() {
        let habit = Habit::new("Run", HabitFrequency::Daily);
        assert_eq!(current_streak(&habit, &[], date(2025, 10, 18)), 0);
    }

    #[test]
    fn streak_ignores_schedule() {
        // Mondays only, yet a missing Sunday log still breaks the chain.
        let habit = Habit::new("Review", HabitFrequency::weekly([Weekday::Monday]));
        let monday = date(2025, 10, 20);
        let logs = completed_on(&habit, &[0, 7], monday);
        assert_eq!(current_streak(&habit, &logs, monday), 1);
    }

    #[test]
    fn streak_requires_goal_for_quantitative() {
        let habit = Habit::quantitative("Push-ups", HabitFrequency::Daily, 20, "reps");
        let today = date(2025, 10, 18);
        let logs = vec![
            HabitLog::new(habit.id, today, 20),
            HabitLog::new(habit.id, days_before(today, 1), 5),
            HabitLog::new(habit.id, days_before(today, 2), 25),
        ];
        assert_eq!(current_streak(&habit, &logs, today), 1);
    }

    #[test]
    fn percentage_over_last_week() {
        let habit = Habit::new("Journal", HabitFrequency::Daily);
        let today = date(2025, 10, 18);
        let logs = completed_on(&habit, &[0, 1, 3, 4, 6], today);
        let pct = completion_percentage(&habit, &logs, 7, today);
        assert!((pct - 500.0 / 7.0).abs() < 1e-9);
        assert!((pct - 71.43).abs() < 0.01);
    }

    #[test]
    fn percentage_ignores_days_outside_window() {
        let habit = Habit::new("Journal", HabitFrequency::Daily);
        let today = date(2025, 10, 18);
        let logs = completed_on(&habit, &[-1, 7, 8], today);
        assert_eq!(completion_percentage(&habit, &logs, 7, today), 0.0);
    }

    #[test]
    fn percentage_counts_only_scheduled_days() {
        // 2025-10-20 is a Monday; window covers Tue 14th..Mon 20th
        let habit = Habit::new(
            "Piano",
            HabitFrequency::weekly([Weekday::Monday, Weekday::Wednesday]),
        );
        let today = date(2025, 10, 20);
        let logs = vec![
            HabitLog::new(habit.id, today, 1),
            HabitLog::new(habit.id, date(2025, 10, 18), 1),
        ];
        assert_eq!(completion_percentage(&habit, &logs, 7, today), 50.0);
    }

    #[test]
    fn percentage_is_zero_when_nothing_scheduled() {
        let habit = Habit::new("Never", HabitFrequency::Weekly(BTreeSet::new()));
        let today = date(2025, 10, 18);
        let logs = completed_on(&habit, &[0, 1], today);
        let pct = completion_percentage(&habit, &logs, 30, today);
        assert_eq!(pct, 0.0);
        assert!(!pct.is_nan());
        assert_eq!(
            completion_percentage(&Habit::new("Any", HabitFrequency::Daily), &[], 0, today),
            0.0
        );
    }

    #[test]
    fn huge_window_clamps_to_calendar_start() {
        let habit = Habit::new("Any", HabitFrequency::Daily);
        let today = NaiveDate::MIN + Duration::days(9);
        let logs = vec![HabitLog::new(habit.id, today, 1)];
        let pct = completion_percentage(&habit, &logs, 200_000_000, today);
        assert!((pct - 10.0).abs() < 1e-9, "got {pct}");
        assert_eq!(
            completion_percentage(&habit, &[], u32::MAX, NaiveDate::MIN),
            0.0
        );
    }

    #[test]
    fn window_ending_on_last_calendar_day() {
        let habit = Habit::new("Any", HabitFrequency::Daily);
        let today = NaiveDate::MAX;
        let logs = completed_on(&habit, &[0, 1], today);
        let pct = completion_percentage(&habit, &logs, 4, today);
        assert!((pct - 50.0).abs() < 1e-9, "got {pct}");
        assert_eq!(completion_percentage(&habit, &logs, 0, today), 0.0);
    }

    #[test]
    fn filters_todays_habits() {
        let monday = date(2025, 10, 20);
        let habits = vec![
            Habit::new("Daily", HabitFrequency::Daily),
            Habit::new("Tuesdays", HabitFrequency::weekly([Weekday::Tuesday])),
            Habit::new("Mondays", HabitFrequency::weekly([Weekday::Monday])),
        ];
        let names: Vec<&str> = todays_habits(&habits, monday)
            .into_iter()
            .map(|habit| habit.name.as_str())
            .collect();
        assert_eq!(names, vec!["Daily", "Mondays"]);
    }
}
