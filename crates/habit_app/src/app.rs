use std::io::Write as _;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use habit_core::{
    HabitId, HabitService, HabitStats, ReminderRequest, ReminderScheduler, TodayEntry,
};
use tracing::{debug, info, warn};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    pub(crate) store_path: PathBuf,
    pub(crate) stats_window_days: u32,
    pub(crate) today: Option<NaiveDate>,
    pub(crate) toggle: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(path) = lookup("HABIT_STORE") {
            if !path.trim().is_empty() {
                config.store_path = PathBuf::from(path);
            }
        }
        if let Some(window) = lookup("HABIT_STATS_WINDOW_DAYS") {
            match window.trim().parse::<u32>() {
                Ok(value) if value > 0 => config.stats_window_days = value,
                _ => warn!(%window, "ignoring invalid stats window"),
            }
        }
        if let Some(today) = lookup("HABIT_TODAY") {
            match NaiveDate::parse_from_str(today.trim(), "%Y-%m-%d") {
                Ok(date) => config.today = Some(date),
                Err(err) => warn!(%today, %err, "ignoring invalid HABIT_TODAY"),
            }
        }
        if let Some(name) = lookup("HABIT_TOGGLE") {
            let name = name.trim();
            if !name.is_empty() {
                config.toggle = Some(name.to_string());
            }
        }
        Ok(config)
    }

    pub fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Local::now().date_naive())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            store_path: PathBuf::from("habits.json"),
            stats_window_days: 7,
            today: None,
            toggle: None,
        }
    }
}

/// Stands in for a platform notification centre by logging each request.
#[derive(Debug, Default)]
pub struct TracingReminderScheduler;

impl ReminderScheduler for TracingReminderScheduler {
    fn schedule(&self, request: ReminderRequest) {
        info!(
            habit_id = %request.identifier,
            at = %request.time.format("%H:%M"),
            body = %request.body,
            "daily reminder scheduled"
        );
    }

    fn cancel(&self, habit_id: HabitId) {
        debug!(%habit_id, "reminder cancelled");
    }
}

pub fn run(config: AppConfig) -> Result<()> {
    info!(path = %config.store_path.display(), "opening habit store");
    let service = HabitService::builder()
        .with_snapshot(&config.store_path)
        .with_reminder_scheduler(Box::new(TracingReminderScheduler))
        .build()
        .context("failed to open habit store")?;

    let today = config.today();
    if let Some(name) = &config.toggle {
        match service.find_by_name(name) {
            Some(habit) => {
                let state = service
                    .toggle_completion(habit.id, today)
                    .with_context(|| format!("failed to toggle `{}`", habit.name))?;
                info!(habit = %habit.name, ?state, "toggled for today");
            }
            None => warn!(%name, "no habit with that name"),
        }
    }

    let report = render_report(&service, today, config.stats_window_days);
    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(report.as_bytes())
        .context("failed to write report")?;
    Ok(())
}

pub fn render_report(service: &HabitService, today: NaiveDate, window_days: u32) -> String {
    let mut out = String::new();
    render_today(&mut out, today, &service.today(today));
    out.push('\n');
    render_stats(&mut out, window_days, &service.stats(today, window_days));
    out
}

fn render_today(out: &mut String, today: NaiveDate, entries: &[TodayEntry]) {
    out.push_str(&format!("Today ({})\n", today.format("%a %Y-%m-%d")));
    if entries.is_empty() {
        out.push_str("  nothing due\n");
        return;
    }
    for entry in entries {
        let mark = if entry.state.is_complete() { "x" } else { " " };
        let habit = &entry.habit;
        out.push_str(&format!("  [{mark}] {}", habit.name));
        if habit.is_quantitative() {
            out.push_str(&format!(" {}/{}", entry.state.progress(), habit.goal));
            if !habit.unit.is_empty() {
                out.push(' ');
                out.push_str(&habit.unit);
            }
        }
        out.push_str(&format!(" ({})\n", habit.frequency.description()));
    }
}

fn render_stats(out: &mut String, window_days: u32, stats: &[HabitStats]) {
    out.push_str(&format!("Stats (last {window_days} days)\n"));
    if stats.is_empty() {
        out.push_str("  no habits yet\n");
        return;
    }
    let width = stats.iter().map(|s| s.name.chars().count()).max().unwrap_or(0);
    for entry in stats {
        out.push_str(&format!(
            "  {:<width$}  streak {:>3}  done {:>5.1}%\n",
            entry.name, entry.current_streak, entry.completion_percentage
        ));
    }
}
