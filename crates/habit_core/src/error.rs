//! Error types for habit_core.

use std::path::PathBuf;

use thiserror::Error;

use crate::habit::HabitId;

#[derive(Error, Debug)]
pub enum HabitError {
    /// No habit with this id is stored
    #[error("habit {0} not found")]
    NotFound(HabitId),

    /// Habits must carry a non-blank name
    #[error("habit name must not be empty")]
    EmptyName,

    #[error("failed to access snapshot at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed snapshot: {0}")]
    Json(#[from] serde_json::Error),
}

impl HabitError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        HabitError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for HabitError
pub type Result<T, E = HabitError> = std::result::Result<T, E>;
