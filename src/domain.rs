use std::fmt;
use std::io::Error;
use std::path::PathBuf;

use derive_setters::Setters;
use polars::error::PolarsError;
use ratatui::crossterm::event::KeyEvent;

pub const HELP_TEXT: &str = "\
 q         quit
 ?         show this help
 Up/Down   move row cursor
 Left/Right previous/next page
 Space     toggle selection of the current row
 a         toggle selection of all visible rows
 /         edit the search query
 s         status filter menu (digits toggle, Esc closes)
 c         category filter menu (digits toggle, Esc closes)
 v         column menu (digits toggle visibility, Esc closes)
 1-7       sort by column, again to flip direction
 r         cycle rows per page
 x         reset search and filters
 y         copy selected subscriptions to the clipboard
 u         clear the selection
 Esc       close popup / cancel input";

#[derive(Debug)]
pub enum SubTrackError {
    IoError(Error),
    PolarsError(PolarsError),
    LoadingFailed(String),
    FileNotFound,
    PermissionDenied,
    UnknownFileType,
    MissingColumn(String),
    InvalidRecord { row: usize, reason: String },
    InvalidConfiguration(String),
}

impl fmt::Display for SubTrackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubTrackError::IoError(e) => write!(f, "io error: {e}"),
            SubTrackError::PolarsError(e) => write!(f, "polars error: {e}"),
            SubTrackError::LoadingFailed(reason) => write!(f, "loading failed: {reason}"),
            SubTrackError::FileNotFound => write!(f, "file not found"),
            SubTrackError::PermissionDenied => write!(f, "permission denied"),
            SubTrackError::UnknownFileType => write!(f, "unknown file type"),
            SubTrackError::MissingColumn(name) => write!(f, "missing column \"{name}\""),
            SubTrackError::InvalidRecord { row, reason } => {
                write!(f, "invalid record in row {row}: {reason}")
            }
            SubTrackError::InvalidConfiguration(reason) => {
                write!(f, "invalid configuration: {reason}")
            }
        }
    }
}

impl std::error::Error for SubTrackError {}

impl From<Error> for SubTrackError {
    fn from(err: Error) -> Self {
        SubTrackError::IoError(err)
    }
}

impl From<PolarsError> for SubTrackError {
    fn from(err: PolarsError) -> Self {
        SubTrackError::PolarsError(err)
    }
}

#[derive(Debug, Clone, Setters)]
#[setters(prefix = "with_")]
pub struct SubTrackConfig {
    pub event_poll_time: u64,
    pub rows_per_page: usize,
    pub max_column_width: usize,
    pub log_file: PathBuf,
    #[setters(into)]
    pub log_level: String,
}

impl Default for SubTrackConfig {
    fn default() -> Self {
        Self {
            event_poll_time: 100,
            rows_per_page: 5,
            max_column_width: 24,
            log_file: PathBuf::from("subtrack.log"),
            log_level: "info".to_string(),
        }
    }
}

/// Which option list a digit key currently toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuKind {
    Status,
    Category,
    Columns,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Quit,
    Help,
    Exit,
    Enter,
    MoveUp,
    MoveDown,
    PreviousPage,
    NextPage,
    ToggleRow,
    ToggleAllVisible,
    EditQuery,
    OpenMenu(MenuKind),
    Digit(usize),
    CycleRowsPerPage,
    ResetFilters,
    CopySelection,
    ClearSelection,
    RawKey(KeyEvent),
}
