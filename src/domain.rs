use std::fmt;
use std::io::Error;
use std::time::Duration;

use clap::ValueEnum;
use derive_setters::Setters;
use polars::error::PolarsError;
use ratatui::crossterm::event::KeyEvent;
use tracing_error::SpanTrace;

pub const HELP_TEXT: &str = "
Navigation
  1-6 / Tab     switch page          b       toggle sidebar
  ↑↓ / j k      move row or card     ← →     previous / next page
  Home / End    first / last page    v       table / cards
  mouse wheel   scroll cards

Table
  /             search               c       column visibility
  x             export

Leads
  s             cycle status         e       edit notes
  l             log a call

Contacts
  y             copy phone           Y       copy email

General
  ?             help                 Esc     close / clear search
  L             log out              q       quit
";

// Crate wide error type
#[derive(Debug)]
pub enum DashError {
    IoError(Error),
    PolarsError(PolarsError),
    LoadingFailed(String, SpanTrace),
    FileNotFound,
    PermissionDenied,
    UnknownFileType,
    InvalidCredentials,
    #[cfg(test)]
    Matcher(String),
    Logging(String),
}

impl DashError {
    pub fn loading_failed(message: impl Into<String>) -> Self {
        DashError::LoadingFailed(message.into(), SpanTrace::capture())
    }
}

impl fmt::Display for DashError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DashError::IoError(e) => write!(f, "IO error: {e}"),
            DashError::PolarsError(e) => write!(f, "Polars error: {e}"),
            DashError::LoadingFailed(msg, trace) => write!(f, "Loading failed: {msg}\n{trace}"),
            DashError::FileNotFound => write!(f, "File not found"),
            DashError::PermissionDenied => write!(f, "Permission denied"),
            DashError::UnknownFileType => write!(f, "Unknown file type"),
            DashError::InvalidCredentials => write!(f, "Invalid credentials"),
            #[cfg(test)]
            DashError::Matcher(msg) => write!(f, "Search failed: {msg}"),
            DashError::Logging(msg) => write!(f, "Logging setup failed: {msg}"),
        }
    }
}

impl std::error::Error for DashError {}

impl From<Error> for DashError {
    fn from(err: Error) -> Self {
        DashError::IoError(err)
    }
}

impl From<PolarsError> for DashError {
    fn from(err: PolarsError) -> Self {
        DashError::PolarsError(err)
    }
}

/// How pages present their records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LayoutMode {
    /// Cards on narrow terminals, tables otherwise
    #[default]
    Auto,
    Table,
    Cards,
}

#[derive(Debug, Clone, Setters)]
#[setters(prefix = "with_")]
pub struct DashConfig {
    pub event_poll_time: u64,
    /// Terminals narrower than this render cards in `LayoutMode::Auto`
    pub narrow_width: u16,
    pub layout: LayoutMode,
    pub status_ttl: Duration,
    pub scroll_step: usize,
    pub seed: u64,
}

impl Default for DashConfig {
    fn default() -> Self {
        Self {
            event_poll_time: 50,
            narrow_width: 100,
            layout: LayoutMode::Auto,
            status_ttl: Duration::from_secs(3),
            scroll_step: 3,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Search,
    Notes,
    CallNotes,
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
    FirstPage,
    LastPage,
    Search,
    ColumnMenu,
    ToggleColumn,
    ResetColumns,
    Export,
    ToggleLayout,
    ToggleSidebar,
    SwitchPage(usize),
    NextSection,
    PreviousSection,
    CycleStatus,
    EditNotes,
    LogCall,
    CopyPhone,
    CopyEmail,
    Logout,
    Scroll(isize),
    Resize(usize, usize),
    RawKey(KeyEvent),
}
