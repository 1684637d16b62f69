use std::error::Error;

use thiserror::Error;

/// Failure reported by a data source or a page-merge handler.
///
/// Stored as the cause of [`LoadState::Error`]; never raised to the caller of
/// `refresh`/`append`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct LoadError {
    message: String,
}

impl LoadError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Captures the display text of any error, including its source chain.
    pub fn from_error(err: &(dyn Error + 'static)) -> Self {
        let mut message = err.to_string();
        let mut source = err.source();
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        Self { message }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Status of one loading lane (refresh or append).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Loading,
    /// `end_of_pagination_reached` also signals "no data" to the presentation layer.
    NotLoading { end_of_pagination_reached: bool },
    Error(LoadError),
}

impl LoadState {
    pub const COMPLETE: LoadState = LoadState::NotLoading {
        end_of_pagination_reached: true,
    };

    pub const INCOMPLETE: LoadState = LoadState::NotLoading {
        end_of_pagination_reached: false,
    };

    pub fn not_loading(end_of_pagination_reached: bool) -> Self {
        LoadState::NotLoading {
            end_of_pagination_reached,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading)
    }

    pub fn is_complete(&self) -> bool {
        matches!(
            self,
            LoadState::NotLoading {
                end_of_pagination_reached: true
            }
        )
    }

    pub fn is_incomplete(&self) -> bool {
        matches!(
            self,
            LoadState::NotLoading {
                end_of_pagination_reached: false
            }
        )
    }

    pub fn error(&self) -> Option<&LoadError> {
        match self {
            LoadState::Error(err) => Some(err),
            _ => None,
        }
    }
}

impl Default for LoadState {
    fn default() -> Self {
        LoadState::INCOMPLETE
    }
}
