use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// What kind of name an [`DataError::InvalidReference`] failed to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reference {
    Dataset,
    Period,
    Entity,
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reference::Dataset => write!(f, "dataset"),
            Reference::Period => write!(f, "period"),
            Reference::Entity => write!(f, "locality"),
        }
    }
}

/// Errors raised by the data layer.
#[derive(Debug, Error)]
pub enum DataError {
    /// A configured dataset's backing file is absent.
    #[error("data file not found: {}", path.display())]
    MissingFile { path: PathBuf },

    /// A dataset key, period or locality that does not exist.
    #[error("unknown {kind} '{name}'")]
    InvalidReference { kind: Reference, name: String },

    #[error("failed to read workbook {}", path.display())]
    Workbook {
        path: PathBuf,
        #[source]
        source: calamine::Error,
    },

    #[error("workbook {} has no worksheet", path.display())]
    EmptyWorkbook { path: PathBuf },

    /// The sheet does not follow the expected row/column layout.
    #[error("unexpected sheet layout in {}: {reason}", path.display())]
    UnexpectedLayout { path: PathBuf, reason: String },

    #[error("CSV export failed")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl DataError {
    pub fn invalid(kind: Reference, name: impl Into<String>) -> Self {
        DataError::InvalidReference {
            kind,
            name: name.into(),
        }
    }

    pub fn is_missing_file(&self) -> bool {
        matches!(self, DataError::MissingFile { .. })
    }
}

pub type Result<T> = std::result::Result<T, DataError>;
