use std::{io, path::PathBuf};

use pkgbump_manifest::ManifestError;
use thiserror::Error;

use crate::action::Action;

/// Every way a run can fail. All of them are fatal; nothing is retried.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("Input required and not supplied: {0}")]
    MissingInput(&'static str),

    #[error("Unknown action: {0}")]
    UnknownAction(String),

    #[error("Can't open package file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Can't parse package file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ManifestError,
    },

    #[error("Action {action} failed with error: {message}")]
    Operation { action: Action, message: String },

    #[error("Can't save package file {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Can't report output `{name}`: {source}")]
    Output {
        name: String,
        #[source]
        source: io::Error,
    },
}

impl RunError {
    /// True for failures raised while resolving configuration, before any file access.
    pub fn is_config(&self) -> bool {
        matches!(self, RunError::MissingInput(_) | RunError::UnknownAction(_))
    }

    pub fn is_load(&self) -> bool {
        matches!(self, RunError::Read { .. } | RunError::Parse { .. })
    }
}
