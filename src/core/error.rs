use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading, transforming or saving a POM.
///
/// A rule that matches nothing is not an error. It shows up in the run
/// report instead.
#[derive(Debug, Error)]
pub enum ToggleError {
    #[error("build descriptor not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("rule '{rule}' has an invalid pattern: {source}")]
    Pattern {
        rule: String,
        #[source]
        source: regex::Error,
    },
}

impl ToggleError {
    pub(crate) fn read(path: impl Into<PathBuf>, source: io::Error) -> Self {
        let path = path.into();
        if source.kind() == io::ErrorKind::NotFound {
            Self::NotFound { path }
        } else {
            Self::Read { path, source }
        }
    }
}
