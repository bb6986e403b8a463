//! The external Source Parser collaborator (§1): pure, fallible,
//! `path bytes -> ParsedFile`. Never implemented by the core itself.

use std::path::Path;
use std::sync::Arc;

use thiserror::Error;

use crate::types::ParsedFile;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to read {0}: {1}")]
    Io(std::path::PathBuf, std::io::Error),

    #[error("syntax error in {path}: {message}")]
    Syntax { path: std::path::PathBuf, message: String },

    #[error("unsupported file: {0}")]
    Unsupported(std::path::PathBuf),
}

/// Given an absolute path, returns a language tag and the typed
/// entity/relationship collections for that file.
pub trait SourceParser: Send + Sync {
    fn parse(&self, path: &Path) -> Result<ParsedFile, ParseError>;
}

impl<T> SourceParser for Arc<T>
where
    T: SourceParser + ?Sized,
{
    fn parse(&self, path: &Path) -> Result<ParsedFile, ParseError> {
        (**self).parse(path)
    }
}
