//! Text input formats: Bézier control nets and OBJ triangle meshes.

pub mod control_net;
pub mod obj;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub use control_net::{parse_control_net_file, parse_control_net_str};
pub use obj::{parse_obj_file, parse_obj_str};

/// Result type for parsing input files.
pub type ParseResult<T> = Result<T, ParseError>;

/// Errors raised while loading an input file. Both are fatal to the load.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The file could not be opened or read.
    #[error("cannot read {}: {source}", path.display())]
    FileUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The content does not follow the format; `line` is 1-based.
    #[error("line {line}: {message}")]
    MalformedInput { line: usize, message: String },
}

impl ParseError {
    pub(crate) fn malformed(line: usize, message: impl Into<String>) -> Self {
        Self::MalformedInput {
            line,
            message: message.into(),
        }
    }

    /// Line the error points at, if it concerns the content.
    #[must_use]
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::FileUnreadable { .. } => None,
            Self::MalformedInput { line, .. } => Some(*line),
        }
    }
}

pub(crate) fn read_source(path: &Path) -> ParseResult<String> {
    fs::read_to_string(path).map_err(|source| ParseError::FileUnreadable {
        path: path.to_path_buf(),
        source,
    })
}

/// Strips a `#` comment from `line`.
pub(crate) fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(index) => &line[..index],
        None => line,
    }
}
