use std::{io, path::PathBuf};

use glyphgraph::BadGlyph;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    BadGlyph(#[from] BadGlyph),
    #[error("io failed for '{path}': '{source}'")]
    FileIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    YamlSerError(#[from] serde_yaml::Error),
    #[error("Invalid glyph name pattern '{pattern}': {source}")]
    BadPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}
