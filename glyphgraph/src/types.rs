//! Names.

use std::fmt::{self, Debug, Display};

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// The name of a glyph, unique within a font.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GlyphName(SmolStr);

impl GlyphName {
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<&str> for GlyphName {
    fn from(value: &str) -> Self {
        GlyphName(value.into())
    }
}

impl From<String> for GlyphName {
    fn from(value: String) -> Self {
        GlyphName(value.into())
    }
}

// unquoted, so a cycle reads as [A, B, A]
impl Debug for GlyphName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Display for GlyphName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
