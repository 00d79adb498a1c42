use smol_str::SmolStr;
use thiserror::Error;

use crate::types::GlyphName;

/// A glyph that could not be processed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Bad glyph '{glyph_name}': {kind}")]
pub struct BadGlyph {
    pub glyph_name: GlyphName,
    pub kind: BadGlyphKind,
}

impl BadGlyph {
    pub fn new(glyph_name: impl Into<GlyphName>, kind: impl Into<BadGlyphKind>) -> Self {
        Self {
            glyph_name: glyph_name.into(),
            kind: kind.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BadGlyphKind {
    #[error("is not in the glyph store")]
    Missing,
    #[error("is defined more than once")]
    Duplicate,
    #[error("references missing glyph '{0}'")]
    MissingComponent(GlyphName),
    #[error("component cycle {0:?}")]
    CyclicComponents(Vec<GlyphName>),
    #[error("already has an anchor named '{0}'")]
    DuplicateAnchor(SmolStr),
}
