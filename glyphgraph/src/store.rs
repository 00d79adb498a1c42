//! Lookup of glyphs by name.

use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    error::{BadGlyph, BadGlyphKind},
    glyph::Glyph,
    types::GlyphName,
};

/// Somewhere glyphs live, addressable by name.
///
/// Filters read and write glyphs exclusively through this trait; the store
/// is the source of truth for which names exist.
pub trait GlyphStore {
    fn get(&self, name: &GlyphName) -> Option<&Glyph>;

    fn get_mut(&mut self, name: &GlyphName) -> Option<&mut Glyph>;

    /// Every glyph name, in glyph order.
    fn glyph_names(&self) -> Vec<GlyphName>;

    fn glyph(&self, name: &GlyphName) -> Result<&Glyph, BadGlyph> {
        self.get(name)
            .ok_or_else(|| BadGlyph::new(name.clone(), BadGlyphKind::Missing))
    }

    fn glyph_mut(&mut self, name: &GlyphName) -> Result<&mut Glyph, BadGlyph> {
        self.get_mut(name)
            .ok_or_else(|| BadGlyph::new(name.clone(), BadGlyphKind::Missing))
    }

    /// The glyph `referrer` uses as a component.
    ///
    /// A dangling reference is blamed on `referrer`.
    fn component_glyph(&self, referrer: &GlyphName, base: &GlyphName) -> Result<&Glyph, BadGlyph> {
        self.get(base).ok_or_else(|| {
            BadGlyph::new(
                referrer.clone(),
                BadGlyphKind::MissingComponent(base.clone()),
            )
        })
    }
}

/// The glyphs of one font, in glyph order.
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(try_from = "Vec<Glyph>", into = "Vec<Glyph>")]
pub struct GlyphSet {
    glyphs: IndexMap<GlyphName, Glyph>,
}

impl GlyphSet {
    pub fn new() -> Self {
        Default::default()
    }

    /// Add a glyph, returning any previous glyph of the same name.
    ///
    /// A replaced glyph keeps its position in glyph order.
    pub fn insert(&mut self, glyph: Glyph) -> Option<Glyph> {
        let prev = self.glyphs.insert(glyph.name.clone(), glyph);
        if let Some(prev) = prev.as_ref() {
            debug!("Replaced glyph '{}'", prev.name);
        }
        prev
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Glyph> {
        self.glyphs.values()
    }
}

impl GlyphStore for GlyphSet {
    fn get(&self, name: &GlyphName) -> Option<&Glyph> {
        self.glyphs.get(name)
    }

    fn get_mut(&mut self, name: &GlyphName) -> Option<&mut Glyph> {
        self.glyphs.get_mut(name)
    }

    fn glyph_names(&self) -> Vec<GlyphName> {
        self.glyphs.keys().cloned().collect()
    }
}

impl FromIterator<Glyph> for GlyphSet {
    fn from_iter<T: IntoIterator<Item = Glyph>>(iter: T) -> Self {
        let mut glyphs = GlyphSet::new();
        for glyph in iter {
            glyphs.insert(glyph);
        }
        glyphs
    }
}

/// A list of glyphs that names each glyph at most once.
impl TryFrom<Vec<Glyph>> for GlyphSet {
    type Error = BadGlyph;

    fn try_from(value: Vec<Glyph>) -> Result<Self, Self::Error> {
        let mut glyphs = GlyphSet::new();
        for glyph in value {
            if glyphs.glyphs.contains_key(&glyph.name) {
                return Err(BadGlyph::new(glyph.name, BadGlyphKind::Duplicate));
            }
            glyphs.insert(glyph);
        }
        Ok(glyphs)
    }
}

impl From<GlyphSet> for Vec<Glyph> {
    fn from(value: GlyphSet) -> Self {
        value.glyphs.into_values().collect()
    }
}
