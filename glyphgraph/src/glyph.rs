//! Glyphs, the components that place one glyph inside another, and anchors.

use kurbo::{Affine, Point};
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::{
    error::{BadGlyph, BadGlyphKind},
    types::GlyphName,
};

/// Anchors whose name starts with this attach a mark to a base.
pub const MARK_PREFIX: char = '_';

/// A glyph: an ordered list of components and an ordered list of anchors.
///
/// Outlines are not modelled; a glyph with no components is a leaf.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Glyph {
    pub name: GlyphName,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<Component>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub anchors: Vec<Anchor>,
}

/// A reference to another glyph, placed by `transform`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Component {
    /// The name of the referenced glyph.
    pub base: GlyphName,
    /// Affine transformation to apply to the referenced glyph.
    #[serde(default)]
    pub transform: Affine,
}

/// A named attachment point.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Anchor {
    pub name: SmolStr,
    pub pos: Point,
}

impl Glyph {
    pub fn new(name: impl Into<GlyphName>) -> Self {
        Glyph {
            name: name.into(),
            components: Vec::new(),
            anchors: Vec::new(),
        }
    }

    pub fn with_component(mut self, base: impl Into<GlyphName>, transform: Affine) -> Self {
        self.components.push(Component::new(base, transform));
        self
    }

    pub fn with_anchor(mut self, name: &str, pos: impl Into<Point>) -> Self {
        self.anchors.push(Anchor::new(name, pos));
        self
    }

    pub fn has_components(&self) -> bool {
        !self.components.is_empty()
    }

    pub fn component_names(&self) -> impl Iterator<Item = &GlyphName> {
        self.components.iter().map(|c| &c.base)
    }

    /// The first anchor with exactly this name.
    pub fn anchor(&self, name: &str) -> Option<&Anchor> {
        self.anchors.iter().find(|a| a.name == name)
    }

    /// True if any anchor attaches this glyph to a base, i.e. it's a mark.
    pub fn has_mark_anchor(&self) -> bool {
        self.anchors.iter().any(Anchor::is_mark)
    }

    /// Replace the component list wholesale, returning the old one.
    pub fn set_components(&mut self, components: Vec<Component>) -> Vec<Component> {
        std::mem::replace(&mut self.components, components)
    }

    /// Add an anchor, refusing to shadow one that already exists.
    pub fn append_anchor(&mut self, anchor: Anchor) -> Result<(), BadGlyph> {
        if self.anchor(&anchor.name).is_some() {
            return Err(BadGlyph::new(
                self.name.clone(),
                BadGlyphKind::DuplicateAnchor(anchor.name),
            ));
        }
        self.anchors.push(anchor);
        Ok(())
    }
}

impl Component {
    pub fn new(base: impl Into<GlyphName>, transform: Affine) -> Self {
        Component {
            base: base.into(),
            transform,
        }
    }
}

impl Anchor {
    pub fn new(name: impl Into<SmolStr>, pos: impl Into<Point>) -> Self {
        Anchor {
            name: name.into(),
            pos: pos.into(),
        }
    }

    pub fn is_mark(&self) -> bool {
        self.name.starts_with(MARK_PREFIX)
    }
}
