//! Glyph graph types used by the composite glyph filters.
//!
//! A font is modelled as a [`GlyphStore`] of [`Glyph`]s. A glyph with
//! components is a composite; each [`Component`] references another glyph
//! by name and places it with a [`kurbo::Affine`].

pub mod error;
pub mod glyph;
pub mod store;
pub mod types;

pub use error::{BadGlyph, BadGlyphKind};
pub use glyph::{Anchor, Component, Glyph};
pub use store::{GlyphSet, GlyphStore};
pub use types::GlyphName;
