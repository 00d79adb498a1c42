//! Composite glyph filters.
//!
//! Two passes over a font's component graph, run before compiling to binary:
//!
//! - [flatten]: rewrite composites so that every component references a glyph
//!   without components
//! - [propagate_anchors]: copy anchors from components up into the composites
//!   that use them
//!
//! [`Pipeline`] runs a configured sequence of them over one or many fonts.

pub mod config;
pub mod error;
pub mod filter;
pub mod flatten;
pub mod pipeline;
pub mod propagate_anchors;

pub use config::FilterConfig;
pub use error::Error;
pub use filter::{run_filter, FilterKind, FilterReport, GlyphFilter, GlyphSelection};
pub use flatten::{flatten_glyph, Flattener};
pub use pipeline::Pipeline;
pub use propagate_anchors::{propagate_anchors, ProcessedGlyphs};
