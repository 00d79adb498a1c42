//! Running a filter over every glyph of a font.

use glyphgraph::{BadGlyph, GlyphName, GlyphStore};
use indexmap::IndexSet;
use log::{debug, info, warn};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{
    error::Error,
    flatten::Flattener,
    propagate_anchors::{propagate_anchors, ProcessedGlyphs},
};

/// The filters we know how to run.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FilterKind {
    PropagateAnchors,
    FlattenComponents,
}

impl FilterKind {
    /// A filter with no state carried over from any previous run.
    pub fn new_filter(self) -> Box<dyn GlyphFilter> {
        match self {
            FilterKind::PropagateAnchors => Box::new(PropagateAnchorsFilter::default()),
            FilterKind::FlattenComponents => Box::new(FlattenComponentsFilter::default()),
        }
    }

    fn summary(self) -> &'static str {
        match self {
            FilterKind::PropagateAnchors => "Glyphs with propagated anchors",
            FilterKind::FlattenComponents => "Flattened composite glyphs",
        }
    }
}

/// Something that rewrites glyphs one at a time.
///
/// A filter instance serves exactly one pass over one font; state it keeps
/// between glyphs must not leak into another pass.
pub trait GlyphFilter {
    fn kind(&self) -> FilterKind;

    /// Process one glyph, returning true if it should be reported as modified.
    fn filter(
        &mut self,
        glyphs: &mut dyn GlyphStore,
        glyph_name: &GlyphName,
    ) -> Result<bool, BadGlyph>;
}

#[derive(Debug, Default)]
pub struct FlattenComponentsFilter {
    flattener: Flattener,
}

impl GlyphFilter for FlattenComponentsFilter {
    fn kind(&self) -> FilterKind {
        FilterKind::FlattenComponents
    }

    fn filter(
        &mut self,
        glyphs: &mut dyn GlyphStore,
        glyph_name: &GlyphName,
    ) -> Result<bool, BadGlyph> {
        self.flattener.flatten_glyph(glyphs, glyph_name)
    }
}

/// Reports every composite it visits as modified, anchors added or not.
#[derive(Debug, Default)]
pub struct PropagateAnchorsFilter {
    processed: ProcessedGlyphs,
}

impl GlyphFilter for PropagateAnchorsFilter {
    fn kind(&self) -> FilterKind {
        FilterKind::PropagateAnchors
    }

    fn filter(
        &mut self,
        glyphs: &mut dyn GlyphStore,
        glyph_name: &GlyphName,
    ) -> Result<bool, BadGlyph> {
        propagate_anchors(glyphs, glyph_name, &mut self.processed)
    }
}

/// Which glyphs a filter is applied to.
///
/// Patterns are unanchored regexes over the glyph name. Unselected glyphs are
/// still visible to the filter as components of selected ones.
#[derive(Debug, Clone, Default)]
pub struct GlyphSelection {
    include: Option<Regex>,
    exclude: Option<Regex>,
}

impl GlyphSelection {
    /// Every glyph.
    pub fn all() -> Self {
        Default::default()
    }

    pub fn new(include: Option<&str>, exclude: Option<&str>) -> Result<Self, Error> {
        Ok(GlyphSelection {
            include: include.map(compile_pattern).transpose()?,
            exclude: exclude.map(compile_pattern).transpose()?,
        })
    }

    pub fn is_restricted(&self) -> bool {
        self.include.is_some() || self.exclude.is_some()
    }

    pub fn includes(&self, glyph_name: &GlyphName) -> bool {
        let name = glyph_name.as_str();
        self.include.as_ref().map_or(true, |re| re.is_match(name))
            && !self.exclude.as_ref().is_some_and(|re| re.is_match(name))
    }
}

fn compile_pattern(pattern: &str) -> Result<Regex, Error> {
    Regex::new(pattern).map_err(|source| Error::BadPattern {
        pattern: pattern.to_string(),
        source,
    })
}

/// What one filter did to one font.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterReport {
    pub kind: FilterKind,
    /// Modified glyphs, in glyph order.
    pub modified: IndexSet<GlyphName>,
}

/// Apply `filter` to every selected glyph, in glyph order.
///
/// The first bad glyph aborts the run. Glyphs already rewritten stay that way.
pub fn run_filter(
    filter: &mut dyn GlyphFilter,
    glyphs: &mut dyn GlyphStore,
    selection: &GlyphSelection,
) -> Result<FilterReport, Error> {
    let kind = filter.kind();
    let mut modified = IndexSet::new();
    let mut selected = 0usize;
    for glyph_name in glyphs.glyph_names() {
        if !selection.includes(&glyph_name) {
            continue;
        }
        selected += 1;
        if filter.filter(glyphs, &glyph_name)? {
            modified.insert(glyph_name);
        }
    }

    if selected == 0 && selection.is_restricted() {
        warn!("{kind:?}: glyph selection {selection:?} matched nothing");
    }
    if !modified.is_empty() {
        info!("{}: {}", kind.summary(), modified.len());
    } else {
        debug!("{kind:?}: no glyphs modified");
    }
    Ok(FilterReport { kind, modified })
}
