//! Flattening nested components.
//!
//! A component that references a composite glyph is replaced by that glyph's
//! own components, transformed into the referencing glyph's frame, until every
//! component references a glyph with no components.
//!
//! See <https://github.com/googlefonts/ufo2ft/blob/main/Lib/ufo2ft/filters/flattenComponents.py>

use std::{collections::HashMap, sync::Arc};

use glyphgraph::{BadGlyph, BadGlyphKind, Component, Glyph, GlyphName, GlyphStore};
use indexmap::IndexSet;
use log::trace;

/// Flattens glyphs, remembering the flat form of every composite it meets.
///
/// The memory is only valid for one pass over one font: use a new `Flattener`
/// for each.
#[derive(Debug, Default)]
pub struct Flattener {
    // composite glyph => its components flattened, relative to that glyph
    resolved: HashMap<GlyphName, Arc<[Component]>>,
    // composites currently being resolved, outermost first
    in_progress: IndexSet<GlyphName>,
}

/// A composite whose components are being resolved.
struct Pending<'a> {
    glyph: &'a Glyph,
    next: usize,
}

/// Flatten a single glyph without reusing work from previous calls.
///
/// Returns true if any component was rewritten.
pub fn flatten_glyph<G: GlyphStore + ?Sized>(
    glyphs: &mut G,
    glyph_name: &GlyphName,
) -> Result<bool, BadGlyph> {
    Flattener::new().flatten_glyph(glyphs, glyph_name)
}

impl Flattener {
    pub fn new() -> Self {
        Default::default()
    }

    /// Make `glyph_name` reference only glyphs that have no components.
    ///
    /// Returns true if any component was rewritten. A glyph whose components
    /// already reference only leaf glyphs is left untouched.
    pub fn flatten_glyph<G: GlyphStore + ?Sized>(
        &mut self,
        glyphs: &mut G,
        glyph_name: &GlyphName,
    ) -> Result<bool, BadGlyph> {
        let glyph = glyphs.glyph(glyph_name)?;
        // Guard: nothing to see here folks
        if !glyph.has_components() {
            return Ok(false);
        }
        trace!("Flatten {} {:?}", glyph.name, glyph.components);

        self.in_progress.insert(glyph_name.clone());
        let flattened = self.flatten_components(&*glyphs, glyph);
        // an error can leave any number of composites half resolved
        self.in_progress.clear();
        let (flattened, modified) = flattened?;

        if !modified {
            return Ok(false);
        }
        trace!("Flattened {glyph_name} to {flattened:?}");
        glyphs.glyph_mut(glyph_name)?.set_components(flattened);
        Ok(true)
    }

    /// The flat equivalent of `glyph`'s components, and whether it differs.
    fn flatten_components<G: GlyphStore + ?Sized>(
        &mut self,
        glyphs: &G,
        glyph: &Glyph,
    ) -> Result<(Vec<Component>, bool), BadGlyph> {
        let mut flattened = Vec::with_capacity(glyph.components.len());
        let mut modified = false;
        for component in glyph.components.iter() {
            let base = glyphs.component_glyph(&glyph.name, &component.base)?;
            if !base.has_components() {
                flattened.push(component.clone());
                continue;
            }
            let nested = self.resolve(glyphs, base)?;
            // the nested transform applies first, then ours
            flattened.extend(nested.iter().map(|inner| Component {
                base: inner.base.clone(),
                transform: component.transform * inner.transform,
            }));
            modified = true;
        }
        Ok((flattened, modified))
    }

    /// The flat components of a composite glyph, computed at most once.
    ///
    /// Nested composites are resolved innermost first from an explicit stack,
    /// so by the time a composite is flattened every composite it uses is
    /// already in `resolved`.
    fn resolve<G: GlyphStore + ?Sized>(
        &mut self,
        glyphs: &G,
        composite: &Glyph,
    ) -> Result<Arc<[Component]>, BadGlyph> {
        if let Some(done) = self.resolved.get(&composite.name) {
            return Ok(done.clone());
        }

        let mut pending = vec![self.start(composite)?];
        while let Some(top) = pending.last_mut() {
            let glyph = top.glyph;
            let Some(component) = glyph.components.get(top.next) else {
                pending.pop();
                self.in_progress.pop();
                let (flattened, _) = self.flatten_components(glyphs, glyph)?;
                self.resolved.insert(glyph.name.clone(), flattened.into());
                continue;
            };
            top.next += 1;
            let base = glyphs.component_glyph(&glyph.name, &component.base)?;
            if base.has_components() && !self.resolved.contains_key(&base.name) {
                pending.push(self.start(base)?);
            }
        }

        self.resolved
            .get(&composite.name)
            .cloned()
            .ok_or_else(|| BadGlyph::new(composite.name.clone(), BadGlyphKind::Missing))
    }

    fn start<'a>(&mut self, composite: &'a Glyph) -> Result<Pending<'a>, BadGlyph> {
        if let Some(idx) = self.in_progress.get_index_of(&composite.name) {
            let mut cycle: Vec<_> = self.in_progress.iter().skip(idx).cloned().collect();
            cycle.push(composite.name.clone());
            return Err(BadGlyph::new(
                composite.name.clone(),
                BadGlyphKind::CyclicComponents(cycle),
            ));
        }
        self.in_progress.insert(composite.name.clone());
        Ok(Pending {
            glyph: composite,
            next: 0,
        })
    }
}
