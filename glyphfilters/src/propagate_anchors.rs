//! Propagating anchors from components to their composites
//!
//! Anchors are usually only drawn on the glyphs that have outlines. Composites
//! inherit them here: every composite receives the anchors of its base
//! components, transformed into its own frame, so marks can attach to it.
//!
//! Two adjustments are made along the way:
//!
//! - when several base components contribute the same anchor, e.g. the two
//!   halves of a ligature, each copy is numbered: "top_1", "top_2"
//! - a mark component that attaches at an anchor moves that anchor to the
//!   mark's own copy of it, so a further mark stacks on top of the first
//!
//! See <https://github.com/googlefonts/ufo2ft/blob/main/Lib/ufo2ft/filters/propagateAnchors.py>

use std::collections::{BTreeMap, BTreeSet, HashSet};

use glyphgraph::{
    glyph::MARK_PREFIX, Anchor, BadGlyph, BadGlyphKind, Component, Glyph, GlyphName, GlyphStore,
};
use indexmap::IndexSet;
use kurbo::Point;
use log::{debug, log_enabled, trace};
use smol_str::{format_smolstr, SmolStr};

/// The glyphs a propagation pass has already visited.
///
/// Shared by every call in one pass over one font so that each glyph is
/// propagated once; a new pass needs a new set.
#[derive(Debug, Default)]
pub struct ProcessedGlyphs {
    done: HashSet<GlyphName>,
    // composites whose components are being propagated, outermost first
    in_progress: IndexSet<GlyphName>,
}

impl ProcessedGlyphs {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn contains(&self, glyph_name: &GlyphName) -> bool {
        self.done.contains(glyph_name)
    }

    pub fn len(&self) -> usize {
        self.done.len()
    }

    pub fn is_empty(&self) -> bool {
        self.done.is_empty()
    }

    /// Mark `glyph_name` as visited.
    ///
    /// Returns its components if it is a composite seen for the first time,
    /// in which case it stays in progress until [`Self::finish`].
    fn start<G: GlyphStore + ?Sized>(
        &mut self,
        glyphs: &G,
        glyph_name: &GlyphName,
    ) -> Result<Option<Vec<Component>>, BadGlyph> {
        if let Some(idx) = self.in_progress.get_index_of(glyph_name) {
            let mut cycle: Vec<_> = self.in_progress.iter().skip(idx).cloned().collect();
            cycle.push(glyph_name.clone());
            return Err(BadGlyph::new(
                glyph_name.clone(),
                BadGlyphKind::CyclicComponents(cycle),
            ));
        }
        if !self.done.insert(glyph_name.clone()) {
            return Ok(None);
        }
        let components = glyphs.glyph(glyph_name)?.components.clone();
        if components.is_empty() {
            return Ok(None);
        }
        self.in_progress.insert(glyph_name.clone());
        Ok(Some(components))
    }

    fn finish(&mut self) {
        self.in_progress.pop();
    }
}

/// A composite waiting for its components to be propagated.
struct Pending {
    glyph_name: GlyphName,
    components: Vec<Component>,
    next: usize,
}

/// Copy anchors from the components of `glyph_name`, and of every composite
/// used in between, into `glyph_name`.
///
/// Returns true if the glyph has components, whether or not any anchor was
/// actually added.
pub fn propagate_anchors<G: GlyphStore + ?Sized>(
    glyphs: &mut G,
    glyph_name: &GlyphName,
    processed: &mut ProcessedGlyphs,
) -> Result<bool, BadGlyph> {
    let has_components = glyphs.glyph(glyph_name)?.has_components();
    let result = propagate_depth_first(glyphs, glyph_name, processed);
    // an error can leave any number of composites in progress
    processed.in_progress.clear();
    result?;
    Ok(has_components)
}

/// Walk the component graph below `glyph_name` from an explicit stack,
/// propagating each composite once all of its components are done.
fn propagate_depth_first<G: GlyphStore + ?Sized>(
    glyphs: &mut G,
    glyph_name: &GlyphName,
    processed: &mut ProcessedGlyphs,
) -> Result<(), BadGlyph> {
    let Some(components) = processed.start(&*glyphs, glyph_name)? else {
        return Ok(());
    };
    let mut pending = vec![Pending {
        glyph_name: glyph_name.clone(),
        components,
        next: 0,
    }];

    while let Some(top) = pending.last_mut() {
        let Some(component) = top.components.get(top.next) else {
            processed.finish();
            if let Some(done) = pending.pop() {
                propagate_composite(glyphs, &done.glyph_name, &done.components)?;
            }
            continue;
        };
        top.next += 1;
        glyphs.component_glyph(&top.glyph_name, &component.base)?;
        let base = component.base.clone();
        if let Some(components) = processed.start(&*glyphs, &base)? {
            pending.push(Pending {
                glyph_name: base,
                components,
                next: 0,
            });
        }
    }
    Ok(())
}

/// Add anchors to a composite whose components have all been propagated.
fn propagate_composite<G: GlyphStore + ?Sized>(
    glyphs: &mut G,
    glyph_name: &GlyphName,
    components: &[Component],
) -> Result<(), BadGlyph> {
    let glyph = glyphs.glyph(glyph_name)?;
    let mut base_components = Vec::new();
    let mut mark_components = Vec::new();
    let mut anchor_names = BTreeSet::new();
    for component in components.iter() {
        let base = glyphs.component_glyph(glyph_name, &component.base)?;
        if base.has_mark_anchor() {
            mark_components.push((component, base));
        } else {
            anchor_names.extend(base.anchors.iter().map(|a| a.name.clone()));
            base_components.push((component, base));
        }
    }

    let mut to_add = BTreeMap::new();
    for anchor_name in anchor_names.iter() {
        // don't add if the glyph already has this anchor OR any associated
        // ligature anchors (e.g. "top_1, top_2" for "top")
        if glyph
            .anchors
            .iter()
            .any(|a| a.name.starts_with(anchor_name.as_str()))
        {
            debug!("'{glyph_name}' already defines '{anchor_name}', not propagating it");
            continue;
        }
        stage_base_anchors(&mut to_add, &base_components, anchor_name);
    }

    for (component, mark) in mark_components {
        adjust_for_mark(&mut to_add, component, mark);
    }

    if to_add.is_empty() {
        return Ok(());
    }
    if log_enabled!(log::Level::Trace) {
        let prev_names: Vec<_> = glyph.anchors.iter().map(|a| &a.name).collect();
        let new_names: Vec<_> = to_add.keys().collect();
        trace!("propagated anchors for '{glyph_name}': {prev_names:?} + {new_names:?}");
    }

    // BTreeMap iteration appends them sorted by name
    let glyph = glyphs.glyph_mut(glyph_name)?;
    for (name, pos) in to_add {
        glyph.append_anchor(Anchor { name, pos })?;
    }
    Ok(())
}

/// Stage `anchor_name` from the base components that define it.
///
/// One contributor keeps the name; several are numbered in component order.
fn stage_base_anchors(
    to_add: &mut BTreeMap<SmolStr, Point>,
    base_components: &[(&Component, &Glyph)],
    anchor_name: &str,
) {
    let positions: Vec<_> = base_components
        .iter()
        .filter_map(|(component, base)| {
            base.anchor(anchor_name)
                .map(|anchor| component.transform * anchor.pos)
        })
        .collect();

    match positions.as_slice() {
        [] => (),
        [pos] => {
            to_add.insert(anchor_name.into(), *pos);
        }
        _ => {
            for (i, pos) in positions.iter().enumerate() {
                to_add.insert(format_smolstr!("{anchor_name}_{}", i + 1), *pos);
            }
        }
    }
}

/// Move staged base anchors to where a mark attached at them puts its own copy.
///
/// Only anchors the mark also attaches by (it has "_top" for "top") move.
fn adjust_for_mark(to_add: &mut BTreeMap<SmolStr, Point>, component: &Component, mark: &Glyph) {
    for anchor in mark.anchors.iter() {
        if !to_add.contains_key(&anchor.name) {
            continue;
        }
        let attachment = format_smolstr!("{MARK_PREFIX}{}", anchor.name);
        if mark.anchor(&attachment).is_none() {
            continue;
        }
        to_add.insert(anchor.name.clone(), component.transform * anchor.pos);
    }
}
