//! Running a sequence of filters over fonts.

use glyphgraph::{GlyphSet, GlyphStore};
use log::debug;
use rayon::prelude::*;

use crate::{
    config::FilterConfig,
    error::Error,
    filter::{run_filter, FilterKind, FilterReport, GlyphSelection},
};

/// A configured sequence of filters.
///
/// Each run creates fresh filters, so nothing is shared between fonts or
/// between runs over the same font.
#[derive(Debug, Clone)]
pub struct Pipeline {
    filters: Vec<FilterKind>,
    selection: GlyphSelection,
}

impl Pipeline {
    pub fn new(config: &FilterConfig) -> Result<Self, Error> {
        Ok(Pipeline {
            filters: config.filters.clone(),
            selection: config.selection()?,
        })
    }

    pub fn filters(&self) -> &[FilterKind] {
        &self.filters
    }

    /// Run every filter, in order, over one font.
    pub fn run(&self, glyphs: &mut dyn GlyphStore) -> Result<Vec<FilterReport>, Error> {
        self.filters
            .iter()
            .map(|kind| {
                debug!("Running {kind:?}");
                let mut filter = kind.new_filter();
                run_filter(filter.as_mut(), glyphs, &self.selection)
            })
            .collect()
    }

    /// Run over several independent fonts in parallel.
    ///
    /// Results are in the same order as `fonts`; one font failing does not
    /// stop the others.
    pub fn run_many(&self, fonts: &mut [GlyphSet]) -> Vec<Result<Vec<FilterReport>, Error>> {
        fonts
            .par_iter_mut()
            .map(|glyphs| self.run(glyphs))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use glyphgraph::{BadGlyph, BadGlyphKind, Glyph, GlyphName};
    use kurbo::Affine;
    use pretty_assertions::assert_eq;

    use super::*;

    fn load_testdata(name: &str) -> GlyphSet {
        let path = Path::new("../resources/testdata").join(name);
        let yml = std::fs::read_to_string(&path).unwrap();
        serde_yaml::from_str(&yml).unwrap()
    }

    fn anchors(glyphs: &GlyphSet, name: &str) -> Vec<(String, (f64, f64))> {
        glyphs
            .glyph(&name.into())
            .unwrap()
            .anchors
            .iter()
            .map(|a| (a.name.to_string(), (a.pos.x, a.pos.y)))
            .collect()
    }

    fn components(glyphs: &GlyphSet, name: &str) -> Vec<(String, [f64; 6])> {
        glyphs
            .glyph(&name.into())
            .unwrap()
            .components
            .iter()
            .map(|c| (c.base.to_string(), c.transform.as_coeffs()))
            .collect()
    }

    fn modified(report: &FilterReport) -> Vec<&str> {
        report.modified.iter().map(GlyphName::as_str).collect()
    }

    #[test]
    fn default_pipeline() {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut glyphs = load_testdata("composites.yaml");
        let pipeline = Pipeline::new(&FilterConfig::default()).unwrap();
        let reports = pipeline.run(&mut glyphs).unwrap();

        assert_eq!(
            vec![FilterKind::PropagateAnchors, FilterKind::FlattenComponents],
            reports.iter().map(|r| r.kind).collect::<Vec<_>>()
        );
        assert_eq!(
            vec!["Aacute", "acutecomb.case", "Aacute.case", "IJ", "IJacute"],
            modified(&reports[0])
        );
        assert_eq!(vec!["Aacute.case", "IJacute"], modified(&reports[1]));

        // propagation saw the nested structure before it was flattened away,
        // so "top" follows acutecomb.case's own top
        assert_eq!(
            vec![
                ("bottom".to_string(), (234.0, 0.0)),
                ("top".to_string(), (234.0, 1132.0)),
            ],
            anchors(&glyphs, "Aacute.case")
        );
        assert_eq!(
            vec![
                ("A".to_string(), Affine::IDENTITY.as_coeffs()),
                (
                    "acutecomb".to_string(),
                    Affine::translate((234.0, 290.0)).as_coeffs()
                ),
            ],
            components(&glyphs, "Aacute.case")
        );
    }

    #[test]
    fn ligature_then_mark() {
        let mut glyphs = load_testdata("composites.yaml");
        Pipeline::new(&FilterConfig::default())
            .unwrap()
            .run(&mut glyphs)
            .unwrap();

        assert_eq!(
            vec![
                ("top_1".to_string(), (103.0, 810.0)),
                ("top_2".to_string(), (369.0, 810.0)),
            ],
            anchors(&glyphs, "IJ")
        );
        // IJ only exposes numbered anchors so the acute has nothing to attach to
        assert_eq!(
            vec![
                ("top_1".to_string(), (103.0, 810.0)),
                ("top_2".to_string(), (369.0, 810.0)),
            ],
            anchors(&glyphs, "IJacute")
        );
        assert_eq!(
            vec!["I", "J", "acutecomb"],
            components(&glyphs, "IJacute")
                .into_iter()
                .map(|(base, _)| base)
                .collect::<Vec<_>>()
        );
    }

    #[test]
    fn order_matters() {
        let config = FilterConfig::from_yaml("filters: [flatten_components, propagate_anchors]")
            .unwrap();
        let mut glyphs = load_testdata("composites.yaml");
        let reports = Pipeline::new(&config).unwrap().run(&mut glyphs).unwrap();
        assert_eq!(FilterKind::FlattenComponents, reports[0].kind);

        // flattened first, so Aacute.case inherits from the leaves directly and
        // acutecomb.case's own anchors play no part
        assert_eq!(
            vec![
                ("bottom".to_string(), (234.0, 0.0)),
                ("top".to_string(), (234.0, 1100.0)),
            ],
            anchors(&glyphs, "Aacute.case")
        );
    }

    #[test]
    fn run_many_keeps_fonts_apart() {
        let good = load_testdata("composites.yaml");
        let mut bad = good.clone();
        bad.insert(Glyph::new("Bacute").with_component("B", Affine::IDENTITY));

        let mut fonts = vec![good.clone(), bad, good];
        let pipeline = Pipeline::new(&FilterConfig::default()).unwrap();
        let results = pipeline.run_many(&mut fonts);

        assert_eq!(3, results.len());
        assert!(results[0].is_ok());
        assert!(results[2].is_ok());
        match &results[1] {
            Err(Error::BadGlyph(bad)) => assert_eq!(
                &BadGlyph::new("Bacute", BadGlyphKind::MissingComponent("B".into())),
                bad
            ),
            other => panic!("expected a bad glyph, got {other:?}"),
        }
        assert_eq!(fonts[0], fonts[2]);
        assert_eq!(anchors(&fonts[0], "IJ"), anchors(&fonts[1], "IJ"));
    }

    #[test]
    fn run_many_deep_fonts() {
        // g0 <- g1 <- ... <- g3000, far deeper than any real font
        let mut deep: GlyphSet = [Glyph::new("g0").with_anchor("top", (0.0, 700.0))]
            .into_iter()
            .collect();
        for i in 1..=3000 {
            deep.insert(
                Glyph::new(format!("g{i}"))
                    .with_component(format!("g{}", i - 1), Affine::translate((1.0, 0.0))),
            );
        }

        let mut fonts = vec![deep.clone(), load_testdata("composites.yaml"), deep];
        let pipeline = Pipeline::new(&FilterConfig::default()).unwrap();
        for result in pipeline.run_many(&mut fonts) {
            result.unwrap();
        }
        assert_eq!(
            vec![("top".to_string(), (3000.0, 700.0))],
            anchors(&fonts[2], "g3000")
        );
        assert_eq!(
            vec![(
                "g0".to_string(),
                Affine::translate((3000.0, 0.0)).as_coeffs()
            )],
            components(&fonts[2], "g3000")
        );
    }

    #[test]
    fn selection_from_config() {
        let config = FilterConfig {
            exclude: Some(r"\.case$".to_string()),
            ..Default::default()
        };
        let mut glyphs = load_testdata("composites.yaml");
        let reports = Pipeline::new(&config).unwrap().run(&mut glyphs).unwrap();
        assert_eq!(vec!["Aacute", "IJ", "IJacute"], modified(&reports[0]));
        assert_eq!(vec!["IJacute"], modified(&reports[1]));
        assert!(anchors(&glyphs, "Aacute.case").is_empty());
    }
}
