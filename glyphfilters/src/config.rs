//! Which filters to run, and on what.

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::{
    error::Error,
    filter::{FilterKind, GlyphSelection},
};

/// Settings for a [`Pipeline`](crate::Pipeline).
///
/// Missing fields take their default, so an empty document is a valid config.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct FilterConfig {
    /// Filters to run, in order.
    pub filters: Vec<FilterKind>,
    /// Only glyphs whose name matches this regex are filtered.
    pub include: Option<String>,
    /// Glyphs whose name matches this regex are not filtered.
    pub exclude: Option<String>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        FilterConfig {
            filters: vec![FilterKind::PropagateAnchors, FilterKind::FlattenComponents],
            include: None,
            exclude: None,
        }
    }
}

impl FilterConfig {
    pub fn from_yaml(yml: &str) -> Result<FilterConfig, Error> {
        serde_yaml::from_str(yml).map_err(Into::into)
    }

    /// Read a config from a YAML file.
    pub fn load(path: &Path) -> Result<FilterConfig, Error> {
        let yml = fs::read_to_string(path).map_err(|source| Error::FileIo {
            path: path.to_owned(),
            source,
        })?;
        Self::from_yaml(&yml)
    }

    pub fn to_yaml(&self) -> Result<String, Error> {
        serde_yaml::to_string(self).map_err(Into::into)
    }

    pub fn selection(&self) -> Result<GlyphSelection, Error> {
        GlyphSelection::new(self.include.as_deref(), self.exclude.as_deref())
    }
}
