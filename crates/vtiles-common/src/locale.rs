//! Languages GeoJSON document: one polygon feature per locale with usage
//! counts. Only the feature properties are read; geometries are left to the
//! map renderer.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::nullable;

/// A GeoJSON FeatureCollection of locale features.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LocaleCollection {
    #[serde(default, deserialize_with = "nullable::or_default")]
    pub features: Vec<LocaleFeature>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LocaleFeature {
    pub properties: Locale,
}

/// Properties of one locale feature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Locale {
    pub key_name: String,
    #[serde(default)]
    pub alias: String,
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub is_new: bool,
}

impl Locale {
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        query.is_empty()
            || self.key_name.to_lowercase().contains(&query)
            || self.alias.to_lowercase().contains(&query)
    }

    /// Most used first, then by key name.
    pub fn display_order(a: &Locale, b: &Locale) -> Ordering {
        b.count.cmp(&a.count).then_with(|| a.key_name.cmp(&b.key_name))
    }
}

impl LocaleCollection {
    /// Extract the locales in display order.
    pub fn into_sorted_locales(self) -> Vec<Locale> {
        let mut locales: Vec<Locale> = self.features.into_iter().map(|f| f.properties).collect();
        locales.sort_by(Locale::display_order);
        locales
    }
}
