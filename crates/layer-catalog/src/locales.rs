//! Locale list from the languages document. Independent of the catalog.

use tracing::{debug, instrument};

use vtiles_common::{CatalogResult, Locale};

use crate::source::HttpSource;

/// Fetch the languages document and return its locales, most used first.
#[instrument(skip(source))]
pub async fn load_locales(source: &HttpSource) -> CatalogResult<Vec<Locale>> {
    let locales = source.fetch_locales().await?.into_sorted_locales();
    debug!(locales = locales.len(), "Loaded locales");
    Ok(locales)
}

/// Locales whose key name or alias contain `query`, keeping order.
pub fn filter_locales<'a>(locales: &'a [Locale], query: &str) -> Vec<&'a Locale> {
    locales.iter().filter(|l| l.matches(query)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn locale(key: &str, alias: &str, count: u64) -> Locale {
        Locale {
            key_name: key.to_string(),
            alias: alias.to_string(),
            count,
            is_new: false,
        }
    }

    #[test]
    fn test_filter_locales() {
        let locales = vec![
            locale("name:es", "Spanish", 40),
            locale("name:de", "German", 12),
            locale("name:pt", "Portuguese", 3),
        ];

        let matched: Vec<&str> = filter_locales(&locales, "an")
            .iter()
            .map(|l| l.key_name.as_str())
            .collect();
        assert_eq!(matched, vec!["name:es", "name:de"]);

        assert_eq!(filter_locales(&locales, "  ").len(), 3);
        assert!(filter_locales(&locales, "klingon").is_empty());
    }
}
