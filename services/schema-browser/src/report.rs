//! Console reports for the one-shot subcommands.

use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Table};

use layer_catalog::{Catalog, DetailStatus, SourceConfig};
use vtiles_common::{format_min_area, split_links, ConfigValue, DetailSegment, LayerRecord, Locale};

/// Shown for maps that do not declare an attribution.
const DEFAULT_ATTRIBUTION: &str = "OpenHistoricalMap";

/// Formats catalog contents for output.
pub struct CatalogReport;

impl CatalogReport {
    fn table(header: Vec<&str>) -> Table {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .apply_modifier(UTF8_ROUND_CORNERS)
            .set_header(header);
        table
    }

    /// One row per map.
    pub fn format_maps(catalog: &Catalog) -> String {
        let mut table = Self::table(vec!["Map", "Attribution", "Layers", "Zoom", "Detail"]);

        for map in &catalog.maps {
            let detail = match catalog.detail_status(&map.name) {
                Some(DetailStatus::Available { layers }) => format!("{} layers", layers),
                Some(DetailStatus::Unavailable { reason }) => format!("unavailable ({})", reason),
                None => "-".to_string(),
            };
            table.add_row(vec![
                map.name.clone(),
                map.attribution
                    .clone()
                    .unwrap_or_else(|| DEFAULT_ATTRIBUTION.to_string()),
                map.layers.len().to_string(),
                zoom_range(map.minzoom, map.maxzoom),
                detail,
            ]);
        }

        table.to_string()
    }

    /// Map style and site links for the configured environment.
    pub fn format_links(config: &SourceConfig) -> String {
        let mut table = Self::table(vec!["Link", "URL"]);
        table.add_row(vec!["Map style", config.map_style_url.as_str()]);
        table.add_row(vec!["OpenHistoricalMap", config.links.open_historical_map.as_str()]);
        table.add_row(vec!["Vector tiles", config.links.vector_tiles.as_str()]);
        table.to_string()
    }

    /// One row per layer of `map_name`, filtered by `query`.
    /// Returns `None` when the map does not exist.
    pub fn format_layers(catalog: &Catalog, map_name: &str, query: &str) -> Option<String> {
        catalog.map(map_name)?;

        let mut table = Self::table(vec!["Layer", "Geometry", "Zoom", "Fields", "Description"]);
        for layer in catalog.layers_for_map(map_name).filter(|l| l.matches(query)) {
            table.add_row(vec![
                layer.name.clone(),
                layer.geometry_type.display_label().to_string(),
                zoom_range(layer.minzoom, layer.maxzoom),
                layer.fields.len().to_string(),
                layer.description.clone(),
            ]);
        }

        Some(table.to_string())
    }

    /// Full record of one layer.
    pub fn format_layer(layer: &LayerRecord, config: &SourceConfig) -> String {
        let mut table = Self::table(vec![layer.name.as_str(), layer.map.as_str()]);

        table.add_row(vec!["Description", &layer.description]);
        table.add_row(vec!["Geometry", layer.geometry_type.display_label()]);
        table.add_row(vec!["Zoom", &zoom_range(layer.minzoom, layer.maxzoom)]);
        if let Some(tile) = layer.first_tile() {
            table.add_row(vec!["Tiles", tile]);
        }
        if let Some(path) = layer.tegola_config.as_deref() {
            table.add_row(vec!["Tegola config".to_string(), config.tegola_config_url(path)]);
        }

        for (i, line) in layer.details.iter().enumerate() {
            let label = if i == 0 { "Details" } else { "" };
            table.add_row(vec![label.to_string(), render_links(line)]);
        }

        let (plain, locale) = layer.partition_fields();
        for (i, (name, kind)) in plain.iter().enumerate() {
            let label = if i == 0 { "Fields" } else { "" };
            table.add_row(vec![label.to_string(), format!("{}: {}", name, kind)]);
        }
        if !locale.is_empty() {
            let names: Vec<&str> = locale.iter().map(|(name, _)| *name).collect();
            table.add_row(vec!["Locale fields".to_string(), names.join(", ")]);
        }

        let mut output = table.to_string();

        if !layer.filters_per_zoom_level.is_empty() {
            let mut filters = Self::table(vec!["Zoom", "Filter", "Tolerance", "Min area", "View"]);
            for filter in &layer.filters_per_zoom_level {
                filters.add_row(vec![
                    value_or_dash(filter.zoom_level.as_ref()),
                    filter.filter.clone().unwrap_or_else(|| "-".to_string()),
                    value_or_dash(filter.tolerance.as_ref()),
                    format_min_area(filter.min_area.as_ref()),
                    filter.view_name.clone().unwrap_or_else(|| "-".to_string()),
                ]);
            }
            output.push('\n');
            output.push_str(&filters.to_string());
        }

        output
    }

    /// One row per locale.
    pub fn format_locales(locales: &[&Locale]) -> String {
        let mut table = Self::table(vec!["Key", "Alias", "Count", "New"]);
        for locale in locales {
            table.add_row(vec![
                locale.key_name.clone(),
                locale.alias.clone(),
                locale.count.to_string(),
                if locale.is_new { "yes" } else { "" }.to_string(),
            ]);
        }
        table.to_string()
    }
}

fn zoom_range(min: u8, max: u8) -> String {
    format!("{}-{}", min, max)
}

fn value_or_dash(value: Option<&ConfigValue>) -> String {
    value.map(ToString::to_string).unwrap_or_else(|| "-".to_string())
}

/// Plain text with links wrapped in angle brackets.
fn render_links(text: &str) -> String {
    split_links(text)
        .into_iter()
        .map(|segment| match segment {
            DetailSegment::Text(t) => t.to_string(),
            DetailSegment::Link(url) => format!("<{}>", url),
        })
        .collect()
}
