use serde::{Deserialize, Deserializer};

use crate::{DEFAULT_MAX_ZOOM, DEFAULT_MIN_ZOOM};

/// Treat an explicit JSON `null` the same as a missing field.
pub(crate) fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawZoom {
    Integer(u64),
    Float(f64),
}

/// Zoom level, `null` reads as `default`. Fractional values are truncated
/// and anything outside `0..=u8::MAX` is clamped.
fn zoom_or<'de, D>(deserializer: D, default: u8) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let zoom = match Option::<RawZoom>::deserialize(deserializer)? {
        None => default,
        Some(RawZoom::Integer(z)) => z.min(u8::MAX as u64) as u8,
        Some(RawZoom::Float(z)) if z.is_finite() => z.clamp(0.0, u8::MAX as f64) as u8,
        Some(RawZoom::Float(_)) => default,
    };
    Ok(zoom)
}

pub(crate) fn min_zoom<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    zoom_or(deserializer, DEFAULT_MIN_ZOOM)
}

pub(crate) fn max_zoom<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    zoom_or(deserializer, DEFAULT_MAX_ZOOM)
}
