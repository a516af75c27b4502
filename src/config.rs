//! Editor tuning knobs.
//!
//! Defaults come from [`crate::consts`]. Hosts can override them from a JSON
//! object (missing keys keep their defaults) or, on native targets, from
//! `SCRAPBOOK_*` environment variables.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use serde::Deserialize;

use crate::consts::{
    AUTOSAVE_QUIET_MS, MIN_ELEMENT_SIZE, SAVING_INDICATOR_MS, STORAGE_KEY, SWIPE_COMMIT_RATIO, SWIPE_DEAD_ZONE_PX,
};

/// Tunables for the editor, loaded once at startup.
///
/// Environment and JSON overrides pass through [`EditorConfig::validated`],
/// so the element-size floor never drops below [`MIN_ELEMENT_SIZE`] and swipe
/// thresholds stay finite.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawEditorConfig")]
pub struct EditorConfig {
    /// Quiet period after the last mutation before an autosave fires.
    pub autosave_quiet_ms: u64,
    /// How long the "saving" indicator stays visible after an autosave.
    pub saving_indicator_ms: u64,
    /// Storage key holding the album map.
    pub storage_key: String,
    /// Smallest width or height an element can be resized to.
    pub min_element_size: f64,
    /// Movement before a swipe picks a direction, in pixels.
    pub swipe_dead_zone: f64,
    /// Fraction of the container width a swipe must cross to change page.
    pub swipe_commit_ratio: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            autosave_quiet_ms: AUTOSAVE_QUIET_MS,
            saving_indicator_ms: SAVING_INDICATOR_MS,
            storage_key: STORAGE_KEY.to_owned(),
            min_element_size: MIN_ELEMENT_SIZE,
            swipe_dead_zone: SWIPE_DEAD_ZONE_PX,
            swipe_commit_ratio: SWIPE_COMMIT_RATIO,
        }
    }
}

impl EditorConfig {
    /// Build config from environment variables, falling back to defaults.
    ///
    /// Optional:
    /// - `SCRAPBOOK_AUTOSAVE_QUIET_MS`: default 2000
    /// - `SCRAPBOOK_SAVING_INDICATOR_MS`: default 1000
    /// - `SCRAPBOOK_STORAGE_KEY`: default `photoAlbums`
    /// - `SCRAPBOOK_MIN_ELEMENT_SIZE`: default 24
    /// - `SCRAPBOOK_SWIPE_DEAD_ZONE`: default 10
    /// - `SCRAPBOOK_SWIPE_COMMIT_RATIO`: default 0.25
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).map_err(|_| ()))
    }

    /// Build config from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Result<String, ()>,
    {
        let defaults = Self::default();
        Self {
            autosave_quiet_ms: parse_or(&lookup, "SCRAPBOOK_AUTOSAVE_QUIET_MS", defaults.autosave_quiet_ms),
            saving_indicator_ms: parse_or(&lookup, "SCRAPBOOK_SAVING_INDICATOR_MS", defaults.saving_indicator_ms),
            storage_key: lookup("SCRAPBOOK_STORAGE_KEY").unwrap_or(defaults.storage_key),
            min_element_size: parse_or(&lookup, "SCRAPBOOK_MIN_ELEMENT_SIZE", defaults.min_element_size),
            swipe_dead_zone: parse_or(&lookup, "SCRAPBOOK_SWIPE_DEAD_ZONE", defaults.swipe_dead_zone),
            swipe_commit_ratio: parse_or(&lookup, "SCRAPBOOK_SWIPE_COMMIT_RATIO", defaults.swipe_commit_ratio),
        }
        .validated()
    }

    /// Replace out-of-range values with their defaults.
    ///
    /// - `storage_key`: trimmed; blank falls back
    /// - `min_element_size`: non-finite falls back; raised to at least [`MIN_ELEMENT_SIZE`]
    /// - `swipe_dead_zone`: must be finite and `>= 0`
    /// - `swipe_commit_ratio`: must be finite and in `(0, 1]`
    #[must_use]
    pub fn validated(self) -> Self {
        let defaults = Self::default();
        let storage_key = match self.storage_key.trim() {
            "" => defaults.storage_key,
            key => key.to_owned(),
        };
        let min_element_size = if self.min_element_size.is_finite() {
            self.min_element_size.max(MIN_ELEMENT_SIZE)
        } else {
            defaults.min_element_size
        };
        let swipe_dead_zone = if self.swipe_dead_zone.is_finite() && self.swipe_dead_zone >= 0.0 {
            self.swipe_dead_zone
        } else {
            defaults.swipe_dead_zone
        };
        let swipe_commit_ratio = if self.swipe_commit_ratio > 0.0 && self.swipe_commit_ratio <= 1.0 {
            self.swipe_commit_ratio
        } else {
            defaults.swipe_commit_ratio
        };
        Self { storage_key, min_element_size, swipe_dead_zone, swipe_commit_ratio, ..self }
    }
}

/// Wire shape of [`EditorConfig`]; missing keys keep their defaults.
#[derive(Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawEditorConfig {
    autosave_quiet_ms: u64,
    saving_indicator_ms: u64,
    storage_key: String,
    min_element_size: f64,
    swipe_dead_zone: f64,
    swipe_commit_ratio: f64,
}

impl Default for RawEditorConfig {
    fn default() -> Self {
        let d = EditorConfig::default();
        Self {
            autosave_quiet_ms: d.autosave_quiet_ms,
            saving_indicator_ms: d.saving_indicator_ms,
            storage_key: d.storage_key,
            min_element_size: d.min_element_size,
            swipe_dead_zone: d.swipe_dead_zone,
            swipe_commit_ratio: d.swipe_commit_ratio,
        }
    }
}

impl From<RawEditorConfig> for EditorConfig {
    fn from(raw: RawEditorConfig) -> Self {
        Self {
            autosave_quiet_ms: raw.autosave_quiet_ms,
            saving_indicator_ms: raw.saving_indicator_ms,
            storage_key: raw.storage_key,
            min_element_size: raw.min_element_size,
            swipe_dead_zone: raw.swipe_dead_zone,
            swipe_commit_ratio: raw.swipe_commit_ratio,
        }
        .validated()
    }
}

fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
    F: Fn(&str) -> Result<String, ()>,
{
    match lookup(key) {
        Ok(raw) => raw.trim().parse::<T>().unwrap_or(default),
        Err(()) => default,
    }
}
