//! Album persistence over a [`StoragePort`].
//!
//! DESIGN
//! ======
//! All albums live under one storage key as a JSON object mapping album id to
//! album record. Every write is a full read-modify-write of that map so other
//! albums are preserved verbatim, including ones this build cannot parse.
//!
//! ERROR HANDLING
//! ==============
//! A corrupt map (bad JSON, or JSON that is not an object) is logged,
//! discarded and replaced by an empty map; it never reaches the caller.
//! Read failures of the backend degrade to "no albums" on the load path but
//! abort the write path, so a flaky read can never wipe other albums.

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::EditorConfig;
use crate::doc::{Album, Element};
use crate::error::StorageError;
use crate::migrate::repair_album;
use crate::storage::StoragePort;

/// Listing entry for the album collection screen.
#[derive(Debug, Clone, PartialEq)]
pub struct AlbumSummary {
    pub id: String,
    pub name: String,
    pub page_count: usize,
    /// Source of the first photo in the album, used as a cover.
    pub cover: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Reads and writes albums in the shared album map.
pub struct AlbumStore<S: StoragePort> {
    storage: S,
    key: String,
    min_size: f64,
}

impl<S: StoragePort> AlbumStore<S> {
    #[must_use]
    pub fn new(storage: S, config: &EditorConfig) -> Self {
        Self { storage, key: config.storage_key.clone(), min_size: config.min_element_size }
    }

    #[must_use]
    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    /// Load one album, repairing malformed data.
    ///
    /// A repaired album is written back immediately. Returns `None` when no
    /// usable record exists.
    pub fn load_album(&mut self, id: &str, now: DateTime<Utc>) -> Option<Album> {
        let map = match self.read_map() {
            Ok(map) => map,
            Err(e) => {
                warn!(album_id = %id, error = %e, "album map read failed");
                return None;
            }
        };

        let raw = map.get(id)?;
        let Some(repair) = repair_album(id, raw, self.min_size, now) else {
            warn!(album_id = %id, "stored album is not an object; ignoring it");
            return None;
        };

        if repair.changed {
            warn!(album_id = %id, dropped = repair.dropped, "repaired malformed album");
            if let Err(e) = self.save_album(&repair.album) {
                warn!(album_id = %id, error = %e, "failed to persist repaired album");
            }
        }
        Some(repair.album)
    }

    /// Write `album` into the map under its id.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the map cannot be read, encoded or written.
    pub fn save_album(&mut self, album: &Album) -> Result<(), StorageError> {
        let mut map = self.read_map()?;
        map.insert(album.id.clone(), serde_json::to_value(album)?);
        self.write_map(&map)
    }

    /// Summaries of every readable album, newest first.
    pub fn list_albums(&mut self, now: DateTime<Utc>) -> Vec<AlbumSummary> {
        let map = match self.read_map() {
            Ok(map) => map,
            Err(e) => {
                warn!(error = %e, "album map read failed");
                return Vec::new();
            }
        };

        let mut summaries: Vec<AlbumSummary> = map
            .iter()
            .filter_map(|(id, raw)| repair_album(id, raw, self.min_size, now))
            .map(|repair| summarize(&repair.album))
            .collect();
        summaries.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        summaries
    }

    /// Create and persist a new album.
    ///
    /// A blank name falls back to the default; a cover image becomes the first
    /// photo on the first page.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the album cannot be written.
    pub fn create_album(&mut self, name: &str, cover: Option<&str>, now: DateTime<Utc>) -> Result<Album, StorageError> {
        let mut album = Album::new(Uuid::new_v4().to_string(), name, now);
        if let (Some(src), Some(page)) = (cover, album.page_mut(0)) {
            page.push(Element::photo(src));
        }
        self.save_album(&album)?;
        info!(album_id = %album.id, "album created");
        Ok(album)
    }

    /// Remove an album from the map. Returns whether it existed.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the map cannot be read or written.
    pub fn delete_album(&mut self, id: &str) -> Result<bool, StorageError> {
        let mut map = self.read_map()?;
        if map.remove(id).is_none() {
            return Ok(false);
        }
        self.write_map(&map)?;
        info!(album_id = %id, "album deleted");
        Ok(true)
    }

    fn read_map(&mut self) -> Result<Map<String, Value>, StorageError> {
        let Some(raw) = self.storage.get(&self.key)? else {
            return Ok(Map::new());
        };

        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(other) => {
                warn!(kind = json_kind(&other), "album map is not an object; discarding it");
                self.discard_corrupt();
                Ok(Map::new())
            }
            Err(e) => {
                warn!(error = %e, "album map is not valid JSON; discarding it");
                self.discard_corrupt();
                Ok(Map::new())
            }
        }
    }

    fn discard_corrupt(&mut self) {
        if let Err(e) = self.write_map(&Map::new()) {
            warn!(error = %e, "failed to reset corrupt album map");
        }
    }

    fn write_map(&mut self, map: &Map<String, Value>) -> Result<(), StorageError> {
        let raw = serde_json::to_string(map)?;
        self.storage.set(&self.key, &raw)
    }
}

fn summarize(album: &Album) -> AlbumSummary {
    AlbumSummary {
        id: album.id.clone(),
        name: album.name.clone(),
        page_count: album.page_count(),
        cover: album.pages.iter().find_map(|page| page.photos.first()).map(|photo| photo.src.clone()),
        created_at: album.created_at,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
