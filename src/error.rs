//! Error types for the persistence and drawing layers.
//!
//! These never cross the document-model boundary: `DocumentModel` and
//! `EditorCore` log and absorb them so a failed write or a broken drawing
//! never blocks editing.

/// Errors produced by a [`crate::storage::StoragePort`] or by encoding the album map.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The backing store is not available (no window, storage disabled).
    #[error("storage unavailable")]
    Unavailable,
    /// The backing store refused the write because it is full.
    #[error("storage quota exceeded")]
    QuotaExceeded,
    /// Any other backend failure, with the backend's message.
    #[error("storage backend error: {0}")]
    Backend(String),
    /// The album map could not be serialized.
    #[error("album map serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Errors produced while finishing a freehand drawing.
#[derive(Debug, thiserror::Error)]
pub enum DrawingError {
    /// Drawing mode is not active.
    #[error("drawing mode is not active")]
    NotDrawing,
    /// The canvas has no measurable area to rasterize.
    #[error("canvas has zero area ({width}x{height})")]
    EmptySurface { width: f64, height: f64 },
    /// PNG encoding failed.
    #[error("drawing encode failed: {0}")]
    Encode(String),
}
