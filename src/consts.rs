//! Shared numeric constants for the scrapbook crate.

// ── Elements ────────────────────────────────────────────────────

/// Smallest width or height an element can be resized to, in CSS pixels.
pub const MIN_ELEMENT_SIZE: f64 = 24.0;

/// Width and height of a freshly added photo, in CSS pixels.
pub const DEFAULT_PHOTO_SIZE: f64 = 220.0;

/// Width and height of a freshly added sticker, in CSS pixels.
pub const DEFAULT_STICKER_SIZE: f64 = 60.0;

/// Width of a freshly added text box, in CSS pixels.
pub const DEFAULT_TEXT_WIDTH: f64 = 160.0;

/// Height of a freshly added text box, in CSS pixels.
pub const DEFAULT_TEXT_HEIGHT: f64 = 48.0;

/// Font size of a freshly added text box.
pub const DEFAULT_FONT_SIZE: f64 = 24.0;

/// Text color of a freshly added text box.
pub const DEFAULT_TEXT_COLOR: &str = "#1F1A17";

/// Center position (percent of the canvas) for new elements.
pub const DEFAULT_CENTER_PCT: f64 = 50.0;

/// Maximum caption length in characters.
pub const CAPTION_MAX_CHARS: usize = 20;

/// Maximum album name length in characters.
pub const ALBUM_NAME_MAX_CHARS: usize = 30;

/// Name given to albums created without one.
pub const DEFAULT_ALBUM_NAME: &str = "New Album";

/// Id of the first page of a synthesized album.
pub const FIRST_PAGE_ID: &str = "page-1";

// ── Hit-testing ─────────────────────────────────────────────────

/// Screen-space hit slop in pixels for resize handles.
pub const HANDLE_RADIUS_PX: f64 = 8.0;

/// Radius of the delete button, in pixels.
pub const DELETE_BUTTON_RADIUS_PX: f64 = 12.0;

/// Vertical distance from the element's top edge to the delete button center.
pub const DELETE_BUTTON_OFFSET_PX: f64 = 20.0;

// ── Persistence ─────────────────────────────────────────────────

/// Storage key holding the JSON map of all albums.
pub const STORAGE_KEY: &str = "photoAlbums";

/// Quiet period after the last mutation before an autosave fires.
pub const AUTOSAVE_QUIET_MS: u64 = 2_000;

/// How long the "saving" indicator stays visible after an autosave.
pub const SAVING_INDICATOR_MS: u64 = 1_000;

// ── Swipe navigation ────────────────────────────────────────────

/// Movement (in pixels) on either axis before a swipe picks a direction.
pub const SWIPE_DEAD_ZONE_PX: f64 = 10.0;

/// Fraction of the container width a swipe must cross to change page.
pub const SWIPE_COMMIT_RATIO: f64 = 0.25;

/// Fraction of the container width the swipe offset is clamped to.
pub const SWIPE_MAX_OFFSET_RATIO: f64 = 0.8;

/// Scale applied to the swipe offset when pulling past the first or last page.
pub const SWIPE_EDGE_RESISTANCE: f64 = 0.3;

/// Container width assumed when the canvas has not been measured yet.
pub const FALLBACK_CONTAINER_WIDTH_PX: f64 = 300.0;

// ── Drawing ─────────────────────────────────────────────────────

/// Default pen width for freehand drawing, in CSS pixels.
pub const DEFAULT_PEN_WIDTH: f32 = 4.0;

/// Default pen color (RGBA) for freehand drawing.
pub const DEFAULT_PEN_RGBA: [u8; 4] = [0x1F, 0x1A, 0x17, 0xFF];

/// Prefix of the data URL produced when a drawing is finished.
pub const PNG_DATA_URL_PREFIX: &str = "data:image/png;base64,";
