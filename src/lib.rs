//! Page canvas interaction engine for a photo-album scrapbook.
//!
//! This crate holds everything behind the page-editor screen except the DOM:
//! the album document model, per-element drag/resize/edit gestures, the
//! freehand drawing overlay, page navigation with swipe paging, and
//! debounced persistence to browser-local storage. The host UI forwards
//! pointer, key and timer events to [`editor::EditorCore`] and renders from
//! its state.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`editor`] | Top-level [`editor::EditorCore`] wiring input to the model |
//! | [`model`] | Authoritative album and every mutation on it |
//! | [`doc`] | Album, page and element types |
//! | [`migrate`] | Load-time repair of stored albums |
//! | [`store`] | Album map persistence over a storage port |
//! | [`storage`] | Storage port trait and the in-memory fake |
//! | [`autosave`] | Dirty flag and debounce timing |
//! | [`surface`] | Layout, hit testing and selection for one page |
//! | [`gesture`] | Per-element drag/resize/edit state machine |
//! | [`drawing`] | Freehand drawing raster |
//! | [`nav`] | Current page and swipe paging |
//! | [`geom`] | Points, rectangles and percent/pixel conversion |
//! | [`clock`] | Time source |
//! | [`config`] | Tunables |
//! | [`error`] | Storage and drawing errors |
//! | [`consts`] | Shared numeric constants (sizes, intervals, thresholds) |
//! | `web` | `localStorage` adapter (feature `web`) |

pub mod autosave;
pub mod clock;
pub mod config;
pub mod consts;
pub mod doc;
pub mod drawing;
pub mod editor;
pub mod error;
pub mod geom;
pub mod gesture;
pub mod migrate;
pub mod model;
pub mod nav;
pub mod storage;
pub mod store;
pub mod surface;
#[cfg(feature = "web")]
pub mod web;
