//! Types for the per-post marker document: the JSON blob tying a post to a
//! map centre, zoom level, tile layers and a list of pinned markers.
//!
//! Also contains the tile layer catalogs (short-code labels, and the
//! bundled leaflet-providers metadata).

pub mod errors;
pub mod doc;
pub mod providers;
#[cfg(test)]
mod tests;

pub use crate::doc::{AnnotatedMarker, Marker, MarkerDocument, META_KEY};
