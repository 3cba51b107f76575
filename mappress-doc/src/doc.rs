//! The marker document itself: decoding, defaults and canonical encoding.

use serde_derive::Serialize;
use serde_json::Value;

use crate::errors::{DocError, Result};

/// The post meta key the encoded document is stored under.
pub const META_KEY: &str = "osm_metabox";

/// A single pinned coordinate with an optional display label, belonging
/// to one post.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct Marker {
    pub lat: f64,
    pub lng: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>
}

/// The per-post marker document.
///
/// Field order here is load-bearing: it is the canonical key order of the
/// encoded JSON (`lat, lng, zoom, markers, address, layers`).
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct MarkerDocument {
    /// Map centre latitude.
    pub lat: f64,
    /// Map centre longitude.
    pub lng: f64,
    /// Initial zoom level.
    pub zoom: i32,
    /// Pinned markers, in display order. May be empty: a post can have a
    /// location context without any placed pins.
    pub markers: Vec<Marker>,
    /// Freeform address text from the geocoder search box.
    pub address: String,
    /// Active tile layer names, in order.
    pub layers: Vec<String>
}

impl Default for MarkerDocument {
    fn default() -> Self {
        MarkerDocument {
            lat: 53.5629478,
            lng: 9.9561024,
            zoom: 13,
            markers: vec![],
            address: String::new(),
            layers: vec!["OpenStreetMap".into()]
        }
    }
}

impl MarkerDocument {
    /// Decodes a stored document.
    ///
    /// An empty (or whitespace-only) value means "no document stored yet"
    /// and yields the defaults. Anything else has to parse as a JSON
    /// object; inside it, missing or wrong-typed fields fall back to their
    /// defaults, and marker entries without numeric `lat`/`lng` are
    /// dropped rather than failing the whole document. Unrecognized keys
    /// are discarded.
    pub fn decode(raw: &str) -> Result<Self> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        let val: Value = serde_json::from_str(raw)?;
        let obj = match val {
            Value::Object(o) => o,
            _ => return Err(DocError::NotAnObject)
        };
        let mut ret = Self::default();
        if let Some(lat) = obj.get("lat").and_then(Value::as_f64) {
            ret.lat = lat;
        }
        if let Some(lng) = obj.get("lng").and_then(Value::as_f64) {
            ret.lng = lng;
        }
        if let Some(zoom) = obj.get("zoom").and_then(Value::as_i64) {
            ret.zoom = zoom as i32;
        }
        if let Some(addr) = obj.get("address").and_then(Value::as_str) {
            ret.address = addr.into();
        }
        if let Some(layers) = obj.get("layers").and_then(Value::as_array) {
            ret.layers = layers.iter()
                .filter_map(Value::as_str)
                .map(Into::into)
                .collect();
        }
        if let Some(markers) = obj.get("markers").and_then(Value::as_array) {
            ret.markers = markers.iter()
                .filter_map(marker_from_value)
                .collect();
        }
        Ok(ret)
    }
    /// Encodes the document as canonical JSON.
    pub fn encode(&self) -> String {
        // a plain struct of numbers, strings and vecs cannot fail to serialize
        serde_json::to_string(self).unwrap()
    }
}

fn marker_from_value(val: &Value) -> Option<Marker> {
    let obj = val.as_object()?;
    let lat = obj.get("lat")?.as_f64()?;
    let lng = obj.get("lng")?.as_f64()?;
    let label = obj.get("label")
        .and_then(Value::as_str)
        .map(Into::into);
    Some(Marker { lat, lng, label })
}

/// A marker enriched at aggregation time with its owning post's identity,
/// for public rendering only. Never written back to storage.
#[derive(Serialize, Clone, Debug)]
pub struct AnnotatedMarker {
    pub lat: f64,
    pub lng: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Owning post id.
    pub id: i64,
    /// Thumbnail URL, or a fixed placeholder if the post has none.
    pub img: String,
    /// Permalink of the owning post.
    pub link: String
}

impl Marker {
    /// Attaches post identity to this marker for rendering.
    pub fn annotate(&self, id: i64, img: &str, link: &str) -> AnnotatedMarker {
        AnnotatedMarker {
            lat: self.lat,
            lng: self.lng,
            label: self.label.clone(),
            id,
            img: img.into(),
            link: link.into()
        }
    }
}
