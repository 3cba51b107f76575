//! Tile layer catalogs.
//!
//! Two resources live here: the static short-code → display label mappings
//! used when reading and writing layer selections, and the bundled
//! leaflet-providers metadata the map widgets are configured from.

use serde_derive::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

use crate::errors::Result;

/// Where a layer selection is being rendered. The short codes differ
/// between the embedded map and openstreetmap.org share links.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LayerContext {
    /// The embedded editor or public map.
    Iframe,
    /// Share links to openstreetmap.org.
    Link
}

/// Default OpenStreetMap layer short codes and their display labels.
pub fn osm_layers(context: LayerContext) -> &'static [(&'static str, &'static str)] {
    match context {
        LayerContext::Iframe => &[
            ("mapnik", "OpenStreetMap"),
            ("cyclemap", "Thunderforest.OpenCycleMap"),
            ("transportmap", "Thunderforest.Transport"),
            ("hot", "OpenStreetMap.HOT"),
        ],
        LayerContext::Link => &[
            ("H", "OpenStreetMap.HOT"),
            ("T", "Thunderforest.Transport"),
            ("C", "Thunderforest.OpenCycleMap"),
        ]
    }
}

/// One tile provider from the bundled catalog.
#[derive(Deserialize, Clone, Debug)]
pub struct Provider {
    /// Tile URL template.
    pub url: Option<String>,
    /// Leaflet tile layer options (attribution, maxZoom, apikey slots...).
    /// Heterogeneous by nature, so left as raw JSON values.
    #[serde(default)]
    pub options: BTreeMap<String, Value>,
    /// Named style variants of this provider.
    #[serde(default)]
    pub variants: BTreeMap<String, Variant>
}

/// A provider variant: either a bare variant code spliced into the parent's
/// URL template, or a full override with its own URL/options.
#[derive(Deserialize, Clone, Debug)]
#[serde(untagged)]
pub enum Variant {
    Code(String),
    Full {
        url: Option<String>,
        #[serde(default)]
        options: BTreeMap<String, Value>
    }
}

/// The tile provider catalog, keyed by provider name.
#[derive(Deserialize, Clone, Debug)]
pub struct ProviderCatalog(pub BTreeMap<String, Provider>);

static LEAFLET_PROVIDERS: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/data/leaflet-providers.json"));

impl ProviderCatalog {
    /// Parses the catalog bundled with this crate.
    pub fn bundled() -> Result<Self> {
        Ok(serde_json::from_str(LEAFLET_PROVIDERS)?)
    }
    /// Every selectable layer name: each provider, plus its variants as
    /// `Provider.Variant`. This is what editor allow-lists are built from.
    pub fn names(&self) -> Vec<String> {
        let mut ret = vec![];
        for (name, provider) in &self.0 {
            ret.push(name.clone());
            for variant in provider.variants.keys() {
                ret.push(format!("{}.{}", name, variant));
            }
        }
        ret
    }
}
