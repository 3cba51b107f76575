use serde_derive::Serialize;

#[derive(Serialize)]
pub struct MapView {
    /// The aggregated marker list, serialized for the data attribute.
    pub markers_json: String,
    pub has_markers: bool
}
