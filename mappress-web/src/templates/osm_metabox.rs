use serde_derive::Serialize;

#[derive(Serialize)]
pub struct MapMetaboxView {
    /// Encoded marker document, for the hidden form field.
    pub field_json: String,
    /// Anti-forgery token for the save.
    pub nonce: String,
    pub lat: f64,
    pub lng: f64,
    pub zoom: i32,
    /// Active layers, serialized for the widget's data attribute.
    pub layers_json: String,
    /// Provider allow-list, serialized for the widget's data attribute.
    pub providers_json: String
}
