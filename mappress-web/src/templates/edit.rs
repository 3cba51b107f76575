use serde_derive::Serialize;

#[derive(Serialize)]
pub struct EditView {
    pub id: i64,
    pub title: String,
    /// Pre-rendered metabox fragments, in display order.
    pub metaboxes: Vec<String>
}
