pub mod index;
pub mod post;
pub mod edit;
pub mod map;
pub mod osm_metabox;
pub mod not_found;
pub mod user_error;
