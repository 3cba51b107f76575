//! The post editor's panel seam, and the map metabox that plugs into it.
//!
//! Panels are composed into the editor explicitly (a list of `Metabox`
//! objects owned by the app) instead of hanging off a global hook table.

use mappress_doc::{MarkerDocument, META_KEY};
use mappress_doc::providers::ProviderCatalog;
use mappress_sqlite::traits::*;
use handlebars::Handlebars;
use log::*;

use crate::errors::*;
use crate::templates::osm_metabox::MapMetaboxView;
use crate::types::{Nonce, Post, PostMeta, User};

/// The outcome of a metabox save that wasn't denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The submitted value was stored.
    Saved,
    /// The form carried no field for this metabox; nothing was written.
    Skipped
}

/// A panel composed into the post editor.
///
/// `render` produces the panel's HTML fragment for the edit page;
/// `save` consumes the panel's fields out of the submitted edit form.
pub trait Metabox: Send + Sync {
    fn render(&self, conn: &Connection, hbs: &Handlebars, post: &Post, user: &User) -> WebResult<String>;
    fn save(&self, conn: &Connection, post: &Post, user: &User, form: &[(String, String)]) -> WebResult<SaveOutcome>;
}

/// The OpenStreetMap location picker.
///
/// Renders a hidden `osm_metabox` field holding the encoded marker
/// document, plus the container div the client-side widget binds to.
pub struct MapMetabox {
    /// Allow-list of selectable providers, prebuilt from the catalog.
    /// Kept pre-serialized; it goes straight into a data attribute.
    providers_json: String
}

impl MapMetabox {
    pub const NONCE_PURPOSE: &'static str = "edit-map-metabox";
    pub const NONCE_FIELD: &'static str = "map_nonce";

    pub fn new(catalog: &ProviderCatalog) -> Self {
        // a Vec<String> cannot fail to serialize
        let providers_json = serde_json::to_string(&catalog.names()).unwrap();
        Self { providers_json }
    }
}

impl Metabox for MapMetabox {
    fn render(&self, conn: &Connection, hbs: &Handlebars, post: &Post, user: &User) -> WebResult<String> {
        let stored = PostMeta::get(conn, post.id, META_KEY)?.unwrap_or_default();
        let doc = match MarkerDocument::decode(&stored) {
            Ok(d) => d,
            Err(e) => {
                warn!("Stored document for post #{} is malformed ({}); editor starts from defaults", post.id, e);
                MarkerDocument::default()
            }
        };
        let nonce = Nonce::issue(conn, user.id, Self::NONCE_PURPOSE)?;
        let view = MapMetaboxView {
            field_json: doc.encode(),
            nonce,
            lat: doc.lat,
            lng: doc.lng,
            zoom: doc.zoom,
            layers_json: serde_json::to_string(&doc.layers)?,
            providers_json: self.providers_json.clone()
        };
        Ok(hbs.render("osm_metabox", &view)?)
    }

    fn save(&self, conn: &Connection, post: &Post, user: &User, form: &[(String, String)]) -> WebResult<SaveOutcome> {
        // authorization comes first, before even looking at the field
        let token = form_value(form, Self::NONCE_FIELD).ok_or(WebError::Denied)?;
        if !Nonce::verify(conn, token, user.id, Self::NONCE_PURPOSE)? {
            return Err(WebError::Denied);
        }
        if !user.can_edit(post) {
            return Err(WebError::Denied);
        }
        let raw = match form_value(form, META_KEY) {
            Some(r) => r,
            None => return Ok(SaveOutcome::Skipped)
        };
        // Stored verbatim after plain-text sanitization. JSON validity is
        // checked at read time, not here.
        PostMeta::set(conn, post.id, META_KEY, &sanitize_text_field(raw))?;
        info!("Stored marker document for post #{}", post.id);
        Ok(SaveOutcome::Saved)
    }
}

pub fn form_value<'a>(form: &'a [(String, String)], key: &str) -> Option<&'a str> {
    form.iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v as &str)
}

/// Strips tags and control characters from a submitted single-line text
/// field and collapses whitespace runs, the way the host sanitizes plain
/// text input.
pub fn sanitize_text_field(input: &str) -> String {
    let mut stripped = String::with_capacity(input.len());
    let mut in_tag = false;
    for c in input.chars() {
        if in_tag {
            if c == '>' {
                in_tag = false;
            }
            continue;
        }
        match c {
            '<' => in_tag = true,
            c if c.is_control() => stripped.push(' '),
            c => stripped.push(c)
        }
    }
    let mut out = String::with_capacity(stripped.len());
    let mut last_space = false;
    for c in stripped.chars() {
        if c == ' ' {
            if !last_space {
                out.push(c);
            }
            last_space = true;
        }
        else {
            out.push(c);
            last_space = false;
        }
    }
    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{test_conn, Nonce, Post, PostMeta, User};
    use chrono::Utc;

    fn fixture(conn: &Connection) -> (Post, User, User) {
        let author = User { id: -1, name: "author".into(), editor: false };
        let author_id = author.insert_self(conn).unwrap();
        let other = User { id: -1, name: "visitor".into(), editor: false };
        let other_id = other.insert_self(conn).unwrap();
        let post = Post {
            id: -1,
            title: "A post".into(),
            content: "<p>hi</p>".into(),
            author: author_id,
            kind: Post::KIND_POST.into(),
            created: Utc::now().naive_utc(),
            thumbnail_url: None
        };
        let post_id = post.insert_self(conn).unwrap();
        let post = Post::by_id(conn, post_id).unwrap().unwrap();
        let author = User::by_id(conn, author_id).unwrap().unwrap();
        let other = User::by_id(conn, other_id).unwrap().unwrap();
        (post, author, other)
    }

    fn metabox() -> MapMetabox {
        MapMetabox::new(&ProviderCatalog::bundled().unwrap())
    }

    fn form(nonce: &str, field: Option<&str>) -> Vec<(String, String)> {
        let mut ret = vec![(MapMetabox::NONCE_FIELD.to_string(), nonce.to_string())];
        if let Some(f) = field {
            ret.push((META_KEY.to_string(), f.to_string()));
        }
        ret
    }

    #[test]
    fn save_with_bad_nonce_is_denied_and_writes_nothing() {
        let conn = test_conn();
        let (post, author, _) = fixture(&conn);
        let mb = metabox();
        let res = mb.save(&conn, &post, &author, &form("not-a-nonce", Some("{}")));
        match res {
            Err(WebError::Denied) => {},
            other => panic!("expected Denied, got {:?}", other)
        }
        assert_eq!(PostMeta::get(&conn, post.id, META_KEY).unwrap(), None);
    }

    #[test]
    fn save_without_permission_is_denied() {
        let conn = test_conn();
        let (post, _, other) = fixture(&conn);
        let mb = metabox();
        let nonce = Nonce::issue(&conn, other.id, MapMetabox::NONCE_PURPOSE).unwrap();
        let res = mb.save(&conn, &post, &other, &form(&nonce, Some("{}")));
        match res {
            Err(WebError::Denied) => {},
            other => panic!("expected Denied, got {:?}", other)
        }
        assert_eq!(PostMeta::get(&conn, post.id, META_KEY).unwrap(), None);
    }

    #[test]
    fn save_without_field_is_skipped() {
        let conn = test_conn();
        let (post, author, _) = fixture(&conn);
        let mb = metabox();
        let nonce = Nonce::issue(&conn, author.id, MapMetabox::NONCE_PURPOSE).unwrap();
        let res = mb.save(&conn, &post, &author, &form(&nonce, None)).unwrap();
        assert_eq!(res, SaveOutcome::Skipped);
        assert_eq!(PostMeta::get(&conn, post.id, META_KEY).unwrap(), None);
    }

    #[test]
    fn save_stores_submitted_value_wholesale() {
        let conn = test_conn();
        let (post, author, _) = fixture(&conn);
        let mb = metabox();
        let doc = r#"{"lat":1.5,"lng":2.5,"zoom":9,"markers":[{"lat":1.5,"lng":2.5}],"address":"","layers":["OpenStreetMap"]}"#;
        let nonce = Nonce::issue(&conn, author.id, MapMetabox::NONCE_PURPOSE).unwrap();
        let res = mb.save(&conn, &post, &author, &form(&nonce, Some(doc))).unwrap();
        assert_eq!(res, SaveOutcome::Saved);
        assert_eq!(PostMeta::get(&conn, post.id, META_KEY).unwrap().as_deref(), Some(doc));
    }

    #[test]
    fn save_does_not_validate_json() {
        // read-time validation only: garbage goes in fine and only fails
        // when something tries to decode it
        let conn = test_conn();
        let (post, author, _) = fixture(&conn);
        let mb = metabox();
        let nonce = Nonce::issue(&conn, author.id, MapMetabox::NONCE_PURPOSE).unwrap();
        let res = mb.save(&conn, &post, &author, &form(&nonce, Some("{this is not json"))).unwrap();
        assert_eq!(res, SaveOutcome::Saved);
        let stored = PostMeta::get(&conn, post.id, META_KEY).unwrap().unwrap();
        assert!(MarkerDocument::decode(&stored).is_err());
    }

    #[test]
    fn editor_may_edit_anyone() {
        let conn = test_conn();
        let (post, _, _) = fixture(&conn);
        let ed = User { id: -1, name: "ed".into(), editor: true };
        let ed_id = ed.insert_self(&conn).unwrap();
        let ed = User::by_id(&conn, ed_id).unwrap().unwrap();
        let mb = metabox();
        let nonce = Nonce::issue(&conn, ed.id, MapMetabox::NONCE_PURPOSE).unwrap();
        let res = mb.save(&conn, &post, &ed, &form(&nonce, Some("{}"))).unwrap();
        assert_eq!(res, SaveOutcome::Saved);
    }

    #[test]
    fn sanitize_strips_tags_and_collapses_whitespace() {
        assert_eq!(sanitize_text_field("  hello   world "), "hello world");
        assert_eq!(sanitize_text_field("a <b>bold</b> label"), "a bold label");
        assert_eq!(sanitize_text_field("line\nbreaks\tand\rcontrols"), "line breaks and controls");
        // the JSON blob the widget submits passes through unharmed
        let blob = r#"{"lat":1.5,"lng":2.5,"zoom":9,"markers":[],"address":"","layers":["OpenStreetMap"]}"#;
        assert_eq!(sanitize_text_field(blob), blob);
    }
}
