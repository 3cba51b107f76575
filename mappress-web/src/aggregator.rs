//! Building the public map's marker list.
//!
//! Every request to the map page re-scans all qualifying posts; there is
//! deliberately no cache here. The output is ephemeral and never persisted.

use mappress_doc::{AnnotatedMarker, MarkerDocument, META_KEY};
use mappress_sqlite::traits::*;
use mappress_sqlite::MappressPool;
use log::*;

use crate::errors::*;
use crate::types::Post;

/// Thumbnail used for posts with no featured image.
pub const PLACEHOLDER_IMG: &str = "http://placehold.jp/000000/000000/150x150.png";

/// Flattens every post's markers into one list for the public map.
pub struct MarkerAggregator {
    pool: MappressPool,
    base_url: String
}

impl MarkerAggregator {
    pub fn new(pool: MappressPool, base_url: &str) -> Self {
        Self { pool, base_url: base_url.into() }
    }
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
    /// Aggregates and serializes for the map page's data attribute.
    pub fn markers_json(&self) -> WebResult<String> {
        let db = self.pool.get()?;
        let markers = aggregate(&db, &self.base_url)?;
        Ok(serde_json::to_string(&markers)?)
    }
}

/// Selects qualifying posts (newest first) and flattens their markers,
/// each annotated with its post's identity. A post whose stored document
/// is malformed, or decodes to an empty marker list, contributes nothing.
pub fn aggregate(conn: &Connection, base_url: &str) -> WebResult<Vec<AnnotatedMarker>> {
    let mut stmt = conn.prepare("    SELECT posts.*, post_meta.value FROM posts
                                 INNER JOIN post_meta
                                         ON post_meta.post_id = posts.id
                                      WHERE posts.kind = ?
                                        AND post_meta.key = ?
                                        AND post_meta.value != ''
                                   ORDER BY posts.created DESC")?;
    let rows = stmt.query_map(params![Post::KIND_POST, META_KEY], |row| {
        Ok((Post::from_row(row, 0)?, row.get::<_, String>(Post::FIELDS)?))
    })?;
    let mut ret = vec![];
    for row in rows {
        let (post, raw) = row?;
        let doc = match MarkerDocument::decode(&raw) {
            Ok(d) => d,
            Err(e) => {
                warn!("Skipping post #{}: stored document failed to decode: {}", post.id, e);
                continue;
            }
        };
        if doc.markers.is_empty() {
            continue;
        }
        let img = post.thumbnail_url.as_ref().map(|x| x as &str).unwrap_or(PLACEHOLDER_IMG);
        let link = post.permalink(base_url);
        for marker in &doc.markers {
            ret.push(marker.annotate(post.id, img, &link));
        }
    }
    Ok(ret)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{test_conn, Post, PostMeta, User};
    use chrono::NaiveDate;

    const BASE: &str = "http://radiofree.example.org";

    fn insert_post(conn: &Connection, title: &str, day: u32, thumb: Option<&str>, doc: Option<&str>) -> i64 {
        let author = User { id: -1, name: format!("author-{}", title), editor: false };
        let author = author.insert_self(conn).unwrap();
        let post = Post {
            id: -1,
            title: title.into(),
            content: "<p>body</p>".into(),
            author,
            kind: Post::KIND_POST.into(),
            created: NaiveDate::from_ymd(2020, 5, day).and_hms(12, 0, 0),
            thumbnail_url: thumb.map(Into::into)
        };
        let id = post.insert_self(conn).unwrap();
        if let Some(doc) = doc {
            PostMeta::set(conn, id, META_KEY, doc).unwrap();
        }
        id
    }

    #[test]
    fn posts_without_markers_contribute_nothing() {
        let conn = test_conn();
        insert_post(&conn, "no meta", 1, None, None);
        insert_post(&conn, "empty meta", 2, None, Some(""));
        insert_post(&conn, "no pins", 3, None,
                    Some(r#"{"lat":1,"lng":2,"zoom":3,"markers":[],"address":"","layers":["OpenStreetMap"]}"#));
        insert_post(&conn, "garbage", 4, None, Some("{definitely not json"));
        assert!(aggregate(&conn, BASE).unwrap().is_empty());
    }

    #[test]
    fn one_marker_yields_one_annotated_entry() {
        let conn = test_conn();
        let id = insert_post(&conn, "pinned", 1, Some("http://img.example.org/t.png"),
                             Some(r#"{"markers":[{"lat":10.5,"lng":-3.25,"label":"studio"}]}"#));
        let markers = aggregate(&conn, BASE).unwrap();
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].id, id);
        assert_eq!(markers[0].lat, 10.5);
        assert_eq!(markers[0].lng, -3.25);
        assert_eq!(markers[0].label.as_deref(), Some("studio"));
        assert_eq!(markers[0].img, "http://img.example.org/t.png");
        assert_eq!(markers[0].link, format!("{}/post/{}", BASE, id));
    }

    #[test]
    fn missing_thumbnail_falls_back_to_placeholder() {
        let conn = test_conn();
        insert_post(&conn, "bare", 1, None, Some(r#"{"markers":[{"lat":1,"lng":2}]}"#));
        let markers = aggregate(&conn, BASE).unwrap();
        assert_eq!(markers[0].img, PLACEHOLDER_IMG);
    }

    #[test]
    fn newest_posts_come_first_and_intra_post_order_holds() {
        let conn = test_conn();
        let oldest = insert_post(&conn, "t1", 1, None, Some(r#"{"markers":[{"lat":1,"lng":1}]}"#));
        let middle = insert_post(&conn, "t2", 2, None, Some(r#"{"markers":[{"lat":2,"lng":2}]}"#));
        let newest = insert_post(&conn, "t3", 3, None,
                                 Some(r#"{"markers":[{"lat":3,"lng":3},{"lat":3.5,"lng":3.5}]}"#));
        let markers = aggregate(&conn, BASE).unwrap();
        let ids: Vec<i64> = markers.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![newest, newest, middle, oldest]);
        assert_eq!(markers[0].lat, 3.0);
        assert_eq!(markers[1].lat, 3.5);
    }

    #[test]
    fn pages_are_not_aggregated() {
        let conn = test_conn();
        let author = User { id: -1, name: "p".into(), editor: false };
        let author = author.insert_self(&conn).unwrap();
        let page = Post {
            id: -1,
            title: "the map page itself".into(),
            content: String::new(),
            author,
            kind: Post::KIND_PAGE.into(),
            created: NaiveDate::from_ymd(2020, 5, 1).and_hms(0, 0, 0),
            thumbnail_url: None
        };
        let id = page.insert_self(&conn).unwrap();
        PostMeta::set(&conn, id, META_KEY, r#"{"markers":[{"lat":1,"lng":2}]}"#).unwrap();
        assert!(aggregate(&conn, BASE).unwrap().is_empty());
    }
}
