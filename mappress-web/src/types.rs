//! Database types for posts, their metadata, users and nonces.

use mappress_sqlite::traits::*;
use mappress_sqlite::migrations::Migration;
use mappress_sqlite::migration;
use mappress_sqlite::errors::Result;
use chrono::{Duration, NaiveDateTime, Utc};

pub static MIGRATIONS: [Migration; 1] = [
    migration!(0, "initial")
];

/// A piece of content: a blog post, or a standalone page.
#[derive(Debug, Clone)]
pub struct Post {
    /// Internal primary key.
    pub id: i64,
    /// Post title.
    pub title: String,
    /// Body, as rendered HTML.
    pub content: String,
    /// Id of the authoring user.
    pub author: i64,
    /// Content kind (see KIND_* associated consts).
    pub kind: String,
    /// Creation timestamp.
    pub created: NaiveDateTime,
    /// Featured image URL, if one is set.
    pub thumbnail_url: Option<String>
}
impl Post {
    /// `kind` value for ordinary blog posts.
    pub const KIND_POST: &'static str = "post";
    /// `kind` value for standalone pages.
    pub const KIND_PAGE: &'static str = "page";

    pub fn by_id(conn: &Connection, id: i64) -> Result<Option<Post>> {
        Ok(Self::from_select(conn, "WHERE id = ?", &[&id])?
           .into_iter()
           .nth(0))
    }
    /// The public permalink of this post.
    pub fn permalink(&self, base_url: &str) -> String {
        format!("{}/post/{}", base_url, self.id)
    }
}
impl DbType for Post {
    fn table_name() -> &'static str {
        "posts"
    }
    const FIELDS: usize = 7;
    fn from_row(row: &Row, s: usize) -> RowResult<Self> {
        Ok(Self {
            id: row.get(s + 0)?,
            title: row.get(s + 1)?,
            content: row.get(s + 2)?,
            author: row.get(s + 3)?,
            kind: row.get(s + 4)?,
            created: row.get(s + 5)?,
            thumbnail_url: row.get(s + 6)?,
        })
    }
}
impl InsertableDbType for Post {
    type Id = i64;
    fn insert_self(&self, conn: &Connection) -> RowResult<i64> {
        let mut stmt = conn.prepare("INSERT INTO posts
                                     (title, content, author, kind, created, thumbnail_url)
                                     VALUES (?, ?, ?, ?, ?, ?)")?;
        let rid = stmt.insert(params![self.title, self.content, self.author,
                             self.kind, self.created, self.thumbnail_url])?;
        Ok(rid)
    }
}

/// One post metadata entry: an opaque string value stored under a key.
///
/// The marker document lives here, under [`mappress_doc::META_KEY`].
#[derive(Debug, Clone)]
pub struct PostMeta {
    /// Internal primary key.
    pub id: i64,
    /// Owning post.
    pub post_id: i64,
    /// Meta key.
    pub key: String,
    /// Meta value. Opaque to the store; interpretation is the caller's
    /// business.
    pub value: String
}
impl PostMeta {
    /// Fetches the value stored for `(post_id, key)`, if any.
    pub fn get(conn: &Connection, post_id: i64, key: &str) -> Result<Option<String>> {
        Ok(Self::from_select(conn, "WHERE post_id = ? AND key = ?", &[&post_id, &key])?
           .into_iter()
           .nth(0)
           .map(|x| x.value))
    }
    /// Replaces the value stored for `(post_id, key)` wholesale.
    pub fn set(conn: &Connection, post_id: i64, key: &str, value: &str) -> Result<()> {
        conn.execute("INSERT OR REPLACE INTO post_meta (post_id, key, value)
                      VALUES (?, ?, ?)",
                     params![post_id, key, value])?;
        Ok(())
    }
}
impl DbType for PostMeta {
    fn table_name() -> &'static str {
        "post_meta"
    }
    const FIELDS: usize = 4;
    fn from_row(row: &Row, s: usize) -> RowResult<Self> {
        Ok(Self {
            id: row.get(s + 0)?,
            post_id: row.get(s + 1)?,
            key: row.get(s + 2)?,
            value: row.get(s + 3)?,
        })
    }
}
impl InsertableDbType for PostMeta {
    type Id = i64;
    fn insert_self(&self, conn: &Connection) -> RowResult<i64> {
        let mut stmt = conn.prepare("INSERT INTO post_meta
                                     (post_id, key, value) VALUES (?, ?, ?)")?;
        let rid = stmt.insert(params![self.post_id, self.key, self.value])?;
        Ok(rid)
    }
}

/// A user account.
#[derive(Debug, Clone)]
pub struct User {
    /// Internal primary key.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Editors may edit any post; everyone else only their own.
    pub editor: bool
}
impl User {
    pub fn by_id(conn: &Connection, id: i64) -> Result<Option<User>> {
        Ok(Self::from_select(conn, "WHERE id = ?", &[&id])?
           .into_iter()
           .nth(0))
    }
    /// Whether this user may edit the given post.
    pub fn can_edit(&self, post: &Post) -> bool {
        self.editor || post.author == self.id
    }
    /// Makes sure a fresh database has someone able to edit.
    /// Returns the id of the first account.
    pub fn ensure_default(conn: &Connection) -> Result<i64> {
        if let Some(u) = Self::from_select(conn, "ORDER BY id LIMIT 1", &[])?.into_iter().nth(0) {
            return Ok(u.id);
        }
        let admin = User { id: -1, name: "admin".into(), editor: true };
        Ok(admin.insert_self(conn)?)
    }
}
impl DbType for User {
    fn table_name() -> &'static str {
        "users"
    }
    const FIELDS: usize = 3;
    fn from_row(row: &Row, s: usize) -> RowResult<Self> {
        Ok(Self {
            id: row.get(s + 0)?,
            name: row.get(s + 1)?,
            editor: row.get(s + 2)?,
        })
    }
}
impl InsertableDbType for User {
    type Id = i64;
    fn insert_self(&self, conn: &Connection) -> RowResult<i64> {
        let mut stmt = conn.prepare("INSERT INTO users
                                     (name, editor) VALUES (?, ?)")?;
        let rid = stmt.insert(params![self.name, self.editor])?;
        Ok(rid)
    }
}

/// An anti-forgery token, issued to one user for one purpose when a form
/// is rendered and checked when it comes back.
#[derive(Debug, Clone)]
pub struct Nonce {
    /// Internal primary key.
    pub id: i64,
    /// The token itself (a hyphenated UUID).
    pub token: String,
    /// User the token was issued to.
    pub user_id: i64,
    /// What the token authorizes (one purpose string per form).
    pub purpose: String,
    /// Issue timestamp.
    pub issued: NaiveDateTime
}
impl Nonce {
    /// Nonce lifetime, matching the host's 24-hour tick.
    pub const LIFETIME_HOURS: i64 = 24;

    /// Issues a fresh nonce for `(user_id, purpose)`, returning the token.
    pub fn issue(conn: &Connection, user_id: i64, purpose: &str) -> RowResult<String> {
        let nonce = Nonce {
            id: -1,
            token: Uuid::new_v4().to_string(),
            user_id,
            purpose: purpose.into(),
            issued: Utc::now().naive_utc()
        };
        nonce.insert_self(conn)?;
        Ok(nonce.token)
    }
    /// Checks a submitted token against `(user_id, purpose)`. Unknown and
    /// expired tokens both just come back `false`.
    pub fn verify(conn: &Connection, token: &str, user_id: i64, purpose: &str) -> Result<bool> {
        let nonces = Self::from_select(conn, "WHERE token = ? AND user_id = ? AND purpose = ?",
                                       &[&token, &user_id, &purpose])?;
        let cutoff = Utc::now().naive_utc() - Duration::hours(Self::LIFETIME_HOURS);
        Ok(nonces.into_iter().any(|n| n.issued >= cutoff))
    }
}
impl DbType for Nonce {
    fn table_name() -> &'static str {
        "nonces"
    }
    const FIELDS: usize = 5;
    fn from_row(row: &Row, s: usize) -> RowResult<Self> {
        Ok(Self {
            id: row.get(s + 0)?,
            token: row.get(s + 1)?,
            user_id: row.get(s + 2)?,
            purpose: row.get(s + 3)?,
            issued: row.get(s + 4)?,
        })
    }
}
impl InsertableDbType for Nonce {
    type Id = i64;
    fn insert_self(&self, conn: &Connection) -> RowResult<i64> {
        let mut stmt = conn.prepare("INSERT INTO nonces
                                     (token, user_id, purpose, issued)
                                     VALUES (?, ?, ?, ?)")?;
        let rid = stmt.insert(params![self.token, self.user_id, self.purpose, self.issued])?;
        Ok(rid)
    }
}

#[cfg(test)]
pub fn test_conn() -> Connection {
    use mappress_sqlite::migrations;

    let mut conn = Connection::open_in_memory().unwrap();
    conn.execute_batch("PRAGMA foreign_keys = ON;").unwrap();
    migrations::initialize_migrations(&conn).unwrap();
    migrations::run_pending_migrations(&mut conn, &MIGRATIONS).unwrap();
    conn
}
