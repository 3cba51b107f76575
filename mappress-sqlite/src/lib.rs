//! The mappress-sqlite crate provides a common set of functions
//! for initializing, migrating and pooling SQLite databases.
//!
//! It also includes some traits used to make common DB operations
//! (such as SELECT) easier.

pub mod errors;
pub mod traits;
pub mod migrations;

pub use rusqlite;
pub use r2d2;
pub use uuid;

use rusqlite::Connection;
use crate::errors::Result;
use crate::migrations::Migration;

/// A pool of migrated SQLite connections.
pub type MappressPool = r2d2::Pool<MappressConnectionManager>;

/// Opens the database at `path` and brings it up to date with `migrations`.
pub fn initialize_db(path: &str, migrations: &[Migration]) -> Result<Connection> {
    let mut conn = Connection::open(path)?;
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    migrations::initialize_migrations(&conn)?;
    migrations::run_pending_migrations(&mut conn, migrations)?;
    Ok(conn)
}

/// An r2d2 connection manager that migrates the database before handing
/// out any connections.
pub struct MappressConnectionManager {
    path: String
}

impl MappressConnectionManager {
    /// Runs `migrations` against the database at `path`, returning a manager
    /// for it. Migrations run exactly once here, not per connection.
    pub fn initialize(path: &str, migrations: &[Migration]) -> Result<Self> {
        initialize_db(path, migrations)?;
        Ok(Self { path: path.into() })
    }
}

impl r2d2::ManageConnection for MappressConnectionManager {
    type Connection = Connection;
    type Error = rusqlite::Error;

    fn connect(&self) -> rusqlite::Result<Connection> {
        let conn = Connection::open(&self.path)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(conn)
    }
    fn is_valid(&self, conn: &mut Connection) -> rusqlite::Result<()> {
        conn.query_row("SELECT 1", rusqlite::NO_PARAMS, |_| Ok(()))
    }
    fn has_broken(&self, _: &mut Connection) -> bool {
        false
    }
}
