//! The mappress web frontend: a post editor with its location metabox,
//! and the public map built from every post's markers.

pub mod errors;
pub mod config;
pub mod types;
pub mod metabox;
pub mod aggregator;
pub mod tmpl;
pub mod templates;
pub mod ctx;

use log::*;
use mappress_util::ConfigExt;
use mappress_sqlite::r2d2;
use std::sync::Arc;

use crate::config::Config;
use crate::ctx::App;
use crate::errors::*;

fn main() -> Result<()> {
    mappress_util::setup_logging()?;
    info!("mappress-web, but not yet");
    info!("loading config");
    let cfg = Config::load()?;
    info!("initialising Handlebars");
    let hbs = tmpl::handlebars_init()?;
    info!("initialising database");
    let manager = mappress_sqlite::MappressConnectionManager::initialize(&cfg.database_path, &types::MIGRATIONS)?;
    let pool = r2d2::Pool::new(manager)?;
    let db = pool.get()?;
    let admin = types::User::ensure_default(&db)?;
    info!("default editor user is #{}", admin);
    let srv = Arc::new(App::new(&cfg, pool, hbs)?);
    mappress_util::http::start_server(&cfg.listen, srv)
}
