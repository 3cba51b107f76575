//! Error handling, but probably a bit snazzier.

pub use failure::Error;
use failure_derive::Fail;
use mappress_util::impl_from_for_error;
use mappress_util::http::StatusCode;
use mappress_sqlite::errors::{SqlError, PoolError};
use mappress_sqlite::rusqlite::Error as RsqlError;
use mappress_doc::errors::DocError;
use handlebars::RenderError;
use handlebars::Handlebars;
use rouille::{Request, Response};
use serde_json::Error as JsonError;

use crate::tmpl::TemplateContext;

/// Error that could occur when processing a request.
#[derive(Fail, Debug)]
pub enum WebError {
    /// The given entity was not found.
    #[fail(display = "not found")]
    NotFound,
    /// Nonce or permission check failed; nothing was written.
    #[fail(display = "denied")]
    Denied,
    /// Request body or parameters didn't parse.
    #[fail(display = "bad request")]
    BadRequest,
    /// Marker document error from mappress-doc.
    #[fail(display = "marker document: {}", _0)]
    Doc(DocError),
    /// SQL error from mappress-sqlite.
    #[fail(display = "mappress-sqlite: {}", _0)]
    Sql(SqlError),
    /// SQL error from rusqlite.
    #[fail(display = "rusqlite: {} ({})", _1, _0)]
    Rsql(String, RsqlError),
    /// r2d2 database error.
    #[fail(display = "r2d2: {}", _0)]
    Pool(PoolError),
    /// Handlebars rendering error.
    #[fail(display = "handlebars: {}", _0)]
    Hbs(RenderError),
    /// serde_json error.
    #[fail(display = "serde_json: {}", _0)]
    Json(JsonError)
}

impl WebError {
    pub fn as_rendered(&self, req: &Request, hbs: &Handlebars) -> Result<Response> {
        use self::WebError::*;
        use crate::templates::not_found::NotFoundView;
        use crate::templates::user_error::UserErrorView;

        let resp = match *self {
            NotFound => {
                TemplateContext {
                    template: "not_found",
                    title: "Not found".into(),
                    body: NotFoundView {
                        uri: req.url()
                    }
                }.render(hbs)?
            },
            Denied => {
                TemplateContext {
                    template: "user_error",
                    title: "Denied (403)".into(),
                    body: UserErrorView {
                        error_summary: "Denied (403)".into(),
                        reason: "You can't edit this post, or your session expired. Nothing was saved.".into()
                    }
                }.render(hbs)?
            },
            BadRequest => {
                TemplateContext {
                    template: "user_error",
                    title: "Bad request (400)".into(),
                    body: UserErrorView {
                        error_summary: "Bad request (400)".into(),
                        reason: "The request didn't parse.".into()
                    }
                }.render(hbs)?
            },
            _ => {
                TemplateContext::title("ise", "").render(hbs)?
            }
        };
        Ok(resp.with_status_code(self.status_code()))
    }
}
impl StatusCode for WebError {
    fn status_code(&self) -> u16 {
        use self::WebError::*;

        match *self {
            NotFound => 404,
            Denied => 403,
            BadRequest => 400,
            Pool(_) => 503,
            _ => 500
        }
    }
}

impl From<RsqlError> for WebError {
    fn from(r: RsqlError) -> WebError {
        WebError::Rsql(format!("{:?}", r), r)
    }
}
impl_from_for_error!(WebError,
                     DocError => Doc,
                     SqlError => Sql,
                     PoolError => Pool,
                     RenderError => Hbs,
                     JsonError => Json);

pub type WebResult<T> = ::std::result::Result<T, WebError>;
pub type Result<T, E = Error> = ::std::result::Result<T, E>;
