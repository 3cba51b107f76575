//! Error handling.

use mappress_util::impl_from_for_error;
use failure_derive::Fail;
use serde_json::Error as JsonError;

pub type Result<T> = ::std::result::Result<T, DocError>;

/// Error that could occur when decoding a stored marker document.
#[derive(Fail, Debug)]
pub enum DocError {
    /// The stored value parsed as JSON, but wasn't an object.
    #[fail(display = "document is not a JSON object")]
    NotAnObject,
    /// The stored value wasn't valid JSON at all.
    #[fail(display = "invalid JSON: {}", _0)]
    Json(JsonError)
}
impl_from_for_error!(DocError,
                     JsonError => Json);
