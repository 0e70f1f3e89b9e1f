//! Listing API access.

mod client;
mod errors;
mod upload;

pub use client::{ApiResponse, RequestClient, USER_AGENT};
pub use errors::{
    BODY_EXCERPT_CHARS, GENERIC_SERVER_ERROR, RequestError, RequestErrorKind, body_excerpt,
};
pub use reqwest::{Method, StatusCode};
pub use upload::UploadFile;
