//! This library provides a client for the hotmail007 mail shop API.
//! It covers the stock lookup and the purchase endpoint.
mod endpoint;
mod error;
mod http;

pub use endpoint::Endpoint;
pub use error::Error;
pub use http::{ClientConfig, HttpClient, DEFAULT_BASE_URL, MAIL_TYPE};

pub type Result<T> = std::result::Result<T, Error>;
