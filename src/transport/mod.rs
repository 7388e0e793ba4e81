//! HTTP transport helpers: header construction and response decoding.

pub mod headers;
pub mod http;
