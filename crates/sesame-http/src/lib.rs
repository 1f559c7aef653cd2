//! sesame-http - REST-backed identity API client.

mod api;
mod client;
mod endpoints;

pub use api::HttpIdentityApi;
