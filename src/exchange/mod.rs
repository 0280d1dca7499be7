pub mod client;
pub mod http;

pub use client::OrderApi;
pub use http::HttpOrderApi;
