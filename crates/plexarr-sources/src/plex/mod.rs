pub mod api;
pub mod client;
pub mod rss;

pub use client::PlexClient;
