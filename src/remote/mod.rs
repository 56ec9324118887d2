//! Remote content server access
//!
//! This module contains everything that talks to the content server:
//! - Building the HTTP client with the browser-like identification header
//! - The four catalog calls (partition lookup, landing page, membership
//!   listing, item page) and their wire formats
//! - Mapping transport failures, timeouts, and non-2xx responses to errors

mod catalog;
mod client;

pub use catalog::{CatalogClient, CollectionListing};
pub use client::build_http_client;
