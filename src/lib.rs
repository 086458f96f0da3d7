//! # depotnet
//!
//! The name-resolution layer of a content-distribution client.
//!
//! `depotnet` turns host names, including host names embedded in URLs,
//! into sets of reachable addresses with freshness deadlines, so the
//! request-routing layer can refresh endpoints, fall back between address
//! families, and pin a request to a particular resolved address.
//!
//! ## Features
//!
//! - **Batched resolution**: one call resolves many names, all queries in
//!   flight concurrently, results index-aligned with the input
//! - **Two backends**: recursive DNS (configurable name servers, retries,
//!   per-attempt timeouts) and a hosts-format file with change detection
//! - **Freshness policy**: backend TTLs clamped into a sane range,
//!   deadline extension for records the outer cache wants to keep
//! - **URL pinning**: extract and rewrite the host portion of a URL
//!   without normalizing away malformed forms
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use depotnet::dns::{CombinedResolver, Resolver};
//! use depotnet::url;
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut resolver = CombinedResolver::new("", false, 1, 2000).unwrap();
//!     let host = resolver.resolve("mirror.example.com").await;
//!     if let Some(addr) = host.ipv4_addresses().iter().next() {
//!         let pinned = url::rewrite_url("http://mirror.example.com/data", addr);
//!         println!("fetching {pinned}");
//!     }
//! }
//! ```
//!
//! ## Modules
//!
//! - [`dns`] - Host snapshots, the `Resolver` trait, and both backends
//! - [`url`] - Pure host extraction/rewriting over URL strings

pub mod dns;
pub mod url;
