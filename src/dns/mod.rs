//! Name Resolution Module
//!
//! Turns host names into [`Host`] snapshots (validated IPv4/IPv6 address
//! sets with a status tag and an absolute freshness deadline) through
//! pluggable backends:
//! - [`HickoryResolver`]: recursive DNS against configurable name servers
//! - [`HostfileResolver`]: a hosts-format file, reparsed on change
//! - [`CombinedResolver`]: hosts-file overrides in front of the network
//!
//! # Architecture
//!
//! The [`Resolver`] trait is the core abstraction: backends implement the
//! single batch hook [`Resolver::do_resolve`] plus their configuration
//! surface, and inherit batching, IP-literal short-circuiting, address
//! validation, TTL clamping, and search-domain expansion from the
//! provided methods.
//!
//! # Example
//!
//! ```rust,ignore
//! use depotnet::dns::{HickoryResolver, Resolver};
//!
//! let mut resolver = HickoryResolver::new(false, 1, 2000);
//! let host = resolver.resolve("example.com").await;
//! if host.is_valid() {
//!     for addr in host.ipv4_addresses() {
//!         println!("{addr}");
//!     }
//! }
//! ```

mod combined;
mod failure;
mod hickory;
mod host;
mod hostfile;
mod resolvconf;
mod resolver;

pub use combined::CombinedResolver;
pub use failure::Failure;
pub use hickory::HickoryResolver;
pub use host::Host;
pub use hostfile::{HostfileResolver, HOST_ALIASES_ENV};
pub use resolver::{
    RawRecord, Resolver, Resolving, ResolvingHost, ResolvingHosts, MAX_TTL, MIN_TTL,
};
