//! Resolver base: batching, literal short-circuit, search domains.
//!
//! [`Resolver`] is the core abstraction of the resolution layer. Concrete
//! backends implement the single hook [`Resolver::do_resolve`] plus the
//! configuration surface; the provided [`Resolver::resolve_many`] owns
//! everything backend-independent (input classification, the IP-literal
//! short-circuit, address validation, TTL clamping, and search-domain
//! expansion) so each backend only answers "which addresses does this
//! batch of names map to".
//!
//! # Design Notes
//!
//! - Resolution takes `&mut self`: an instance serves one caller at a
//!   time, and backends are free to mutate call-local caches. Callers
//!   that share a resolver wrap it in their own lock.
//! - The hook returns boxed futures for trait-object compatibility.

use std::collections::BTreeSet;
use std::future::Future;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::pin::Pin;

use super::failure::Failure;
use super::host::{now_unix, Host};
use crate::url::strip_brackets;

/// Lower clamp for backend TTLs, in seconds. Also the negative-result TTL
/// carried by failed records.
pub const MIN_TTL: u32 = 60;

/// Upper clamp for backend TTLs, in seconds. IP-literal records live this
/// long since they can never go stale upstream.
pub const MAX_TTL: u32 = 86_400;

/// Unvalidated per-name answer produced by a backend.
///
/// Address strings are raw: the base validates each one and drops the
/// malformed entries without failing the record.
#[derive(Debug, Clone)]
pub struct RawRecord {
    pub ipv4_addresses: Vec<String>,
    pub ipv6_addresses: Vec<String>,
    pub failure: Failure,
    /// Seconds of validity reported by the backend, clamped by the base.
    pub ttl: u32,
}

impl Default for RawRecord {
    fn default() -> Self {
        RawRecord {
            ipv4_addresses: Vec::new(),
            ipv6_addresses: Vec::new(),
            failure: Failure::NotYetResolved,
            ttl: MIN_TTL,
        }
    }
}

impl RawRecord {
    pub fn failed(failure: Failure) -> RawRecord {
        RawRecord {
            failure,
            ..RawRecord::default()
        }
    }
}

/// Future returned by the backend hook: one [`RawRecord`] per input index.
pub type Resolving<'a> = Pin<Box<dyn Future<Output = Vec<RawRecord>> + Send + 'a>>;

/// Future resolving to a single [`Host`].
pub type ResolvingHost<'a> = Pin<Box<dyn Future<Output = Host> + Send + 'a>>;

/// Future resolving to one [`Host`] per input name, index-aligned.
pub type ResolvingHosts<'a> = Pin<Box<dyn Future<Output = Vec<Host>> + Send + 'a>>;

/// A name-resolution backend with the shared batching algorithm on top.
pub trait Resolver: Send {
    /// When set, IPv6 queries are suppressed and IPv6 answers discarded.
    fn ipv4_only(&self) -> bool;

    /// Additional attempts after the first, per query.
    fn retries(&self) -> u32;

    /// Budget per attempt, in milliseconds.
    fn timeout_ms(&self) -> u64;

    /// Ordered name-server endpoints (`"addr:port"`). Empty for backends
    /// that do not use name servers.
    fn resolvers(&self) -> &[String];

    /// Ordered search domains applied to dotless names.
    fn domains(&self) -> &[String];

    /// Replaces the name-server list. Returns false (leaving the previous
    /// list in place) if the backend rejects the input or does not use
    /// name servers.
    fn set_resolvers(&mut self, resolvers: &[String]) -> bool;

    /// Replaces the search-domain list.
    fn set_search_domains(&mut self, domains: &[String]) -> bool;

    /// Installs the platform's name servers (e.g. from `/etc/resolv.conf`).
    fn set_system_resolvers(&mut self) -> bool;

    /// Installs the platform's search domains.
    fn set_system_search_domains(&mut self) -> bool;

    /// Backend hook: answer every non-skipped index of `names`.
    ///
    /// The returned vector must be index-aligned with `names`; entries for
    /// skipped indices are ignored. Invoked exactly once per batch by the
    /// primary pass of [`Resolver::resolve_many`], and once more per
    /// search domain that still has unresolved candidates.
    fn do_resolve<'a>(&'a mut self, names: &'a [String], skip: &'a [bool]) -> Resolving<'a>;

    /// Resolves a single name. Convenience wrapper around
    /// [`Resolver::resolve_many`].
    fn resolve<'a>(&'a mut self, name: &'a str) -> ResolvingHost<'a> {
        Box::pin(async move {
            let names = [name.to_string()];
            self.resolve_many(&names).await.pop().unwrap_or_default()
        })
    }

    /// Resolves a batch of names, returning one [`Host`] per input in
    /// input order. Failures are per index; no input can fail the batch.
    fn resolve_many<'a>(&'a mut self, names: &'a [String]) -> ResolvingHosts<'a> {
        Box::pin(async move {
            let count = names.len();
            let mut out: Vec<Option<Host>> = (0..count).map(|_| None).collect();

            // IP literals and unusable inputs never reach the backend.
            let mut skip = vec![false; count];
            for (i, name) in names.iter().enumerate() {
                if let Some(host) = classify_literal(name) {
                    skip[i] = true;
                    out[i] = Some(host);
                }
            }

            let ipv4_only = self.ipv4_only();
            if skip.iter().any(|s| !s) {
                let raw = self.do_resolve(names, &skip).await;
                for i in 0..count {
                    if skip[i] {
                        continue;
                    }
                    let record = raw.get(i).cloned().unwrap_or_else(|| {
                        tracing::warn!(index = i, "backend returned short batch");
                        RawRecord::failed(Failure::Other)
                    });
                    out[i] = Some(assemble(&names[i], &record, ipv4_only));
                }
            }

            // Search-domain expansion for dotless names the backend did
            // not know. The bare name was already tried above; each domain
            // gets one batched pass over the names still unknown.
            let domains: Vec<String> = self.domains().to_vec();
            if !domains.is_empty() {
                let mut pending: Vec<usize> = (0..count)
                    .filter(|&i| {
                        !skip[i]
                            && out[i].as_ref().map(Host::status) == Some(Failure::UnknownHost)
                            && !names[i].contains('.')
                    })
                    .collect();
                for domain in &domains {
                    if pending.is_empty() {
                        break;
                    }
                    let expanded: Vec<String> = pending
                        .iter()
                        .map(|&i| format!("{}.{}", names[i], domain))
                        .collect();
                    let no_skip = vec![false; expanded.len()];
                    let raw = self.do_resolve(&expanded, &no_skip).await;
                    let mut still_unknown = Vec::with_capacity(pending.len());
                    for (slot, &i) in pending.iter().enumerate() {
                        let record = raw
                            .get(slot)
                            .cloned()
                            .unwrap_or_else(|| RawRecord::failed(Failure::Other));
                        // The host keeps the caller's name, not the
                        // expanded one.
                        let host = assemble(&names[i], &record, ipv4_only);
                        if host.status() == Failure::UnknownHost {
                            still_unknown.push(i);
                        } else {
                            tracing::debug!(
                                name = %names[i],
                                domain = %domain,
                                status = %host.status(),
                                "resolved via search domain"
                            );
                            out[i] = Some(host);
                        }
                    }
                    pending = still_unknown;
                }
            }

            out.into_iter().map(Option::unwrap_or_default).collect()
        })
    }
}

/// Recognizes inputs that bypass the backend entirely: empty and
/// malformed names fail immediately, IP literals synthesize a maximally
/// long-lived record.
fn classify_literal(name: &str) -> Option<Host> {
    let now = now_unix();
    if name.is_empty() {
        return Some(Host::with_status(
            name,
            Failure::InvalidHost,
            now + i64::from(MIN_TTL),
        ));
    }
    if let Ok(addr) = name.parse::<Ipv4Addr>() {
        let mut ipv4 = BTreeSet::new();
        ipv4.insert(addr.to_string());
        return Some(Host::with_addresses(
            name,
            Failure::Ok,
            ipv4,
            BTreeSet::new(),
            now + i64::from(MAX_TTL),
        ));
    }
    if name.starts_with('[') {
        let inner = strip_brackets(name);
        if inner != name {
            if let Ok(addr) = inner.parse::<Ipv6Addr>() {
                let mut ipv6 = BTreeSet::new();
                ipv6.insert(format!("[{addr}]"));
                return Some(Host::with_addresses(
                    name,
                    Failure::Ok,
                    BTreeSet::new(),
                    ipv6,
                    now + i64::from(MAX_TTL),
                ));
            }
        }
        // "[]", "[", and unparseable bracketed bodies.
        return Some(Host::with_status(
            name,
            Failure::InvalidHost,
            now + i64::from(MIN_TTL),
        ));
    }
    None
}

/// Turns a backend answer into a [`Host`]: validates every address string,
/// canonicalizes the survivors, and clamps the TTL into
/// [`MIN_TTL`]..=[`MAX_TTL`].
pub(crate) fn assemble(name: &str, record: &RawRecord, ipv4_only: bool) -> Host {
    let now = now_unix();
    if record.failure != Failure::Ok {
        return Host::with_status(name, record.failure, now + i64::from(MIN_TTL));
    }

    let mut ipv4 = BTreeSet::new();
    for raw in &record.ipv4_addresses {
        match raw.parse::<Ipv4Addr>() {
            Ok(addr) => {
                ipv4.insert(addr.to_string());
            }
            Err(_) => {
                tracing::debug!(name = %name, address = %raw, "dropping malformed IPv4 answer");
            }
        }
    }

    let mut ipv6 = BTreeSet::new();
    if !ipv4_only {
        for raw in &record.ipv6_addresses {
            match strip_brackets(raw).parse::<Ipv6Addr>() {
                Ok(addr) => {
                    ipv6.insert(format!("[{addr}]"));
                }
                Err(_) => {
                    tracing::debug!(name = %name, address = %raw, "dropping malformed IPv6 answer");
                }
            }
        }
    }

    let status = if ipv4.is_empty() && ipv6.is_empty() {
        Failure::NoAddress
    } else {
        Failure::Ok
    };
    let ttl = record.ttl.clamp(MIN_TTL, MAX_TTL);
    Host::with_addresses(name, status, ipv4, ipv6, now + i64::from(ttl))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_classification() {
        assert_eq!(
            classify_literal("").map(|h| h.status()),
            Some(Failure::InvalidHost)
        );
        assert_eq!(
            classify_literal("[]").map(|h| h.status()),
            Some(Failure::InvalidHost)
        );
        assert_eq!(
            classify_literal("[::1").map(|h| h.status()),
            Some(Failure::InvalidHost)
        );
        assert!(classify_literal("localhost").is_none());
        assert!(classify_literal("a.root-servers.net").is_none());
        // Out-of-range octets are a name, not a literal.
        assert!(classify_literal("127.0.0.256").is_none());

        let v4 = classify_literal("127.0.0.1").unwrap();
        assert_eq!(v4.status(), Failure::Ok);
        assert!(v4.ipv4_addresses().contains("127.0.0.1"));
        assert!(!v4.has_ipv6());

        let v6 = classify_literal("[::1]").unwrap();
        assert_eq!(v6.status(), Failure::Ok);
        assert_eq!(v6.name(), "[::1]");
        assert!(v6.has_ipv6());
        assert!(v6.ipv6_addresses().contains("[::1]"));
    }

    #[test]
    fn test_assemble_drops_bad_addresses_only() {
        let record = RawRecord {
            ipv4_addresses: vec![
                "127.0.0.a".to_string(),
                "127.0.0.12345".to_string(),
                "127.0.0".to_string(),
                "abc127.0.0.1".to_string(),
                "127.0.0.1".to_string(),
            ],
            ipv6_addresses: Vec::new(),
            failure: Failure::Ok,
            ttl: 600,
        };
        let host = assemble("bad-ipv4", &record, false);
        assert_eq!(host.status(), Failure::Ok);
        assert_eq!(host.ipv4_addresses().len(), 1);
        assert!(host.ipv4_addresses().contains("127.0.0.1"));
    }

    #[test]
    fn test_assemble_canonicalizes_and_brackets_ipv6() {
        let record = RawRecord {
            ipv4_addresses: Vec::new(),
            ipv6_addresses: vec!["0000:0000:0000:0000:0000:0000:0000:0001".to_string()],
            failure: Failure::Ok,
            ttl: 600,
        };
        let host = assemble("ipv6", &record, false);
        assert!(host.ipv6_addresses().contains("[::1]"));
    }

    #[test]
    fn test_assemble_all_invalid_is_no_address() {
        let record = RawRecord {
            ipv4_addresses: vec!["not-an-address".to_string()],
            ipv6_addresses: vec!["::zz".to_string()],
            failure: Failure::Ok,
            ttl: 600,
        };
        assert_eq!(assemble("x", &record, false).status(), Failure::NoAddress);
    }

    #[test]
    fn test_assemble_clamps_ttl() {
        let mut record = RawRecord {
            ipv4_addresses: vec!["127.0.0.1".to_string()],
            ipv6_addresses: Vec::new(),
            failure: Failure::Ok,
            ttl: 1,
        };
        let now = now_unix();
        let host = assemble("small", &record, false);
        assert!(host.deadline() >= now + i64::from(MIN_TTL));

        record.ttl = u32::MAX;
        let now = now_unix();
        let host = assemble("large", &record, false);
        assert!(host.deadline() <= now + i64::from(MAX_TTL) + 1);
    }

    #[test]
    fn test_assemble_ipv4_only_discards_ipv6() {
        let record = RawRecord {
            ipv4_addresses: vec!["127.0.0.1".to_string()],
            ipv6_addresses: vec!["::1".to_string()],
            failure: Failure::Ok,
            ttl: 600,
        };
        let host = assemble("dual", &record, true);
        assert!(!host.has_ipv6());
        assert_eq!(host.ipv4_addresses().len(), 1);
    }
}
