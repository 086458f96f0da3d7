//! Network resolution backend on hickory-dns.
//!
//! Issues recursive A/AAAA queries against an explicitly configured
//! name-server list. Retry count, per-attempt timeout, and caching policy
//! are owned here rather than left to the library: the outer address
//! cache is the only cache, so the underlying resolver runs with its own
//! cache and hosts-file handling disabled.
//!
//! One [`do_resolve`](super::Resolver::do_resolve) call drives all of its
//! queries concurrently and returns only when every index has settled, so
//! a batch costs roughly one round-trip regardless of its size.

use std::net::{IpAddr, SocketAddr};
use std::time::{Duration, Instant};

use futures::future::{join, join_all};
use hickory_resolver::config::{NameServerConfig, ResolveHosts, ResolverConfig, ResolverOpts};
use hickory_resolver::name_server::TokioConnectionProvider;
use hickory_resolver::proto::xfer::Protocol;
use hickory_resolver::proto::ProtoErrorKind;
use hickory_resolver::{ResolveError, TokioResolver};

use super::failure::Failure;
use super::resolvconf;
use super::resolver::{RawRecord, Resolver, Resolving, MIN_TTL};

/// Recursive-DNS resolver with a configurable name-server list.
///
/// Construction installs the system configuration from
/// `/etc/resolv.conf`; both lists can be replaced afterwards through the
/// [`Resolver`] setters. The underlying transport is rebuilt whenever the
/// name-server list changes.
pub struct HickoryResolver {
    ipv4_only: bool,
    retries: u32,
    timeout_ms: u64,
    endpoints: Vec<String>,
    domains: Vec<String>,
    /// None while the endpoint list is empty; resolutions then report
    /// [`Failure::InvalidResolvers`].
    resolver: Option<TokioResolver>,
}

impl HickoryResolver {
    /// Creates a resolver with `retries` extra attempts and `timeout_ms`
    /// per attempt, preloaded with the system name servers and search
    /// domains.
    pub fn new(ipv4_only: bool, retries: u32, timeout_ms: u64) -> HickoryResolver {
        let mut resolver = HickoryResolver {
            ipv4_only,
            retries,
            timeout_ms,
            endpoints: Vec::new(),
            domains: Vec::new(),
            resolver: None,
        };
        resolver.set_system_resolvers();
        resolver.set_system_search_domains();
        resolver
    }

    fn rebuild(&mut self) {
        if self.endpoints.is_empty() {
            self.resolver = None;
            return;
        }
        let mut config = ResolverConfig::new();
        for endpoint in &self.endpoints {
            // Pre-validated by set_resolvers.
            if let Some(addr) = parse_endpoint(endpoint) {
                config.add_name_server(NameServerConfig::new(addr, Protocol::Udp));
                config.add_name_server(NameServerConfig::new(addr, Protocol::Tcp));
            }
        }
        let mut options = ResolverOpts::default();
        options.timeout = Duration::from_millis(self.timeout_ms);
        options.attempts = self.retries as usize + 1;
        options.use_hosts_file = ResolveHosts::Never;
        options.cache_size = 0;
        self.resolver = Some(
            hickory_resolver::Resolver::builder_with_config(
                config,
                TokioConnectionProvider::default(),
            )
            .with_options(options)
            .build(),
        );
    }
}

impl Resolver for HickoryResolver {
    fn ipv4_only(&self) -> bool {
        self.ipv4_only
    }

    fn retries(&self) -> u32 {
        self.retries
    }

    fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }

    fn resolvers(&self) -> &[String] {
        &self.endpoints
    }

    fn domains(&self) -> &[String] {
        &self.domains
    }

    fn set_resolvers(&mut self, resolvers: &[String]) -> bool {
        for endpoint in resolvers {
            if parse_endpoint(endpoint).is_none() {
                tracing::warn!(endpoint = %endpoint, "rejecting unparseable name-server endpoint");
                return false;
            }
        }
        self.endpoints = resolvers.to_vec();
        self.rebuild();
        true
    }

    fn set_search_domains(&mut self, domains: &[String]) -> bool {
        self.domains = domains.to_vec();
        true
    }

    fn set_system_resolvers(&mut self) -> bool {
        match resolvconf::read_system_config() {
            Ok(config) => self.set_resolvers(&config.nameservers),
            Err(err) => {
                tracing::warn!(error = %err, "cannot read system name servers");
                false
            }
        }
    }

    fn set_system_search_domains(&mut self) -> bool {
        match resolvconf::read_system_config() {
            Ok(config) => {
                self.domains = config.domains;
                true
            }
            Err(err) => {
                tracing::warn!(error = %err, "cannot read system search domains");
                false
            }
        }
    }

    fn do_resolve<'a>(&'a mut self, names: &'a [String], skip: &'a [bool]) -> Resolving<'a> {
        Box::pin(async move {
            let mut out: Vec<RawRecord> = names.iter().map(|_| RawRecord::default()).collect();
            let Some(resolver) = self.resolver.clone() else {
                for (record, &skipped) in out.iter_mut().zip(skip) {
                    if !skipped {
                        record.failure = Failure::InvalidResolvers;
                    }
                }
                return out;
            };

            let ipv4_only = self.ipv4_only;
            let queries = names
                .iter()
                .enumerate()
                .filter(|&(i, _)| !skip[i])
                .map(|(i, name)| {
                    let resolver = resolver.clone();
                    async move {
                        if ipv4_only {
                            let ipv4 = query_ipv4(&resolver, name).await;
                            (i, ipv4, None)
                        } else {
                            let (ipv4, ipv6) =
                                join(query_ipv4(&resolver, name), query_ipv6(&resolver, name))
                                    .await;
                            (i, ipv4, Some(ipv6))
                        }
                    }
                });

            for (i, ipv4, ipv6) in join_all(queries).await {
                out[i] = merge_answers(ipv4, ipv6);
            }
            out
        })
    }
}

/// Per-record-type answer, before the base validates the strings.
struct QueryOutcome {
    addresses: Vec<String>,
    ttl: Option<u32>,
    failure: Failure,
}

async fn query_ipv4(resolver: &TokioResolver, name: &str) -> QueryOutcome {
    match resolver.ipv4_lookup(name).await {
        Ok(lookup) => QueryOutcome {
            addresses: lookup.iter().map(|a| a.0.to_string()).collect(),
            ttl: Some(remaining_ttl(lookup.valid_until())),
            failure: Failure::Ok,
        },
        Err(err) => {
            tracing::debug!(name = %name, error = %err, "A query failed");
            QueryOutcome {
                addresses: Vec::new(),
                ttl: None,
                failure: classify_error(&err),
            }
        }
    }
}

async fn query_ipv6(resolver: &TokioResolver, name: &str) -> QueryOutcome {
    match resolver.ipv6_lookup(name).await {
        Ok(lookup) => QueryOutcome {
            addresses: lookup.iter().map(|a| a.0.to_string()).collect(),
            ttl: Some(remaining_ttl(lookup.valid_until())),
            failure: Failure::Ok,
        },
        Err(err) => {
            tracing::debug!(name = %name, error = %err, "AAAA query failed");
            QueryOutcome {
                addresses: Vec::new(),
                ttl: None,
                failure: classify_error(&err),
            }
        }
    }
}

/// An index settles when both record types have. One successful family is
/// a success; the record TTL is the minimum seen across answers.
fn merge_answers(ipv4: QueryOutcome, ipv6: Option<QueryOutcome>) -> RawRecord {
    let failure = match &ipv6 {
        Some(v6) => combine_failures(ipv4.failure, v6.failure),
        None => ipv4.failure,
    };
    if failure != Failure::Ok {
        return RawRecord::failed(failure);
    }
    let mut record = RawRecord {
        failure: Failure::Ok,
        ..RawRecord::default()
    };
    let mut ttls = Vec::with_capacity(2);
    if ipv4.failure == Failure::Ok {
        record.ipv4_addresses = ipv4.addresses;
        ttls.extend(ipv4.ttl);
    }
    if let Some(v6) = ipv6 {
        if v6.failure == Failure::Ok {
            record.ipv6_addresses = v6.addresses;
            ttls.extend(v6.ttl);
        }
    }
    record.ttl = ttls.into_iter().min().unwrap_or(MIN_TTL);
    record
}

/// Both record types failed: report the more telling of the two.
/// `UnknownHost` only survives when every source agreed the name does not
/// exist.
fn combine_failures(a: Failure, b: Failure) -> Failure {
    if a == Failure::Ok || b == Failure::Ok {
        return Failure::Ok;
    }
    fn severity(failure: Failure) -> u8 {
        match failure {
            Failure::InvalidResolvers => 3,
            Failure::Timeout => 2,
            Failure::UnknownHost => 0,
            _ => 1,
        }
    }
    if severity(b) > severity(a) {
        b
    } else {
        a
    }
}

fn classify_error(error: &ResolveError) -> Failure {
    if error.is_no_records_found() {
        return Failure::UnknownHost;
    }
    match error.proto().map(|proto| proto.kind()) {
        Some(ProtoErrorKind::Timeout) => Failure::Timeout,
        _ if error.proto().is_some_and(|proto| proto.is_io()) => Failure::InvalidResolvers,
        _ => Failure::Other,
    }
}

fn remaining_ttl(valid_until: Instant) -> u32 {
    let seconds = valid_until
        .saturating_duration_since(Instant::now())
        .as_secs();
    u32::try_from(seconds).unwrap_or(u32::MAX)
}

fn parse_endpoint(endpoint: &str) -> Option<SocketAddr> {
    if let Ok(addr) = endpoint.parse::<SocketAddr>() {
        return Some(addr);
    }
    if let Ok(ip) = endpoint.parse::<IpAddr>() {
        return Some(SocketAddr::new(ip, 53));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_endpoint_forms() {
        assert_eq!(
            parse_endpoint("127.0.0.2"),
            Some("127.0.0.2:53".parse().unwrap())
        );
        assert_eq!(
            parse_endpoint("10.0.0.1:5353"),
            Some("10.0.0.1:5353".parse().unwrap())
        );
        assert_eq!(parse_endpoint("[::1]:53"), Some("[::1]:53".parse().unwrap()));
        assert_eq!(parse_endpoint("::1"), Some("[::1]:53".parse().unwrap()));
        assert_eq!(parse_endpoint("not-an-ip"), None);
        assert_eq!(parse_endpoint(""), None);
    }

    #[test]
    fn test_combine_failures_prefers_specific() {
        assert_eq!(
            combine_failures(Failure::Ok, Failure::UnknownHost),
            Failure::Ok
        );
        assert_eq!(
            combine_failures(Failure::UnknownHost, Failure::UnknownHost),
            Failure::UnknownHost
        );
        assert_eq!(
            combine_failures(Failure::UnknownHost, Failure::Timeout),
            Failure::Timeout
        );
        assert_eq!(
            combine_failures(Failure::Timeout, Failure::InvalidResolvers),
            Failure::InvalidResolvers
        );
    }

    #[test]
    fn test_merge_takes_minimum_ttl() {
        let ipv4 = QueryOutcome {
            addresses: vec!["127.0.0.1".to_string()],
            ttl: Some(300),
            failure: Failure::Ok,
        };
        let ipv6 = QueryOutcome {
            addresses: vec!["::1".to_string()],
            ttl: Some(120),
            failure: Failure::Ok,
        };
        let record = merge_answers(ipv4, Some(ipv6));
        assert_eq!(record.failure, Failure::Ok);
        assert_eq!(record.ttl, 120);
    }

    #[test]
    fn test_merge_single_family_success() {
        let ipv4 = QueryOutcome {
            addresses: vec!["127.0.0.1".to_string()],
            ttl: Some(300),
            failure: Failure::Ok,
        };
        let ipv6 = QueryOutcome {
            addresses: Vec::new(),
            ttl: None,
            failure: Failure::UnknownHost,
        };
        let record = merge_answers(ipv4, Some(ipv6));
        assert_eq!(record.failure, Failure::Ok);
        assert_eq!(record.ipv4_addresses, ["127.0.0.1"]);
        assert!(record.ipv6_addresses.is_empty());
        assert_eq!(record.ttl, 300);
    }
}
