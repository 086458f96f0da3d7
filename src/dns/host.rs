//! Immutable snapshots of name-resolution results.
//!
//! A [`Host`] is produced by a resolver and then owned by the caller,
//! typically an outer address cache. The cache compares snapshots with
//! [`Host::is_equivalent`] and checks freshness against the absolute
//! `deadline`; the process-wide `id` lets it detect stale references
//! without comparing address sets.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};

use time::OffsetDateTime;

use super::failure::Failure;

static NEXT_HOST_ID: AtomicU64 = AtomicU64::new(1);

/// Current wall-clock time as unix seconds.
pub(crate) fn now_unix() -> i64 {
    OffsetDateTime::now_utc().unix_timestamp()
}

/// Resolution result for a single host name.
///
/// Immutable after construction. Cloning preserves the `id` (a clone is
/// the same logical record); two independently constructed hosts always
/// carry different ids.
#[derive(Debug, Clone)]
pub struct Host {
    pub(crate) name: String,
    pub(crate) id: u64,
    pub(crate) status: Failure,
    pub(crate) ipv4_addresses: BTreeSet<String>,
    pub(crate) ipv6_addresses: BTreeSet<String>,
    pub(crate) deadline: i64,
}

impl Default for Host {
    fn default() -> Self {
        Host {
            name: String::new(),
            id: NEXT_HOST_ID.fetch_add(1, Ordering::Relaxed),
            status: Failure::NotYetResolved,
            ipv4_addresses: BTreeSet::new(),
            ipv6_addresses: BTreeSet::new(),
            deadline: 0,
        }
    }
}

impl Host {
    /// Derives a new record from `host` that the cache may hold until
    /// `now + seconds`. Addresses and status are carried over untouched;
    /// only the deadline is refreshed and a new id assigned.
    pub fn extend_deadline(host: &Host, seconds: i64) -> Host {
        Host {
            name: host.name.clone(),
            id: NEXT_HOST_ID.fetch_add(1, Ordering::Relaxed),
            status: host.status,
            ipv4_addresses: host.ipv4_addresses.clone(),
            ipv6_addresses: host.ipv6_addresses.clone(),
            deadline: now_unix() + seconds,
        }
    }

    /// Failed resolution carrying only a status and a negative-result
    /// deadline.
    pub(crate) fn with_status(name: &str, status: Failure, deadline: i64) -> Host {
        Host {
            name: name.to_string(),
            status,
            deadline,
            ..Host::default()
        }
    }

    /// Successful (or address-less) resolution with validated address sets.
    pub(crate) fn with_addresses(
        name: &str,
        status: Failure,
        ipv4_addresses: BTreeSet<String>,
        ipv6_addresses: BTreeSet<String>,
        deadline: i64,
    ) -> Host {
        Host {
            name: name.to_string(),
            status,
            ipv4_addresses,
            ipv6_addresses,
            deadline,
            ..Host::default()
        }
    }

    /// The name as given to the resolver. Bracketed IPv6 literals keep
    /// their brackets.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Process-unique record id, monotonically increasing.
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn status(&self) -> Failure {
        self.status
    }

    /// Canonical dotted-quad strings.
    pub fn ipv4_addresses(&self) -> &BTreeSet<String> {
        &self.ipv4_addresses
    }

    /// Canonical colon-hex strings, always bracketed (`[...]`).
    pub fn ipv6_addresses(&self) -> &BTreeSet<String> {
        &self.ipv6_addresses
    }

    /// Absolute unix second at which this record expires.
    pub fn deadline(&self) -> i64 {
        self.deadline
    }

    pub fn has_ipv6(&self) -> bool {
        !self.ipv6_addresses.is_empty()
    }

    pub fn is_expired(&self) -> bool {
        self.deadline <= now_unix()
    }

    /// A record is usable iff it resolved successfully, carries at least
    /// one address, and has not expired.
    pub fn is_valid(&self) -> bool {
        self.status == Failure::Ok
            && !(self.ipv4_addresses.is_empty() && self.ipv6_addresses.is_empty())
            && !self.is_expired()
    }

    /// Same name, status, and address sets. Deadline and id do not
    /// participate, so a re-resolution with an unchanged upstream answer
    /// compares equivalent to the cached record.
    pub fn is_equivalent(&self, other: &Host) -> bool {
        self.name == other.name
            && self.status == other.status
            && self.ipv4_addresses == other.ipv4_addresses
            && self.ipv6_addresses == other.ipv6_addresses
    }
}
