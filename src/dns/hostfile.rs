//! Hosts-file resolution backend.
//!
//! Reads a hosts-format text file (byte-compatible with `/etc/hosts`) and
//! answers lookups from it. The file is re-stat'ed on every batch and
//! reparsed only when its mtime or size changed, so edits become visible
//! on the next resolution without a watcher thread.

use std::collections::HashMap;
use std::fs;
use std::net::IpAddr;
use std::path::PathBuf;
use std::time::SystemTime;
use std::{env, io};

use super::failure::Failure;
use super::resolvconf;
use super::resolver::{RawRecord, Resolver, Resolving, MIN_TTL};

/// Environment variable overriding the hosts-file path when no explicit
/// path is given. Read once at construction.
pub const HOST_ALIASES_ENV: &str = "HOST_ALIASES";

const DEFAULT_HOSTS_PATH: &str = "/etc/hosts";

#[derive(Debug, Clone, Default)]
struct HostEntry {
    ipv4_addresses: Vec<String>,
    ipv6_addresses: Vec<String>,
}

/// Resolver backed by a hosts-format file.
///
/// Name servers do not apply to this backend: [`Resolver::set_resolvers`]
/// is a no-op returning false. Search domains behave as for the network
/// backend.
pub struct HostfileResolver {
    ipv4_only: bool,
    path: PathBuf,
    domains: Vec<String>,
    entries: HashMap<String, HostEntry>,
    /// (mtime, size) of the file at the last parse.
    last_seen: Option<(SystemTime, u64)>,
}

impl HostfileResolver {
    /// Creates a resolver for `path`. An empty `path` falls back to the
    /// `HOST_ALIASES` environment variable, then to `/etc/hosts`.
    ///
    /// An explicit non-empty path must be readable; the fallback paths
    /// may be missing, in which case the resolver simply knows no names.
    pub fn new(path: &str, ipv4_only: bool) -> io::Result<HostfileResolver> {
        let path = if !path.is_empty() {
            fs::File::open(path)?;
            PathBuf::from(path)
        } else {
            match env::var(HOST_ALIASES_ENV) {
                Ok(aliases) if !aliases.is_empty() => PathBuf::from(aliases),
                _ => PathBuf::from(DEFAULT_HOSTS_PATH),
            }
        };
        Ok(HostfileResolver {
            ipv4_only,
            path,
            domains: Vec::new(),
            entries: HashMap::new(),
            last_seen: None,
        })
    }

    /// The hosts-file path this resolver reads.
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    /// Reparses the file iff its mtime or size changed since the last
    /// parse. An unreadable file clears the table.
    fn refresh(&mut self) {
        let stat = fs::metadata(&self.path)
            .and_then(|meta| Ok((meta.modified()?, meta.len())));
        match stat {
            Ok(seen) => {
                if self.last_seen == Some(seen) {
                    return;
                }
                match fs::read_to_string(&self.path) {
                    Ok(content) => {
                        self.entries = parse_hostfile(&content);
                        self.last_seen = Some(seen);
                        tracing::debug!(
                            path = %self.path.display(),
                            names = self.entries.len(),
                            "reparsed hosts file"
                        );
                    }
                    Err(err) => {
                        tracing::warn!(
                            path = %self.path.display(),
                            error = %err,
                            "failed to read hosts file"
                        );
                        self.entries.clear();
                        self.last_seen = None;
                    }
                }
            }
            Err(_) => {
                self.entries.clear();
                self.last_seen = None;
            }
        }
    }

    fn lookup(&self, name: &str) -> RawRecord {
        let key = name.strip_suffix('.').unwrap_or(name).to_ascii_lowercase();
        match self.entries.get(&key) {
            Some(entry) => RawRecord {
                ipv4_addresses: entry.ipv4_addresses.clone(),
                ipv6_addresses: if self.ipv4_only {
                    Vec::new()
                } else {
                    entry.ipv6_addresses.clone()
                },
                failure: Failure::Ok,
                ttl: MIN_TTL,
            },
            None => RawRecord::failed(Failure::UnknownHost),
        }
    }
}

impl Resolver for HostfileResolver {
    fn ipv4_only(&self) -> bool {
        self.ipv4_only
    }

    fn retries(&self) -> u32 {
        0
    }

    fn timeout_ms(&self) -> u64 {
        0
    }

    fn resolvers(&self) -> &[String] {
        &[]
    }

    fn domains(&self) -> &[String] {
        &self.domains
    }

    fn set_resolvers(&mut self, _resolvers: &[String]) -> bool {
        false
    }

    fn set_search_domains(&mut self, domains: &[String]) -> bool {
        self.domains = domains.to_vec();
        true
    }

    fn set_system_resolvers(&mut self) -> bool {
        false
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
            self.refresh();
            names
                .iter()
                .zip(skip)
                .map(|(name, &skipped)| {
                    if skipped {
                        RawRecord::default()
                    } else {
                        self.lookup(name)
                    }
                })
                .collect()
        })
    }
}

/// Parses hosts-format text: one `<address> <name>...` binding per line,
/// `#` comments, fields split on runs of spaces/tabs. Repeated names
/// accumulate addresses across lines.
fn parse_hostfile(content: &str) -> HashMap<String, HostEntry> {
    let mut entries: HashMap<String, HostEntry> = HashMap::new();
    for line in content.split('\n') {
        let line = match line.find('#') {
            Some(pos) => &line[..pos],
            None => line,
        };
        let mut fields = line.split_whitespace();
        let Some(address) = fields.next() else {
            continue;
        };
        let address = match address.parse::<IpAddr>() {
            Ok(addr) => addr,
            Err(_) => {
                tracing::debug!(address = %address, "skipping hosts line with bad address");
                continue;
            }
        };
        for name in fields {
            let entry = entries.entry(name.to_ascii_lowercase()).or_default();
            match address {
                IpAddr::V4(v4) => entry.ipv4_addresses.push(v4.to_string()),
                IpAddr::V6(v6) => entry.ipv6_addresses.push(v6.to_string()),
            }
        }
    }
    entries
}
